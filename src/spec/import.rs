use super::{NodeRecord, PortLink, ProgramSpec};
use crate::error::ConnectionError;
use crate::model::{NodeId, PlugRef, Point, PortKind, SocketRef};
use crate::registry::NodeRegistry;
use crate::session::GraphSession;
use ahash::{AHashMap, AHashSet};

/// What an import rebuilt and what it had to leave out.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Uid in the specification to the id of the node spawned for it.
    pub nodes: AHashMap<String, NodeId>,
    /// Uids whose identifier has no registry entry.
    pub skipped_nodes: Vec<String>,
    /// Edges that could not be restored.
    pub skipped_edges: usize,
}

/// Replaces the session's contents with the graph described by `spec`.
///
/// Runs in two passes: every node is spawned first (flows, then
/// `additional`), then every edge is re-established. Unknown identifiers and
/// edges to missing nodes are skipped and logged, never fatal. Node and
/// connector ids are regenerated.
///
/// Variables are registered before any node is spawned so variable readers
/// pick up their type. A variable already registered under the same name
/// keeps its current type.
pub fn import(session: &mut GraphSession, registry: &NodeRegistry, spec: &ProgramSpec) -> ImportReport {
    session.remove_all();
    let mut report = ImportReport::default();
    let records = spec.records();

    for (name, port_type) in &spec.variables {
        if !session.register_variable(name, *port_type) && session.variables().get(name) != Some(port_type) {
            log::warn!("variable '{}' already registered with another type", name);
        }
    }

    for record in &records {
        if report.nodes.contains_key(&record.uid) || report.skipped_nodes.contains(&record.uid) {
            continue;
        }
        let Some(kind) = registry.lookup(&record.identifier) else {
            log::warn!(
                "skipping node '{}': no registry entry for '{}'",
                record.uid,
                record.identifier
            );
            report.skipped_nodes.push(record.uid.clone());
            continue;
        };
        let id = session.spawn(kind, Point::new(record.x, record.y), record.scale);
        if let Some(variant) = record.variant {
            session.switch_variant(id, variant);
        }
        restore_constants(session, id, record);
        report.nodes.insert(record.uid.clone(), id);
    }

    let mut pending = Vec::new();
    let mut linked = AHashSet::new();
    for record in &records {
        let Some(&id) = report.nodes.get(&record.uid) else {
            continue;
        };
        if !linked.insert(id) {
            continue;
        }
        for (kind, plugs) in [
            (PortKind::Flow, &record.flow_plugs),
            (PortKind::Data, &record.data_plugs),
        ] {
            for (index, links) in plugs.iter().enumerate() {
                for link in links {
                    let plug = PlugRef { node: id, kind, index };
                    match target_socket(&report.nodes, plug, link) {
                        Some(socket) => pending.push((plug, socket, link)),
                        None => report.skipped_edges += 1,
                    }
                }
            }
        }
    }

    // A plug's type can follow edges that are restored later (an adapting
    // sum only settles once both inputs are connected), so type mismatches
    // are retried for as long as a round connects something.
    loop {
        let before = pending.len();
        let mut deferred = Vec::new();
        let mut mismatches = Vec::new();
        for (plug, socket, link) in pending {
            match session.connect_direct(plug, socket) {
                Ok(_) => {}
                Err(e @ ConnectionError::TypeMismatch { .. }) => {
                    deferred.push((plug, socket, link));
                    mismatches.push((link, e));
                }
                Err(e) => {
                    log::warn!("skipping edge {}: {}", link.connector_id, e);
                    report.skipped_edges += 1;
                }
            }
        }
        if deferred.is_empty() || deferred.len() == before {
            for (link, e) in mismatches {
                log::warn!("skipping edge {}: {}", link.connector_id, e);
                report.skipped_edges += 1;
            }
            break;
        }
        pending = deferred;
    }

    log::debug!(
        "imported {} nodes, skipped {} nodes and {} edges",
        report.nodes.len(),
        report.skipped_nodes.len(),
        report.skipped_edges
    );
    report
}

fn restore_constants(session: &mut GraphSession, id: NodeId, record: &NodeRecord) {
    for (index, input) in record.inputs.iter().enumerate() {
        if !input.constant {
            continue;
        }
        if let Some(value) = &input.value {
            session.set_socket_value(SocketRef::data(id, index), Some(value.clone()));
        }
    }
}

fn target_socket(nodes: &AHashMap<String, NodeId>, plug: PlugRef, link: &PortLink) -> Option<SocketRef> {
    let Some(&target) = nodes.get(&link.con_to) else {
        log::warn!(
            "skipping edge {}: target node '{}' was not imported",
            link.connector_id,
            link.con_to
        );
        return None;
    };
    Some(SocketRef {
        node: target,
        kind: plug.kind,
        index: link.target_port,
    })
}
