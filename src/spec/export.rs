use super::{BRANCH_SPLIT_IDENTIFIER, FlowEntry, InputRecord, NodeRecord, PortLink, ProgramSpec};
use crate::model::{CONDITION_IDENTIFIER, Node, NodeBody, NodeId, NodeKind, PortKind};
use crate::session::GraphSession;
use ahash::AHashSet;

/// Snapshots the session as a program specification.
///
/// One flow is produced per start node, in id order. Data sources reachable
/// from any flow node through data edges are collected into `additional`.
pub fn export(session: &GraphSession) -> ProgramSpec {
    let mut starts: Vec<NodeId> = session
        .nodes()
        .filter(|n| n.kind == NodeKind::StartEvent)
        .map(Node::id)
        .collect();
    starts.sort();

    let mut exporter = Exporter {
        session,
        path: Vec::new(),
        flow_nodes: Vec::new(),
    };
    let flows: Vec<Vec<FlowEntry>> = starts
        .into_iter()
        .map(|start| {
            let mut chain = Vec::new();
            exporter.follow(start, &mut chain);
            chain
        })
        .collect();

    let in_flows: AHashSet<NodeId> = exporter.flow_nodes.iter().copied().collect();
    let mut visited = AHashSet::new();
    let mut additional = Vec::new();
    for id in &exporter.flow_nodes {
        let Some(node) = session.node(*id) else {
            continue;
        };
        for source in data_sources(session, node) {
            trace(session, source, &in_flows, &mut visited, &mut additional);
        }
    }

    log::debug!(
        "exported {} flows and {} additional nodes",
        flows.len(),
        additional.len()
    );
    let variables = session
        .variables()
        .iter()
        .map(|(name, port_type)| (name.clone(), *port_type))
        .collect();
    ProgramSpec {
        flows,
        additional,
        variables,
    }
}

struct Exporter<'a> {
    session: &'a GraphSession,
    /// Nodes of the chain currently being followed.
    path: Vec<NodeId>,
    /// Every node written to a flow, in visiting order.
    flow_nodes: Vec<NodeId>,
}

impl Exporter<'_> {
    /// Appends `id` and everything it flows into to `chain`. A flow edge back
    /// into the current path ends the chain.
    fn follow(&mut self, id: NodeId, chain: &mut Vec<FlowEntry>) {
        let session = self.session;
        let Some(node) = session.node(id) else {
            return;
        };
        chain.push(FlowEntry::Node(record(session, node)));
        self.flow_nodes.push(id);
        self.path.push(id);

        let mut branches: Vec<Option<NodeId>> = Vec::new();
        for plug in &node.frame.flow_plugs {
            if plug.connected.is_empty() {
                branches.push(None);
                continue;
            }
            branches.extend(
                plug.connected
                    .iter()
                    .filter_map(|c| session.connector(*c))
                    .filter_map(|c| c.connected_to)
                    .map(|s| Some(s.node)),
            );
        }

        if branches.iter().all(Option::is_none) {
            self.path.pop();
            return;
        }

        if branches.len() == 1 && !node.frame.force_branch {
            if let Some(next) = branches[0] {
                if self.path.contains(&next) {
                    log::warn!("flow loop from node {} back to {}; chain cut", id, next);
                } else {
                    self.follow(next, chain);
                }
            }
            self.path.pop();
            return;
        }

        let mut sub = Vec::with_capacity(branches.len());
        for branch in branches {
            let mut sub_chain = Vec::new();
            match branch {
                Some(next) if self.path.contains(&next) => {
                    log::warn!("flow loop from node {} back to {}; branch cut", id, next);
                }
                Some(next) => self.follow(next, &mut sub_chain),
                None => {}
            }
            sub.push(sub_chain);
        }
        if node.identifier() != CONDITION_IDENTIFIER {
            log::debug!("{} after node {}", BRANCH_SPLIT_IDENTIFIER, id);
            chain.push(FlowEntry::Split {
                branch_count: sub.len(),
            });
        }
        chain.push(FlowEntry::Branch { branches: sub });
        self.path.pop();
    }
}

/// Adds `id` and its upstream data sources to `out`, once each. Flow nodes are
/// walked through but not recorded again.
fn trace(
    session: &GraphSession,
    id: NodeId,
    in_flows: &AHashSet<NodeId>,
    visited: &mut AHashSet<NodeId>,
    out: &mut Vec<NodeRecord>,
) {
    if !visited.insert(id) {
        return;
    }
    let Some(node) = session.node(id) else {
        return;
    };
    if !in_flows.contains(&id) {
        out.push(record(session, node));
    }
    for source in data_sources(session, node) {
        trace(session, source, in_flows, visited, out);
    }
}

/// Upstream nodes of every connected data socket, in socket order.
fn data_sources(session: &GraphSession, node: &Node) -> Vec<NodeId> {
    node.frame
        .data_sockets
        .iter()
        .filter_map(|s| s.connector())
        .filter_map(|c| session.connector(c))
        .map(|c| c.plug.node)
        .collect()
}

fn record(session: &GraphSession, node: &Node) -> NodeRecord {
    let frame = &node.frame;
    let links = |kind: PortKind| -> Vec<Vec<PortLink>> {
        frame
            .plugs(kind)
            .iter()
            .map(|plug| {
                plug.connected
                    .iter()
                    .filter_map(|c| session.connector(*c))
                    .filter_map(|c| {
                        c.connected_to.map(|socket| PortLink {
                            connector_id: c.id.to_string(),
                            con_to: socket.node.to_string(),
                            target_port: socket.index,
                        })
                    })
                    .collect()
            })
            .collect()
    };

    let inputs = frame
        .data_sockets
        .iter()
        .map(|socket| {
            let upstream = socket
                .connector()
                .and_then(|c| session.connector(c))
                .map(|c| c.plug);
            match upstream {
                Some(plug) => InputRecord {
                    source: Some(plug.node.to_string()),
                    port: Some(plug.index),
                    port_type: socket.port_type,
                    constant: false,
                    value: None,
                },
                None => InputRecord {
                    source: None,
                    port: None,
                    port_type: socket.port_type,
                    constant: true,
                    value: socket.value.clone(),
                },
            }
        })
        .collect();

    NodeRecord {
        uid: frame.id.to_string(),
        identifier: frame.identifier.clone(),
        node: node.kind.type_name().to_string(),
        x: frame.position.x,
        y: frame.position.y,
        scale: frame.scale,
        variant: match frame.body {
            NodeBody::Variant(variant) => Some(variant),
            NodeBody::Fixed => None,
        },
        flow_plugs: links(PortKind::Flow),
        data_plugs: links(PortKind::Data),
        inputs,
    }
}
