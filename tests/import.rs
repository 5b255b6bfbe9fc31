//! Import tests
//!
//! Rebuilds sessions from specifications and checks what survives.
//!
mod common;
use common::*;
use visflow::model::NodeBody;
use visflow::prelude::*;

#[cfg(test)]
mod import_tests {
    use super::*;

    fn record_mut<'a>(spec: &'a mut ProgramSpec, uid: &str) -> &'a mut NodeRecord {
        fn walk<'a>(entries: &'a mut [FlowEntry], uid: &str) -> Option<&'a mut NodeRecord> {
            for entry in entries {
                match entry {
                    FlowEntry::Node(record) if record.uid == uid => return Some(record),
                    FlowEntry::Branch { branches } => {
                        for branch in branches {
                            if let Some(found) = walk(branch, uid) {
                                return Some(found);
                            }
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        for flow in &mut spec.flows {
            if let Some(found) = walk(flow, uid) {
                return found;
            }
        }
        spec.additional
            .iter_mut()
            .find(|r| r.uid == uid)
            .expect("record exists")
    }

    #[test]
    fn test_round_trip_preserves_graph() {
        let scenario = create_condition_scenario();
        let spec = export(&scenario.session);

        let mut session = GraphSession::default();
        let report = import(&mut session, &NodeRegistry::standard(), &spec);
        assert_eq!(report.nodes.len(), 4);
        assert!(report.skipped_nodes.is_empty());
        assert_eq!(report.skipped_edges, 0);
        assert_eq!(session.connector_count(), 3);

        assert_eq!(canonical(&export(&session)), canonical(&spec));
    }

    #[test]
    fn test_round_trip_through_json() {
        let (mut session, logs) = create_log_chain(&[
            LiteralValue::Str("a".to_string()),
            LiteralValue::Float(0.5),
            LiteralValue::Bool(true),
        ]);
        session.move_node(logs[1], Point::new(123.0, 45.0));
        session.set_scale(logs[2], 0.75);
        let json = export(&session).to_json().unwrap();

        let mut restored = GraphSession::default();
        let spec = ProgramSpec::from_json(&json).unwrap();
        import(&mut restored, &NodeRegistry::standard(), &spec);
        assert_eq!(canonical(&export(&restored)), canonical(&spec));
    }

    #[test]
    fn test_constants_and_variant_are_restored() {
        let (mut session, logs) = create_log_chain(&[LiteralValue::Int(0)]);
        let math = session.spawn(NodeKind::Math, Point::new(0.0, 300.0), 1.0);
        session.switch_variant(math, VariantKind::Multiply);
        session.set_socket_value(SocketRef::data(math, 0), Some(LiteralValue::Int(2)));
        session.set_socket_value(SocketRef::data(math, 1), Some(LiteralValue::Int(3)));
        session.connect_direct(PlugRef::data(math, 0), SocketRef::data(logs[0], 0)).unwrap();
        let spec = export(&session);

        let mut restored = GraphSession::default();
        let report = import(&mut restored, &NodeRegistry::standard(), &spec);
        let id = report.nodes[&math.to_string()];
        let node = restored.node(id).unwrap();
        assert_eq!(node.frame.body, NodeBody::Variant(VariantKind::Multiply));
        assert_eq!(node.frame.data_sockets[0].value, Some(LiteralValue::Int(2)));
        assert_eq!(node.frame.data_sockets[1].value, Some(LiteralValue::Int(3)));
        assert_eq!(node.frame.data_plugs[0].connected.len(), 1);
    }

    #[test]
    fn test_unknown_identifier_is_skipped() {
        let scenario = create_condition_scenario();
        let mut spec = export(&scenario.session);
        record_mut(&mut spec, &scenario.mobile.to_string()).identifier = "Vendor-Unknown".to_string();

        let mut session = GraphSession::default();
        let report = import(&mut session, &NodeRegistry::standard(), &spec);
        assert_eq!(report.skipped_nodes, vec![scenario.mobile.to_string()]);
        assert_eq!(report.nodes.len(), 3);
        assert_eq!(session.connector_count(), 2);

        let condition = report.nodes[&scenario.condition.to_string()];
        assert!(!session.node(condition).unwrap().frame.data_sockets[0].is_connected());
    }

    #[test]
    fn test_edge_to_missing_node_is_skipped() {
        let scenario = create_condition_scenario();
        let mut spec = export(&scenario.session);
        record_mut(&mut spec, &scenario.start.to_string()).flow_plugs[0][0].con_to = "nowhere".to_string();

        let mut session = GraphSession::default();
        let report = import(&mut session, &NodeRegistry::standard(), &spec);
        assert_eq!(report.skipped_edges, 1);
        assert_eq!(report.nodes.len(), 4);
        assert_eq!(session.connector_count(), 2);
    }

    #[test]
    fn test_invalid_edge_is_skipped() {
        let scenario = create_condition_scenario();
        let mut spec = export(&scenario.session);
        // Point the flow edge at a socket index the condition does not have.
        record_mut(&mut spec, &scenario.start.to_string()).flow_plugs[0][0].target_port = 5;

        let mut session = GraphSession::default();
        let report = import(&mut session, &NodeRegistry::standard(), &spec);
        assert_eq!(report.skipped_edges, 1);
        assert_eq!(session.connector_count(), 2);
    }

    #[test]
    fn test_import_replaces_session_contents() {
        let scenario = create_condition_scenario();
        let spec = export(&scenario.session);

        let (mut session, _) = create_log_chain(&vec![LiteralValue::Int(1); 5]);
        assert_eq!(session.node_count(), 6);
        import(&mut session, &NodeRegistry::standard(), &spec);
        assert_eq!(session.node_count(), 4);
        assert_eq!(session.connector_count(), 3);
        assert!(referenced_connectors(&session)
            .iter()
            .all(|id| session.connector(*id).is_some()));
    }

    #[test]
    fn test_registry_alias_spawns_kind() {
        let scenario = create_condition_scenario();
        let mut spec = export(&scenario.session);
        record_mut(&mut spec, &scenario.log.to_string()).identifier = "Legacy-Log".to_string();

        let mut registry = NodeRegistry::standard();
        registry.register("Legacy-Log", NodeKind::ConsoleLog, "Log", visflow::model::NodeClass::Console);

        let mut session = GraphSession::default();
        let report = import(&mut session, &registry, &spec);
        let id = report.nodes[&scenario.log.to_string()];
        let node = session.node(id).unwrap();
        assert_eq!(node.kind, NodeKind::ConsoleLog);
        // The spawned node carries the canonical identifier.
        assert_eq!(node.identifier(), "OpenVS-Base-Console-Log");
        assert_eq!(session.connector_count(), 3);
    }

    #[test]
    fn test_duplicate_uid_is_spawned_once() {
        let scenario = create_condition_scenario();
        let mut spec = export(&scenario.session);
        let mobile = spec.additional[0].clone();
        spec.additional.push(mobile);

        let mut session = GraphSession::default();
        let report = import(&mut session, &NodeRegistry::standard(), &spec);
        assert_eq!(session.node_count(), 4);
        assert_eq!(report.skipped_edges, 0);
    }

    #[test]
    fn test_edges_into_adapting_plugs_survive_round_trip() {
        // Log <- Multiply <- Add <- ScreenSize: the sum's output is only
        // typed once both of its inputs are connected again.
        let (mut session, logs) = create_log_chain(&[LiteralValue::Int(0)]);
        let multiply = session.spawn(NodeKind::Multiplication, Point::new(0.0, 300.0), 1.0);
        let add = session.spawn(NodeKind::GeneralAddition, Point::new(0.0, 500.0), 1.0);
        let size = session.spawn(NodeKind::ScreenSize, Point::new(0.0, 700.0), 1.0);
        session.connect_direct(PlugRef::data(multiply, 0), SocketRef::data(logs[0], 0)).unwrap();
        session.connect_direct(PlugRef::data(size, 0), SocketRef::data(add, 0)).unwrap();
        session.connect_direct(PlugRef::data(size, 1), SocketRef::data(add, 1)).unwrap();
        session.connect_direct(PlugRef::data(add, 0), SocketRef::data(multiply, 0)).unwrap();
        assert_eq!(session.connector_count(), 5);
        let spec = export(&session);

        let mut restored = GraphSession::default();
        let report = import(&mut restored, &NodeRegistry::standard(), &spec);
        assert_eq!(report.skipped_edges, 0);
        assert_eq!(restored.connector_count(), 5);
        let id = report.nodes[&add.to_string()];
        assert_eq!(restored.node(id).unwrap().frame.data_plugs[0].port_type, PortType::Integer);
        assert_eq!(canonical(&export(&restored)), canonical(&spec));
    }

    #[test]
    fn test_unresolvable_mismatch_is_skipped_once() {
        let (mut session, logs) = create_log_chain(&[LiteralValue::Int(0)]);
        let multiply = session.spawn(NodeKind::Multiplication, Point::new(0.0, 300.0), 1.0);
        let size = session.spawn(NodeKind::ScreenSize, Point::new(0.0, 500.0), 1.0);
        session.connect_direct(PlugRef::data(multiply, 0), SocketRef::data(logs[0], 0)).unwrap();
        session.connect_direct(PlugRef::data(size, 0), SocketRef::data(multiply, 0)).unwrap();
        let mut spec = export(&session);
        record_mut(&mut spec, &size.to_string()).identifier = "OpenVS-Base-DInfo-Mobile".to_string();

        let mut restored = GraphSession::default();
        let report = import(&mut restored, &NodeRegistry::standard(), &spec);
        assert_eq!(report.skipped_edges, 1);
        assert_eq!(restored.connector_count(), 2);
    }

    #[test]
    fn test_variables_survive_round_trip() {
        let mut session = GraphSession::default();
        assert!(session.register_variable("score", PortType::String));
        let start = session.spawn(NodeKind::StartEvent, Point::new(0.0, 0.0), 1.0);
        let write = session.spawn(NodeKind::VariableWrite, Point::new(300.0, 0.0), 1.0);
        let read = session.spawn(NodeKind::VariableRead, Point::new(0.0, 300.0), 1.0);
        let name = || Some(LiteralValue::Str("score".to_string()));
        session.set_socket_value(SocketRef::data(write, 0), name());
        session.set_socket_value(SocketRef::data(read, 0), name());
        session.connect_direct(PlugRef::flow(start, 0), SocketRef::flow(write, 0)).unwrap();
        session.connect_direct(PlugRef::data(read, 0), SocketRef::data(write, 1)).unwrap();
        let spec = export(&session);

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["variables"]["score"], "str");

        let mut restored = GraphSession::default();
        let parsed = ProgramSpec::from_json(&spec.to_json().unwrap()).unwrap();
        let report = import(&mut restored, &NodeRegistry::standard(), &parsed);
        assert_eq!(report.skipped_edges, 0);
        assert_eq!(restored.connector_count(), 2);
        assert_eq!(restored.variables().get("score"), Some(&PortType::String));
        let id = report.nodes[&read.to_string()];
        assert_eq!(restored.node(id).unwrap().frame.data_plugs[0].port_type, PortType::String);
    }
}
