//! Export tests
//!
//! Checks the shape of the program specification written for a session.
//!
mod common;
use common::*;
use visflow::prelude::*;

#[cfg(test)]
mod export_tests {
    use super::*;

    fn node_uid(entry: &FlowEntry) -> &str {
        match entry {
            FlowEntry::Node(record) => &record.uid,
            other => panic!("expected a node entry, got {:?}", other),
        }
    }

    #[test]
    fn test_condition_exports_branch_without_split() {
        let scenario = create_condition_scenario();
        let spec = export(&scenario.session);

        assert_eq!(spec.flows.len(), 1);
        let flow = &spec.flows[0];
        assert_eq!(flow.len(), 3);
        assert_eq!(node_uid(&flow[0]), scenario.start.to_string());
        assert_eq!(node_uid(&flow[1]), scenario.condition.to_string());

        let FlowEntry::Branch { branches } = &flow[2] else {
            panic!("expected a branch after the condition");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].len(), 1);
        assert_eq!(node_uid(&branches[0][0]), scenario.log.to_string());
        assert!(branches[1].is_empty());
        assert!(!flow.iter().any(|e| matches!(e, FlowEntry::Split { .. })));

        assert_eq!(spec.additional.len(), 1);
        assert_eq!(spec.additional[0].uid, scenario.mobile.to_string());
        assert_eq!(spec.additional[0].identifier, "OpenVS-Base-DInfo-Mobile");
    }

    #[test]
    fn test_fan_out_emits_split_marker() {
        let mut session = GraphSession::default();
        let start = session.spawn(NodeKind::StartEvent, Point::new(0.0, 0.0), 1.0);
        let first = session.spawn(NodeKind::ConsoleLog, Point::new(300.0, 0.0), 1.0);
        let second = session.spawn(NodeKind::ConsoleLog, Point::new(300.0, 200.0), 1.0);
        session.connect_direct(PlugRef::flow(start, 0), SocketRef::flow(first, 0)).unwrap();
        session.connect_direct(PlugRef::flow(start, 0), SocketRef::flow(second, 0)).unwrap();

        let flow = &export(&session).flows[0];
        assert_eq!(flow.len(), 3);
        assert_eq!(flow[1], FlowEntry::Split { branch_count: 2 });
        let FlowEntry::Branch { branches } = &flow[2] else {
            panic!("expected a branch after the split");
        };
        assert_eq!(node_uid(&branches[0][0]), first.to_string());
        assert_eq!(node_uid(&branches[1][0]), second.to_string());
    }

    #[test]
    fn test_linear_chain_and_flow_order() {
        let values = [LiteralValue::Int(1), LiteralValue::Int(2), LiteralValue::Int(3)];
        let (mut session, logs) = create_log_chain(&values);
        let second_start = session.spawn(NodeKind::StartEvent, Point::new(0.0, 500.0), 1.0);

        let spec = export(&session);
        assert_eq!(spec.flows.len(), 2);
        assert_eq!(spec.flows[0].len(), 4);
        let uids: Vec<&str> = spec.flows[0][1..].iter().map(node_uid).collect();
        let expected: Vec<String> = logs.iter().map(|id| id.to_string()).collect();
        assert_eq!(uids, expected);

        assert_eq!(spec.flows[1].len(), 1);
        assert_eq!(node_uid(&spec.flows[1][0]), second_start.to_string());
        assert!(spec.additional.is_empty());
    }

    #[test]
    fn test_flow_loop_is_cut() {
        let (mut session, logs) = create_log_chain(&[LiteralValue::Int(1), LiteralValue::Int(2)]);
        session
            .connect_direct(PlugRef::flow(logs[1], 0), SocketRef::flow(logs[0], 0))
            .unwrap();

        let spec = export(&session);
        assert_eq!(spec.flows[0].len(), 3);
        assert_eq!(node_uid(&spec.flows[0][2]), logs[1].to_string());
    }

    #[test]
    fn test_inputs_record_constants_and_sources() {
        let scenario = create_condition_scenario();
        let mut session = scenario.session;
        session.set_socket_value(
            SocketRef::data(scenario.log, 0),
            Some(LiteralValue::Str("hello".to_string())),
        );
        let spec = export(&session);

        let condition = spec.find(&scenario.condition.to_string()).unwrap();
        let input = &condition.inputs[0];
        assert!(!input.constant);
        assert_eq!(input.source, Some(scenario.mobile.to_string()));
        assert_eq!(input.port, Some(0));
        assert_eq!(input.port_type, PortType::Boolean);

        let log = spec.find(&scenario.log.to_string()).unwrap();
        assert!(log.inputs[0].constant);
        assert_eq!(log.inputs[0].source, None);
        assert_eq!(log.inputs[0].value, Some(LiteralValue::Str("hello".to_string())));

        let mobile = &spec.additional[0];
        assert_eq!(mobile.data_plugs[0].len(), 1);
        assert_eq!(mobile.data_plugs[0][0].con_to, scenario.condition.to_string());
        assert_eq!(mobile.data_plugs[0][0].target_port, 0);
    }

    #[test]
    fn test_additional_is_deduplicated_and_transitive() {
        let (mut session, logs) = create_log_chain(&[LiteralValue::Int(0), LiteralValue::Int(0)]);
        let size = session.spawn(NodeKind::ScreenSize, Point::new(0.0, 300.0), 1.0);
        let add = session.spawn(NodeKind::Addition, Point::new(300.0, 300.0), 1.0);
        session.connect_direct(PlugRef::data(size, 0), SocketRef::data(add, 0)).unwrap();
        session.connect_direct(PlugRef::data(size, 1), SocketRef::data(add, 1)).unwrap();
        for log in &logs {
            session
                .connect_direct(PlugRef::data(add, 0), SocketRef::data(*log, 0))
                .unwrap();
        }

        let spec = export(&session);
        let uids: Vec<&str> = spec.additional.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids, vec![add.to_string(), size.to_string()]);
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let scenario = create_condition_scenario();
        let json = serde_json::to_value(export(&scenario.session)).unwrap();

        let start = &json["flows"][0][0];
        assert_eq!(start["kind"], "node");
        assert_eq!(start["node"], "StartEventNode");
        assert_eq!(start["identifier"], "OpenVS-Base-Event-Start");
        assert!(start["flowPlugs"][0][0]["connectorId"].is_string());
        assert_eq!(start["flowPlugs"][0][0]["conTo"], scenario.condition.to_string());
        assert_eq!(start["flowPlugs"][0][0]["targetPort"], 0);
        assert!(start.get("variant").is_none());

        let condition = &json["flows"][0][1];
        assert_eq!(condition["inputs"][0]["type"], "bool");
        assert_eq!(condition["inputs"][0]["constant"], false);
        assert_eq!(json["flows"][0][2]["kind"], "branch");
    }

    #[test]
    fn test_variant_is_exported() {
        let (mut session, logs) = create_log_chain(&[LiteralValue::Int(0)]);
        let math = session.spawn(NodeKind::Math, Point::new(0.0, 300.0), 1.0);
        session.switch_variant(math, VariantKind::Multiply);
        session.connect_direct(PlugRef::data(math, 0), SocketRef::data(logs[0], 0)).unwrap();

        let spec = export(&session);
        let record = &spec.additional[0];
        assert_eq!(record.variant, Some(VariantKind::Multiply));
        assert_eq!(record.snippet_key(), "OpenVS-Base-Basic-Math:multiply");

        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["variant"], "multiply");
    }

    #[test]
    fn test_export_is_deterministic() {
        let scenario = create_condition_scenario();
        let first = export(&scenario.session).to_json().unwrap();
        let second = export(&scenario.session).to_json().unwrap();
        assert_eq!(first, second);

        let parsed = ProgramSpec::from_json(&first).unwrap();
        assert_eq!(parsed, export(&scenario.session));
    }

    #[test]
    fn test_display_tree() {
        let scenario = create_condition_scenario();
        let spec = export(&scenario.session);
        let tree = DisplaySpec { spec: &spec }.to_string();

        assert!(tree.starts_with("Flow 0\n"));
        assert!(tree.contains("Branch (2)"));
        assert!(tree.contains("<empty>"));
        assert!(tree.contains("[OpenVS-Base-Basic-Condition] ($0<-n3:0)"));
        assert!(tree.contains("Additional\n└── n3 [OpenVS-Base-DInfo-Mobile]"));
    }
}
