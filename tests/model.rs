//! Tests for port typing, node layout and the node registry.
mod common;
use visflow::model::*;
use visflow::prelude::*;

#[test]
fn test_any_socket_accepts_every_data_type() {
    for plug in PortType::ALL {
        let expected = plug != PortType::Connector;
        assert_eq!(
            compatible(PortType::Any, plug),
            expected,
            "ANY socket with {} plug",
            plug
        );
    }
}

#[test]
fn test_number_accepts_integer_and_float() {
    assert!(compatible(PortType::Number, PortType::Integer));
    assert!(compatible(PortType::Number, PortType::Float));
    assert!(compatible(PortType::Number, PortType::Number));
    assert!(!compatible(PortType::Integer, PortType::Number));
    assert!(!compatible(PortType::String, PortType::Number));
}

#[test]
fn test_flow_type_only_matches_itself() {
    assert!(compatible(PortType::Connector, PortType::Connector));
    for plug in PortType::ALL.into_iter().filter(|t| !t.is_flow()) {
        assert!(!compatible(PortType::Connector, plug));
    }
}

#[test]
fn test_result_type_picks_highest_rank() {
    assert_eq!(
        result_type(&[PortType::Integer, PortType::Float]),
        Some(PortType::Float)
    );
    assert_eq!(
        result_type(&[PortType::Boolean, PortType::String, PortType::Number]),
        Some(PortType::String)
    );
    assert_eq!(
        result_type(&[PortType::Integer, PortType::Any]),
        Some(PortType::Any)
    );
    assert_eq!(result_type(&[]), None);
}

#[test]
fn test_phantom_types_widen_a_socket() {
    let mut socket = Socket::new(PortType::Boolean, "Flag");
    assert!(!socket.accepts(PortType::Integer));

    socket.add_phantoms(&[PortType::Integer, PortType::Connector]);
    assert!(socket.accepts(PortType::Integer));
    assert!(!socket.accepts(PortType::Connector));

    assert_eq!(socket.reset_phantoms(), 2);
    assert!(!socket.accepts(PortType::Integer));
}

#[test]
fn test_any_socket_has_smaller_indicator() {
    let any = Socket::new(PortType::Any, "Object");
    let number = Socket::new(PortType::Number, "A");
    assert!(any.default_radius() < number.default_radius());
    assert!(!any.user_input);
    assert!(number.user_input && number.editor_visible);
}

#[test]
fn test_port_type_wire_names() {
    let json = serde_json::to_string(&PortType::Number).unwrap();
    assert_eq!(json, "\"num\"");
    let parsed: PortType = serde_json::from_str("\"connect\"").unwrap();
    assert_eq!(parsed, PortType::Connector);
}

#[test]
fn test_rows_grow_in_lockstep() {
    let mut frame = NodeFrame::new(NodeId(0), "test", "Test", NodeClass::Basic);
    let base = frame.height;

    frame.add_flow_socket();
    assert_eq!(frame.height, base + FLOW_ROW_HEIGHT);
    // The matching plug shares the row.
    frame.add_flow_plug("", ConnectorStyle::Bezier);
    assert_eq!(frame.height, base + FLOW_ROW_HEIGHT);
    frame.add_flow_plug("", ConnectorStyle::Bezier);
    assert_eq!(frame.height, base + 2.0 * FLOW_ROW_HEIGHT);

    frame.add_data_plug(PortType::Boolean, "Out", ConnectorStyle::Bezier);
    frame.add_data_socket(PortType::Boolean, "In");
    assert_eq!(frame.height, base + 2.0 * FLOW_ROW_HEIGHT + DATA_ROW_HEIGHT);
}

#[test]
fn test_condition_layout() {
    let mut session = GraphSession::default();
    let id = session.spawn(NodeKind::Condition, Point::new(0.0, 0.0), 1.0);
    let frame = &session.node(id).unwrap().frame;

    assert_eq!(frame.flow_sockets.len(), 1);
    assert_eq!(frame.flow_plugs.len(), 2);
    assert_eq!(frame.flow_plugs[0].label, "Met");
    assert_eq!(frame.flow_plugs[1].label, "Not met");
    assert_eq!(frame.data_sockets[0].port_type, PortType::Boolean);
    assert!(frame.force_branch);
    assert_eq!(frame.height, 37.5 + 72.0 + 28.0);
}

#[test]
fn test_math_layout_is_stable_across_variants() {
    let mut session = GraphSession::default();
    let id = session.spawn(NodeKind::Math, Point::new(0.0, 0.0), 1.0);
    let before = session.node(id).unwrap().frame.height;
    assert_eq!(before, 37.5 + 28.0 + 56.0);

    session.switch_variant(id, VariantKind::Multiply);
    let frame = &session.node(id).unwrap().frame;
    assert_eq!(frame.height, before);
    assert_eq!(frame.data_plugs[0].label, "Product");
    assert_eq!(frame.body, NodeBody::Variant(VariantKind::Multiply));
}

#[test]
fn test_anchors_follow_scale() {
    let mut frame = NodeFrame::new(NodeId(0), "test", "Test", NodeClass::Basic);
    frame.add_flow_socket();
    frame.position = Point::new(100.0, 100.0);

    let at_one = socket_anchor(&frame, PortKind::Flow, 0).unwrap();
    frame.scale = 2.0;
    let at_two = socket_anchor(&frame, PortKind::Flow, 0).unwrap();
    assert_eq!(at_one.x, 100.0);
    assert_eq!(at_two.y - 100.0, 2.0 * (at_one.y - 100.0));
    assert!(socket_anchor(&frame, PortKind::Data, 0).is_none());
}

#[test]
fn test_node_kind_identifiers_round_trip() {
    for kind in NodeKind::ALL {
        assert_eq!(NodeKind::from_identifier(kind.identifier()), Some(*kind));
        assert!(kind.type_name().ends_with("Node"));
    }
    assert_eq!(NodeKind::Condition.type_name(), "ConditionNode");
    assert_eq!(NodeKind::from_identifier("OpenVS-Base-Nope"), None);
}

#[test]
fn test_ids_display_in_base36() {
    assert_eq!(NodeId(0).to_string(), "n0");
    assert_eq!(NodeId(36).to_string(), "n10");
    assert_eq!(ConnectorId(35).to_string(), "cz");
}

#[test]
fn test_standard_registry_covers_every_kind() {
    let registry = NodeRegistry::standard();
    assert_eq!(registry.len(), NodeKind::ALL.len());
    assert_eq!(
        registry.lookup("OpenVS-Base-Basic-Condition"),
        Some(NodeKind::Condition)
    );
    assert_eq!(registry.lookup("unknown"), None);
}

#[test]
fn test_registry_aliases_and_palette() {
    let mut registry = NodeRegistry::new();
    registry.register("Legacy-Log", NodeKind::ConsoleLog, "Old Log", NodeClass::Console);
    registry.register(
        NodeKind::StartEvent.identifier(),
        NodeKind::StartEvent,
        "Start",
        NodeClass::Event,
    );
    let previous = registry.register("Legacy-Log", NodeKind::ConsoleLog, "Log", NodeClass::Console);
    assert_eq!(previous.map(|e| e.display_name), Some("Old Log".to_string()));

    let palette = registry.palette();
    let classes: Vec<NodeClass> = palette.iter().map(|(class, _)| *class).collect();
    assert_eq!(classes, vec![NodeClass::Event, NodeClass::Console]);
    assert_eq!(palette[1].1[0].0, "Legacy-Log");
}

#[test]
fn test_session_config_from_json_fills_defaults() {
    let config = SessionConfig::from_json(r#"{ "allowAnyPlugDrag": true }"#).unwrap();
    assert!(config.allow_any_plug_drag);
    assert_eq!(config.snap_distance, 50.0);
    assert_eq!(config.connector_style, ConnectorStyle::Bezier);

    let line = SessionConfig::from_json(r#"{ "connectorStyle": "line" }"#).unwrap();
    assert_eq!(line.connector_style, ConnectorStyle::Line);
    assert!(SessionConfig::from_json("not json").is_err());
}
