use super::{
    ConnectorStyle, LiteralValue, NodeBody, NodeClass, NodeFrame, PortKind, PortType, VariantKind,
    result_type,
};
use ahash::AHashMap;

/// Identifier of the canonical two-way branch node. Its branches are exported
/// without a preceding branch-split marker.
pub const CONDITION_IDENTIFIER: &str = "OpenVS-Base-Basic-Condition";
/// Identifier of the node kind flows start from.
pub const START_IDENTIFIER: &str = "OpenVS-Base-Event-Start";

/// Defines the closed set of node kinds together with their stable identifier,
/// display name, palette class and wire type name.
macro_rules! define_node_kinds {
    ( $( ($variant:ident, $identifier:literal, $name:literal, $class:expr) ),* $(,)? ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $( $variant, )*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[ $( NodeKind::$variant, )* ];

            /// The stable identifier written to exported programs.
            pub fn identifier(&self) -> &'static str {
                match self {
                    $( NodeKind::$variant => $identifier, )*
                }
            }

            pub fn display_name(&self) -> &'static str {
                match self {
                    $( NodeKind::$variant => $name, )*
                }
            }

            pub fn class(&self) -> NodeClass {
                match self {
                    $( NodeKind::$variant => $class, )*
                }
            }

            /// The kind's type name, e.g. `"ConditionNode"`.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( NodeKind::$variant => concat!(stringify!($variant), "Node"), )*
                }
            }

            pub fn from_identifier(identifier: &str) -> Option<Self> {
                match identifier {
                    $( $identifier => Some(NodeKind::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

define_node_kinds! {
    (StartEvent, "OpenVS-Base-Event-Start", "Start", NodeClass::Event),
    (Condition, "OpenVS-Base-Basic-Condition", "If", NodeClass::Basic),
    (ConsoleLog, "OpenVS-Base-Console-Log", "Log", NodeClass::Console),
    (IsMobile, "OpenVS-Base-DInfo-Mobile", "Is Mobile", NodeClass::DeviceInfo),
    (ScreenSize, "OpenVS-Base-DInfo-SSize", "Screen Size", NodeClass::DeviceInfo),
    (Addition, "OpenVS-Base-Basic-Add", "Add (Math)", NodeClass::Basic),
    // Misspelled identifier is what existing saved graphs carry.
    (GeneralAddition, "OpenVS-Base-Baisc-GAdd", "Add", NodeClass::Basic),
    (Multiplication, "OpenVS-Base-Basic-Multiply", "Multiply (Math)", NodeClass::Basic),
    (Math, "OpenVS-Base-Basic-Math", "Math", NodeClass::Basic),
    (VariableWrite, "OpenVS-Base-Variable-Write", "Write Variable", NodeClass::Basic),
    (VariableRead, "OpenVS-Base-Variable-Read", "Read Variable", NodeClass::Basic),
}

impl NodeKind {
    /// Lays out the kind's ports on a fresh frame.
    pub fn build(&self, frame: &mut NodeFrame, style: ConnectorStyle) {
        match self {
            NodeKind::StartEvent => {
                frame.add_flow_plug("Start", style);
            }
            NodeKind::Condition => {
                frame.add_flow_socket();
                frame.add_flow_plug("Met", style);
                frame.add_flow_plug("Not met", style);
                frame.add_data_socket(PortType::Boolean, "Condition");
                frame.force_branch = true;
            }
            NodeKind::ConsoleLog => {
                frame.add_flow_socket();
                frame.add_flow_plug("", style);
                frame.add_data_socket(PortType::Any, "Object");
            }
            NodeKind::IsMobile => {
                frame.add_data_plug(PortType::Boolean, "Is Mobile", style);
            }
            NodeKind::ScreenSize => {
                frame.add_data_plug(PortType::Integer, "Pixels X", style);
                frame.add_data_plug(PortType::Integer, "Pixels Y", style);
            }
            NodeKind::Addition => build_variant_ports(frame, VariantKind::Add, style),
            NodeKind::Multiplication => build_variant_ports(frame, VariantKind::Multiply, style),
            NodeKind::GeneralAddition => {
                frame.add_data_socket(PortType::Any, "A");
                frame.add_data_socket(PortType::Any, "B");
                frame.add_data_plug(PortType::Any, "Result", style);
            }
            NodeKind::Math => {
                // Room for the operation selector above the ports.
                frame.set_connection_offset(28.0);
                frame.body = NodeBody::Variant(VariantKind::Add);
                frame.name = VariantKind::Add.display_name().to_string();
                build_variant_ports(frame, VariantKind::Add, style);
            }
            NodeKind::VariableWrite => {
                frame.add_flow_socket();
                frame.add_flow_plug("", style);
                frame.add_data_socket(PortType::String, "Name");
                frame.add_data_socket(PortType::String, "Value");
            }
            NodeKind::VariableRead => {
                frame.add_data_socket(PortType::String, "Name");
                frame.add_data_plug(PortType::Any, "Value", style);
            }
        }
    }

    /// Reacts to a connector snapping onto one of the node's sockets.
    pub fn on_socket_connected(
        &self,
        frame: &mut NodeFrame,
        kind: PortKind,
        index: usize,
        plug_type: PortType,
    ) {
        let Some(socket) = frame.socket_mut(kind, index) else {
            return;
        };
        if socket.user_input {
            socket.editor_visible = false;
        }
        if socket.port_type == PortType::Boolean {
            frame.reset_simulation();
        }
        if *self == NodeKind::GeneralAddition && kind == PortKind::Data {
            if let Some(socket) = frame.socket_mut(kind, index) {
                socket.set_type(plug_type);
            }
            update_general_addition_output(frame);
        }
    }

    /// Reacts to a connector leaving one of the node's sockets.
    pub fn on_socket_disconnected(&self, frame: &mut NodeFrame, kind: PortKind, index: usize) {
        if *self == NodeKind::GeneralAddition && kind == PortKind::Data {
            if let Some(socket) = frame.socket_mut(kind, index) {
                socket.set_type(PortType::Any);
            }
            update_general_addition_output(frame);
        }
        let Some(socket) = frame.socket_mut(kind, index) else {
            return;
        };
        if socket.user_input {
            socket.editor_visible = true;
        }
        if socket.port_type == PortType::Boolean {
            if let Some(state) = frame.simulated {
                frame.simulate(state);
            }
        }
    }

    /// Reacts to a constant being typed into a data socket.
    pub fn on_value_changed(
        &self,
        frame: &mut NodeFrame,
        index: usize,
        value: Option<&LiteralValue>,
        variables: &AHashMap<String, PortType>,
    ) {
        match self {
            NodeKind::Condition => {
                if let Some(state) = value.and_then(LiteralValue::as_bool) {
                    frame.simulate(state);
                }
            }
            NodeKind::VariableRead if index == 0 => {
                let port_type = value
                    .and_then(LiteralValue::as_str)
                    .and_then(|name| variables.get(name).copied())
                    .unwrap_or(PortType::Any);
                if let Some(plug) = frame.data_plugs.first_mut() {
                    plug.port_type = port_type;
                }
            }
            _ => {}
        }
    }
}

/// Rebuilds the data ports of an arithmetic body. Deterministic in `variant`.
pub fn build_variant_ports(frame: &mut NodeFrame, variant: VariantKind, style: ConnectorStyle) {
    frame.reset_data_ports();
    frame.add_data_socket(PortType::Number, "A");
    frame.add_data_socket(PortType::Number, "B");
    let output = match variant {
        VariantKind::Add => "Result",
        VariantKind::Multiply => "Product",
    };
    frame.add_data_plug(PortType::Number, output, style);
}

fn update_general_addition_output(frame: &mut NodeFrame) {
    let inputs: Vec<PortType> = frame.data_sockets.iter().map(|s| s.port_type).collect();
    if let (Some(port_type), Some(plug)) = (result_type(&inputs), frame.data_plugs.first_mut()) {
        plug.port_type = port_type;
    }
}
