use super::{ConnectorId, ConnectorStyle, NodeId, PortType, SOCKET_RADIUS, compatible};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which collection of a node a port lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    /// Control-order ports.
    Flow,
    /// Value ports.
    Data,
}

/// Address of a socket: owning node, collection, index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketRef {
    pub node: NodeId,
    pub kind: PortKind,
    pub index: usize,
}

/// Address of a plug: owning node, collection, index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlugRef {
    pub node: NodeId,
    pub kind: PortKind,
    pub index: usize,
}

impl SocketRef {
    pub fn flow(node: NodeId, index: usize) -> Self {
        Self { node, kind: PortKind::Flow, index }
    }

    pub fn data(node: NodeId, index: usize) -> Self {
        Self { node, kind: PortKind::Data, index }
    }
}

impl PlugRef {
    pub fn flow(node: NodeId, index: usize) -> Self {
        Self { node, kind: PortKind::Flow, index }
    }

    pub fn data(node: NodeId, index: usize) -> Self {
        Self { node, kind: PortKind::Data, index }
    }
}

/// A constant stored on an unconnected data socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<LiteralValue>),
}

impl LiteralValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LiteralValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Int(i) => write!(f, "{}", i),
            LiteralValue::Float(n) => write!(f, "{}", n),
            LiteralValue::Str(s) => write!(f, "{}", s),
            LiteralValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// An input endpoint on a node.
#[derive(Debug, Clone)]
pub struct Socket {
    pub port_type: PortType,
    pub label: String,
    /// Incoming connectors. Data sockets hold at most one; flow sockets may be
    /// the target of several flow plugs.
    pub incoming: Vec<ConnectorId>,
    /// Constant used when the socket is unconnected.
    pub value: Option<LiteralValue>,
    /// Whether an inline editor for `value` exists on this socket.
    pub user_input: bool,
    /// Whether that editor is currently shown. Hidden while connected.
    pub editor_visible: bool,
    /// Extra plug types accepted on top of the declared type.
    pub phantom_types: Vec<PortType>,
    /// Current indicator radius, unscaled.
    pub radius: f64,
    default_radius: f64,
}

impl Socket {
    pub fn new(port_type: PortType, label: impl Into<String>) -> Self {
        let user_input = port_type.accepts_user_input();
        // ANY sockets render a smaller, hollow indicator.
        let default_radius = if port_type == PortType::Any {
            SOCKET_RADIUS * 0.7
        } else {
            SOCKET_RADIUS
        };
        Self {
            port_type,
            label: label.into(),
            incoming: Vec::new(),
            value: None,
            user_input,
            editor_visible: user_input,
            phantom_types: Vec::new(),
            radius: default_radius,
            default_radius,
        }
    }

    pub fn flow() -> Self {
        Self::new(PortType::Connector, "")
    }

    pub fn is_connected(&self) -> bool {
        !self.incoming.is_empty()
    }

    /// The most recently attached connector.
    pub fn connector(&self) -> Option<ConnectorId> {
        self.incoming.last().copied()
    }

    /// Whether the current value comes from the stored constant.
    pub fn is_constant(&self) -> bool {
        !self.is_connected()
    }

    pub fn accepts(&self, plug_type: PortType) -> bool {
        if compatible(self.port_type, plug_type) {
            return true;
        }
        plug_type != PortType::Connector && self.phantom_types.contains(&plug_type)
    }

    pub fn set_type(&mut self, port_type: PortType) {
        self.port_type = port_type;
        self.default_radius = if port_type == PortType::Any {
            SOCKET_RADIUS * 0.7
        } else {
            SOCKET_RADIUS
        };
        self.radius = self.default_radius;
    }

    pub fn default_radius(&self) -> f64 {
        self.default_radius
    }

    pub fn reset_radius(&mut self) {
        self.radius = self.default_radius;
    }

    pub fn add_phantoms(&mut self, types: &[PortType]) -> &[PortType] {
        self.phantom_types.extend_from_slice(types);
        &self.phantom_types
    }

    /// Clears phantom types and returns how many were removed.
    pub fn reset_phantoms(&mut self) -> usize {
        let removed = self.phantom_types.len();
        self.phantom_types.clear();
        removed
    }
}

/// An output endpoint on a node.
#[derive(Debug, Clone)]
pub struct Plug {
    pub port_type: PortType,
    pub label: String,
    /// Style used for connectors dragged out of this plug.
    pub style: ConnectorStyle,
    /// Attached connectors, in attachment order.
    pub connected: Vec<ConnectorId>,
    /// Visual emphasis; dimmed plugs are drawn at reduced opacity.
    pub opacity: f64,
}

impl Plug {
    pub fn new(port_type: PortType, label: impl Into<String>, style: ConnectorStyle) -> Self {
        Self {
            port_type,
            label: label.into(),
            style,
            connected: Vec::new(),
            opacity: 1.0,
        }
    }

    pub fn flow(label: impl Into<String>, style: ConnectorStyle) -> Self {
        Self::new(PortType::Connector, label, style)
    }

    pub fn is_connected(&self) -> bool {
        !self.connected.is_empty()
    }
}
