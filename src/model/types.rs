use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a socket or plug.
///
/// `Connector` is the flow type: it only ever appears on flow sockets and flow
/// plugs and never mixes with data edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    #[serde(rename = "bool")]
    Boolean,
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "num")]
    Number,
    #[serde(rename = "str")]
    String,
    #[serde(rename = "arr")]
    Array,
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "connect")]
    Connector,
}

impl PortType {
    pub const ALL: [PortType; 8] = [
        PortType::Boolean,
        PortType::Integer,
        PortType::Float,
        PortType::Number,
        PortType::String,
        PortType::Array,
        PortType::Any,
        PortType::Connector,
    ];

    /// The short wire name, e.g. `"num"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PortType::Boolean => "bool",
            PortType::Integer => "int",
            PortType::Float => "float",
            PortType::Number => "num",
            PortType::String => "str",
            PortType::Array => "arr",
            PortType::Any => "any",
            PortType::Connector => "connect",
        }
    }

    /// The label rendered next to a port.
    pub fn label(&self) -> &'static str {
        match self {
            PortType::Boolean => "BOOL",
            PortType::Integer => "INT",
            PortType::Float => "FLOAT",
            PortType::Number => "NUM",
            PortType::String => "STR",
            PortType::Array => "ARR",
            PortType::Any => "ANY",
            PortType::Connector => "",
        }
    }

    pub fn is_flow(&self) -> bool {
        matches!(self, PortType::Connector)
    }

    /// Types a socket of this type accepts besides its own.
    pub fn coercions(&self) -> &'static [PortType] {
        match self {
            PortType::Number => &[PortType::Integer, PortType::Float],
            _ => &[],
        }
    }

    /// Whether constants of this type can be typed into the socket directly.
    pub fn accepts_user_input(&self) -> bool {
        matches!(
            self,
            PortType::Boolean
                | PortType::Integer
                | PortType::Float
                | PortType::Number
                | PortType::String
        )
    }

    /// Rank used when a node derives its output type from several inputs.
    fn rank(&self) -> i8 {
        match self {
            PortType::Boolean => -2,
            PortType::Integer => -1,
            PortType::Float => 0,
            PortType::Number => 1,
            PortType::String => 2,
            PortType::Array => 3,
            PortType::Any => 4,
            PortType::Connector => 5,
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a socket declared as `socket` accepts a plug declared as `plug`.
///
/// The socket is always the left operand; the relation is not symmetric.
pub fn compatible(socket: PortType, plug: PortType) -> bool {
    if socket == PortType::Any && plug != PortType::Connector {
        return true;
    }
    if socket == plug {
        return true;
    }
    socket.coercions().contains(&plug)
}

/// The highest-ranked type among `types`, or `None` for an empty slice.
pub fn result_type(types: &[PortType]) -> Option<PortType> {
    types.iter().copied().max_by_key(PortType::rank)
}
