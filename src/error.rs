use crate::model::{NodeId, PortType};
use thiserror::Error;

/// Errors that stop compilation of a program specification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Node '{node_id}' has identifier '{identifier}', which has no entry in the snippet table")]
    UnknownIdentifier { node_id: String, identifier: String },

    #[error("Node '{node_id}' reads input {input_index} from node '{source_node_id}', which is not part of the specification")]
    MissingSource {
        node_id: String,
        input_index: usize,
        source_node_id: String,
    },

    #[error("Node '{node_id}' has no output expression for port {port}")]
    MissingOutput { node_id: String, port: usize },

    #[error("Data dependency cycle detected at node '{node_id}'")]
    DataCycle { node_id: String },

    #[error("Data dependencies of node '{node_id}' nest deeper than the limit of {limit}")]
    RecursionLimit { node_id: String, limit: usize },

    #[error("Input {input_index} of node '{node_id}' is invalid: {message}")]
    InvalidInput {
        node_id: String,
        input_index: usize,
        message: String,
    },

    #[error("Invalid program specification: {0}")]
    InvalidSpec(String),
}

/// Reasons a direct (non-interactive) connection is refused.
///
/// Interactive dragging never surfaces these; candidate filtering simply
/// leaves such sockets out.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("Node '{0}' does not exist in this session")]
    UnknownNode(NodeId),

    #[error("Node '{node}' has no {what} at index {index}")]
    UnknownPort {
        node: NodeId,
        what: &'static str,
        index: usize,
    },

    #[error("Node '{0}' cannot connect to itself")]
    SelfConnection(NodeId),

    #[error("A '{socket}' socket does not accept a '{plug}' plug")]
    TypeMismatch { socket: PortType, plug: PortType },

    #[error("The plug is already connected to this socket")]
    Duplicate,

    #[error("The data socket is already connected")]
    SocketOccupied,
}

/// Errors reading or writing the program specification format.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
