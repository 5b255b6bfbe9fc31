//! The node-graph data model: port types, ports, connectors and nodes.
//!
//! Everything here is plain data. Mutation that has to keep several objects
//! consistent (connecting, moving, deleting) goes through
//! [`GraphSession`](crate::session::GraphSession).

pub mod connector;
pub mod geometry;
pub mod ids;
pub mod kinds;
pub mod node;
pub mod port;
pub mod types;

pub use connector::*;
pub use geometry::*;
pub use ids::*;
pub use kinds::*;
pub use node::*;
pub use port::*;
pub use types::*;

/// A live node: its kind and the frame holding its ports.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub frame: NodeFrame,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.frame.id
    }

    pub fn identifier(&self) -> &str {
        &self.frame.identifier
    }
}
