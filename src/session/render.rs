use crate::model::{ConnectorId, ConnectorStyle, NodeId, Point};

/// Anything the rendering collaborator draws on behalf of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drawable {
    Node(NodeId),
    Connector(ConnectorId),
}

/// Receives geometry updates from a session.
///
/// The session never reads anything back; a sink is a pure output. Every
/// method defaults to a no-op so headless hosts can ignore what they like.
pub trait RenderSink {
    fn attach(&mut self, _drawable: Drawable) {}

    fn set_position(&mut self, _drawable: Drawable, _position: Point) {}

    fn set_scale(&mut self, _drawable: Drawable, _scale: f64) {}

    /// New path of a connector: start, two control points, end.
    fn set_path(&mut self, _connector: ConnectorId, _style: ConnectorStyle, _path: [Point; 4]) {}

    /// Draw above every sibling of the same kind.
    fn raise(&mut self, _drawable: Drawable) {}

    fn dispose(&mut self, _drawable: Drawable) {}
}

/// A sink that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {}
