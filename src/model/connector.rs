use super::{ConnectorId, PlugRef, Point, SocketRef};
use serde::{Deserialize, Serialize};

/// How a connector's path is drawn. Purely visual: switching style never
/// touches the logical edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    #[default]
    Bezier,
    Line,
}

impl ConnectorStyle {
    pub fn toggled(self) -> Self {
        match self {
            ConnectorStyle::Bezier => ConnectorStyle::Line,
            ConnectorStyle::Line => ConnectorStyle::Bezier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    /// Free end follows the pointer.
    Dragging,
    /// Snapped to a socket.
    Connected,
}

/// A directed edge from a plug to a socket, or an in-progress drag.
#[derive(Debug, Clone)]
pub struct Connector {
    pub id: ConnectorId,
    pub plug: PlugRef,
    pub connected_to: Option<SocketRef>,
    pub style: ConnectorStyle,
    pub state: ConnectorState,
    /// Anchor at the plug end, in canvas coordinates.
    pub start: Point,
    /// Anchor at the socket end, or the pointer while dragging.
    pub end: Point,
}

impl Connector {
    pub fn new(id: ConnectorId, plug: PlugRef, start: Point, end: Point, style: ConnectorStyle) -> Self {
        Self {
            id,
            plug,
            connected_to: None,
            style,
            state: ConnectorState::Dragging,
            start,
            end,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectorState::Connected && self.connected_to.is_some()
    }

    /// Path control points for the current style: start, two controls, end.
    pub fn path(&self) -> [Point; 4] {
        match self.style {
            ConnectorStyle::Bezier => {
                let mid_x = self.start.x + (self.end.x - self.start.x) / 2.0;
                [
                    self.start,
                    Point::new(mid_x, self.start.y),
                    Point::new(mid_x, self.end.y),
                    self.end,
                ]
            }
            ConnectorStyle::Line => [self.start, self.start, self.end, self.end],
        }
    }
}
