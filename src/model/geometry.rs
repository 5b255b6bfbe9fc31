use serde::{Deserialize, Serialize};

/// Unscaled width of a node body.
pub const NODE_WIDTH: f64 = 200.0;
/// Unscaled height of a node with no ports.
pub const NODE_BASE_HEIGHT: f64 = 37.5;
/// Offset of the first flow row below the node origin.
pub const FLOW_ROWS_TOP: f64 = 47.5;
/// Height added per flow row.
pub const FLOW_ROW_HEIGHT: f64 = 36.0;
/// Height added per data row.
pub const DATA_ROW_HEIGHT: f64 = 28.0;
/// Radius of a socket's indicator circle at rest.
pub const SOCKET_RADIUS: f64 = 8.0;
/// Radius of a socket's indicator circle while it is the prepared snap target.
pub const SNAP_RADIUS: f64 = 10.0;
/// Horizontal inset of a plug circle from the right node edge.
pub const PLUG_INSET: f64 = 28.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}
