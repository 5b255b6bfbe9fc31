use crate::error::SpecError;
use crate::model::ConnectorStyle;
use serde::{Deserialize, Serialize};

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Maximum pointer distance, at scale 1, at which a socket becomes the
    /// prepared snap target.
    pub snap_distance: f64,
    /// Whether the user may start dragging from an ANY-typed plug.
    pub allow_any_plug_drag: bool,
    /// Style of newly created connectors.
    pub connector_style: ConnectorStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snap_distance: 50.0,
            allow_any_plug_drag: false,
            connector_style: ConnectorStyle::Bezier,
        }
    }
}

impl SessionConfig {
    /// Parses a config document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }
}
