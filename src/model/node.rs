use super::{
    ConnectorId, ConnectorStyle, DATA_ROW_HEIGHT, FLOW_ROW_HEIGHT, FLOW_ROWS_TOP, NODE_BASE_HEIGHT,
    NODE_WIDTH, NodeId, PLUG_INSET, Plug, Point, PortKind, PortType, SOCKET_RADIUS, Socket,
};
use serde::{Deserialize, Serialize};

/// Palette category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    Basic,
    Event,
    #[serde(rename = "deviceinfo")]
    DeviceInfo,
    Console,
}

impl NodeClass {
    pub const ALL: [NodeClass; 4] = [
        NodeClass::Basic,
        NodeClass::Event,
        NodeClass::DeviceInfo,
        NodeClass::Console,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            NodeClass::Basic => "Basic",
            NodeClass::Event => "Event",
            NodeClass::DeviceInfo => "Device Info",
            NodeClass::Console => "Console",
        }
    }
}

/// Operation selected on a variant-selector node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    #[serde(rename = "add-concat")]
    Add,
    #[serde(rename = "multiply")]
    Multiply,
}

impl VariantKind {
    pub const ALL: [VariantKind; 2] = [VariantKind::Add, VariantKind::Multiply];

    pub fn key(&self) -> &'static str {
        match self {
            VariantKind::Add => "add-concat",
            VariantKind::Multiply => "multiply",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.key() == key)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VariantKind::Add => "Add (Math)",
            VariantKind::Multiply => "Multiply (Math)",
        }
    }
}

/// Whether a node's port list is fixed or derived from a selected variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeBody {
    Fixed,
    Variant(VariantKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Unpositioned,
    Positioned,
}

/// Position, scale and ports shared by every node kind.
#[derive(Debug, Clone)]
pub struct NodeFrame {
    pub id: NodeId,
    /// Stable identifier consumed by registries and the compiler.
    pub identifier: String,
    pub name: String,
    pub class: NodeClass,
    pub position: Point,
    pub scale: f64,
    pub state: NodeState,
    pub flow_sockets: Vec<Socket>,
    pub flow_plugs: Vec<Plug>,
    pub data_sockets: Vec<Socket>,
    pub data_plugs: Vec<Plug>,
    /// Background height, unscaled.
    pub height: f64,
    /// Extra space reserved above the flow rows (e.g. for a variant selector).
    pub connection_offset: f64,
    /// Export every flow plug as its own branch, even when only one is connected.
    pub force_branch: bool,
    pub body: NodeBody,
    /// Connectors whose endpoints must follow this node when it moves.
    pub dependents: Vec<ConnectorId>,
    /// Stored boolean for the branch preview (see `simulate`).
    pub simulated: Option<bool>,
}

impl NodeFrame {
    pub fn new(id: NodeId, identifier: impl Into<String>, name: impl Into<String>, class: NodeClass) -> Self {
        Self {
            id,
            identifier: identifier.into(),
            name: name.into(),
            class,
            position: Point::default(),
            scale: 1.0,
            state: NodeState::Unpositioned,
            flow_sockets: Vec::new(),
            flow_plugs: Vec::new(),
            data_sockets: Vec::new(),
            data_plugs: Vec::new(),
            height: NODE_BASE_HEIGHT,
            connection_offset: 0.0,
            force_branch: false,
            body: NodeBody::Fixed,
            dependents: Vec::new(),
            simulated: None,
        }
    }

    pub fn add_flow_socket(&mut self) -> usize {
        let prev = self.flow_rows();
        self.flow_sockets.push(Socket::flow());
        grow(&mut self.height, prev, self.flow_sockets.len(), FLOW_ROW_HEIGHT);
        self.flow_sockets.len() - 1
    }

    pub fn add_flow_plug(&mut self, label: &str, style: ConnectorStyle) -> usize {
        let prev = self.flow_rows();
        self.flow_plugs.push(Plug::flow(label, style));
        grow(&mut self.height, prev, self.flow_plugs.len(), FLOW_ROW_HEIGHT);
        self.flow_plugs.len() - 1
    }

    pub fn add_data_socket(&mut self, port_type: PortType, label: &str) -> usize {
        let prev = self.data_rows();
        self.data_sockets.push(Socket::new(port_type, label));
        grow(&mut self.height, prev, self.data_sockets.len(), DATA_ROW_HEIGHT);
        self.data_sockets.len() - 1
    }

    pub fn add_data_plug(&mut self, port_type: PortType, label: &str, style: ConnectorStyle) -> usize {
        let prev = self.data_rows();
        self.data_plugs.push(Plug::new(port_type, label, style));
        grow(&mut self.height, prev, self.data_plugs.len(), DATA_ROW_HEIGHT);
        self.data_plugs.len() - 1
    }

    /// Drops every data port and gives back the rows they occupied.
    ///
    /// Callers must detach connectors first; this only touches the layout.
    pub fn reset_data_ports(&mut self) {
        self.height -= DATA_ROW_HEIGHT * self.data_rows() as f64;
        self.data_sockets.clear();
        self.data_plugs.clear();
    }

    pub fn set_connection_offset(&mut self, delta: f64) {
        self.height += delta - self.connection_offset;
        self.connection_offset = delta;
    }

    pub fn flow_rows(&self) -> usize {
        self.flow_sockets.len().max(self.flow_plugs.len())
    }

    pub fn data_rows(&self) -> usize {
        self.data_sockets.len().max(self.data_plugs.len())
    }

    pub fn rendered_height(&self) -> f64 {
        self.height * self.scale
    }

    pub fn sockets(&self, kind: PortKind) -> &[Socket] {
        match kind {
            PortKind::Flow => &self.flow_sockets,
            PortKind::Data => &self.data_sockets,
        }
    }

    pub fn plugs(&self, kind: PortKind) -> &[Plug] {
        match kind {
            PortKind::Flow => &self.flow_plugs,
            PortKind::Data => &self.data_plugs,
        }
    }

    pub fn socket(&self, kind: PortKind, index: usize) -> Option<&Socket> {
        self.sockets(kind).get(index)
    }

    pub fn plug(&self, kind: PortKind, index: usize) -> Option<&Plug> {
        self.plugs(kind).get(index)
    }

    pub fn socket_mut(&mut self, kind: PortKind, index: usize) -> Option<&mut Socket> {
        match kind {
            PortKind::Flow => self.flow_sockets.get_mut(index),
            PortKind::Data => self.data_sockets.get_mut(index),
        }
    }

    pub fn plug_mut(&mut self, kind: PortKind, index: usize) -> Option<&mut Plug> {
        match kind {
            PortKind::Flow => self.flow_plugs.get_mut(index),
            PortKind::Data => self.data_plugs.get_mut(index),
        }
    }

    /// Every connector attached to any port of this node.
    pub fn attached_connectors(&self) -> Vec<ConnectorId> {
        let incoming = self
            .flow_sockets
            .iter()
            .chain(&self.data_sockets)
            .flat_map(|s| s.incoming.iter().copied());
        let outgoing = self
            .flow_plugs
            .iter()
            .chain(&self.data_plugs)
            .flat_map(|p| p.connected.iter().copied());
        incoming.chain(outgoing).collect()
    }

    pub fn unsubscribe(&mut self, connector: ConnectorId) {
        self.dependents.retain(|c| *c != connector);
    }

    /// Preview which flow plug a boolean would take: the plug that would not
    /// fire is dimmed.
    pub fn simulate(&mut self, state: bool) {
        self.simulated = Some(state);
        if self.flow_plugs.len() < 2 {
            return;
        }
        let (active, dimmed) = if state { (0, 1) } else { (1, 0) };
        self.flow_plugs[active].opacity = 1.0;
        self.flow_plugs[dimmed].opacity = 0.3;
    }

    /// Undo `simulate` visually without forgetting the stored state.
    pub fn reset_simulation(&mut self) {
        for plug in &mut self.flow_plugs {
            plug.opacity = 1.0;
        }
    }
}

/// Grows `height` by one row for every row `new_len` adds beyond `prev_max`.
fn grow(height: &mut f64, prev_max: usize, new_len: usize, row: f64) {
    if new_len > prev_max {
        *height += row * (new_len - prev_max) as f64;
    }
}

/// Top of the data rows, unscaled, relative to the node origin.
pub fn body_top(frame: &NodeFrame) -> f64 {
    NODE_BASE_HEIGHT + FLOW_ROW_HEIGHT * frame.flow_rows() as f64 + frame.connection_offset
}

/// Canvas position of a socket's indicator center.
pub fn socket_anchor(frame: &NodeFrame, kind: PortKind, index: usize) -> Option<Point> {
    frame.socket(kind, index)?;
    let row_y = match kind {
        PortKind::Flow => FLOW_ROWS_TOP + frame.connection_offset + FLOW_ROW_HEIGHT * index as f64,
        PortKind::Data => body_top(frame) + DATA_ROW_HEIGHT * index as f64,
    };
    Some(frame.position.offset(0.0, (row_y + SOCKET_RADIUS) * frame.scale))
}

/// Canvas position of a plug's circle center.
pub fn plug_anchor(frame: &NodeFrame, kind: PortKind, index: usize) -> Option<Point> {
    frame.plug(kind, index)?;
    let row_y = match kind {
        PortKind::Flow => FLOW_ROWS_TOP + frame.connection_offset + FLOW_ROW_HEIGHT * index as f64,
        PortKind::Data => body_top(frame) + DATA_ROW_HEIGHT * index as f64,
    };
    let x = NODE_WIDTH - PLUG_INSET + SOCKET_RADIUS;
    Some(
        frame
            .position
            .offset(x * frame.scale, (row_y + SOCKET_RADIUS) * frame.scale),
    )
}
