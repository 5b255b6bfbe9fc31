//! The editing session: sole owner of every live node and connector.

use crate::model::{
    Connector, ConnectorId, ConnectorStyle, IdGenerator, LiteralValue, Node, NodeBody, NodeFrame,
    NodeId, NodeKind, NodeState, Point, PortKind, PortType, SocketRef, VariantKind,
    build_variant_ports, plug_anchor, socket_anchor,
};
use ahash::AHashMap;

mod config;
mod connect;
mod render;

pub use config::SessionConfig;
pub use connect::{Candidate, DragOutcome, PointerEvent, PointerTarget};
pub use render::{Drawable, NullSink, RenderSink};

use connect::DragState;

/// Owns all nodes and connectors of one editing session.
///
/// Every operation that needs to look at more than one node goes through the
/// session, so there is no process-wide state.
pub struct GraphSession {
    config: SessionConfig,
    ids: IdGenerator,
    nodes: AHashMap<NodeId, Node>,
    /// Back to front.
    render_order: Vec<NodeId>,
    connectors: AHashMap<ConnectorId, Connector>,
    /// Back to front.
    connector_order: Vec<ConnectorId>,
    drag: Option<DragState>,
    variables: AHashMap<String, PortType>,
    sink: Box<dyn RenderSink>,
}

impl Default for GraphSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl GraphSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_sink(config, Box::new(NullSink))
    }

    pub fn with_sink(config: SessionConfig, sink: Box<dyn RenderSink>) -> Self {
        Self {
            config,
            ids: IdGenerator::new(),
            nodes: AHashMap::new(),
            render_order: Vec::new(),
            connectors: AHashMap::new(),
            connector_order: Vec::new(),
            drag: None,
            variables: AHashMap::new(),
            sink,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Nodes from back to front.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.render_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn render_order(&self) -> &[NodeId] {
        &self.render_order
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    /// Connectors from back to front, including one being dragged.
    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connector_order
            .iter()
            .filter_map(|id| self.connectors.get(id))
    }

    pub fn connector_order(&self) -> &[ConnectorId] {
        &self.connector_order
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    pub fn variables(&self) -> &AHashMap<String, PortType> {
        &self.variables
    }

    /// Registers a session variable. Returns `false` if the name is taken.
    pub fn register_variable(&mut self, name: &str, port_type: PortType) -> bool {
        if self.variables.contains_key(name) {
            return false;
        }
        self.variables.insert(name.to_string(), port_type);
        true
    }

    /// Creates a node of `kind` at `position` and adds it on top.
    pub fn spawn(&mut self, kind: NodeKind, position: Point, scale: f64) -> NodeId {
        let id = self.ids.node();
        let mut frame = NodeFrame::new(id, kind.identifier(), kind.display_name(), kind.class());
        frame.scale = scale;
        kind.build(&mut frame, self.config.connector_style);
        frame.position = position;
        frame.state = NodeState::Positioned;
        self.add_node(Node { kind, frame })
    }

    /// Inserts a prepared node on top of the render order.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        log::debug!("adding node {} ({})", id, node.identifier());
        self.sink.attach(Drawable::Node(id));
        self.sink.set_scale(Drawable::Node(id), node.frame.scale);
        self.sink.set_position(Drawable::Node(id), node.frame.position);
        self.nodes.insert(id, node);
        self.render_order.retain(|n| *n != id);
        self.render_order.push(id);
        id
    }

    pub fn move_node(&mut self, id: NodeId, position: Point) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.frame.position = position;
        node.frame.state = NodeState::Positioned;
        self.sink.set_position(Drawable::Node(id), position);
        self.emit_move(id);
    }

    pub fn set_scale(&mut self, id: NodeId, scale: f64) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.frame.scale = scale;
        self.sink.set_scale(Drawable::Node(id), scale);
        self.emit_move(id);
    }

    /// Re-homes every connector subscribed to `id`. Runs after any change to
    /// the node's position or scale.
    pub fn emit_move(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        for connector_id in &node.frame.dependents {
            let Some(connector) = self.connectors.get_mut(connector_id) else {
                continue;
            };
            if connector.plug.node == id {
                if let Some(p) = plug_anchor(&node.frame, connector.plug.kind, connector.plug.index) {
                    connector.start = p;
                }
            }
            if let Some(socket) = connector.connected_to.filter(|s| s.node == id) {
                if let Some(p) = socket_anchor(&node.frame, socket.kind, socket.index) {
                    connector.end = p;
                }
            }
            self.sink
                .set_path(connector.id, connector.style, connector.path());
        }
    }

    /// Draws `id` above its siblings, together with every connector attached
    /// to it.
    pub fn move_to_front(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let mut attached = node.frame.attached_connectors();
        // The in-flight drag connector is not on any port yet.
        if let Some(drag) = self.drag.as_ref().filter(|d| d.plug.node == id) {
            if !attached.contains(&drag.connector) {
                attached.push(drag.connector);
            }
        }
        self.render_order.retain(|n| *n != id);
        self.render_order.push(id);
        self.sink.raise(Drawable::Node(id));
        for connector in attached {
            self.connector_order.retain(|c| *c != connector);
            self.connector_order.push(connector);
            self.sink.raise(Drawable::Connector(connector));
        }
    }

    /// Disconnects every connector on every port of `id`. Returns how many
    /// connectors were removed.
    pub fn clear_connections(&mut self, id: NodeId) -> usize {
        if self
            .drag
            .as_ref()
            .is_some_and(|d| d.plug.node == id || d.snap.is_some_and(|s| s.node == id))
        {
            self.cancel_drag();
        }
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };
        let attached = node.frame.attached_connectors();
        attached
            .into_iter()
            .filter(|c| self.disconnect(*c))
            .count()
    }

    /// Destroys a node and every connector attached to it. Removing a node
    /// that is already gone is a no-op.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        let dropped = self.clear_connections(id);
        if let Some(drag) = self.drag.as_mut() {
            drag.candidates.retain(|c| c.socket.node != id);
        }
        self.nodes.remove(&id);
        self.render_order.retain(|n| *n != id);
        self.sink.dispose(Drawable::Node(id));
        log::debug!("removed node {} and {} connectors", id, dropped);
        true
    }

    /// Clears the workspace: every node, then every leftover connector.
    pub fn remove_all(&mut self) {
        self.cancel_drag();
        let ids = self.render_order.clone();
        for id in ids {
            self.remove_node(id);
        }
        let residual = std::mem::take(&mut self.connector_order);
        for id in residual {
            self.connectors.remove(&id);
            self.sink.dispose(Drawable::Connector(id));
        }
        self.connectors.clear();
    }

    /// Swaps the operation of a variant-selector node.
    ///
    /// The port list is rebuilt from scratch, so every connector attached to
    /// the node is dropped. Returns the number of dropped connectors, or
    /// `None` if `id` is not a variant node.
    pub fn switch_variant(&mut self, id: NodeId, variant: VariantKind) -> Option<usize> {
        let node = self.nodes.get(&id)?;
        if !matches!(node.frame.body, NodeBody::Variant(_)) {
            return None;
        }
        let dropped = self.clear_connections(id);
        if dropped > 0 {
            log::warn!(
                "switching node {} to '{}' dropped {} connectors",
                id,
                variant.key(),
                dropped
            );
        }
        let style = self.config.connector_style;
        let node = self.nodes.get_mut(&id)?;
        build_variant_ports(&mut node.frame, variant, style);
        node.frame.body = NodeBody::Variant(variant);
        node.frame.name = variant.display_name().to_string();
        self.emit_move(id);
        Some(dropped)
    }

    /// Stores a constant on a data socket. Flow sockets hold no values.
    pub fn set_socket_value(&mut self, socket: SocketRef, value: Option<LiteralValue>) -> bool {
        if socket.kind != PortKind::Data {
            return false;
        }
        let Some(node) = self.nodes.get_mut(&socket.node) else {
            return false;
        };
        let Some(slot) = node.frame.data_sockets.get_mut(socket.index) else {
            return false;
        };
        slot.value = value.clone();
        let kind = node.kind;
        kind.on_value_changed(&mut node.frame, socket.index, value.as_ref(), &self.variables);
        true
    }

    /// Switches every plug and connector to `style`. Endpoints are untouched.
    pub fn set_connector_style(&mut self, style: ConnectorStyle) {
        self.config.connector_style = style;
        for node in self.nodes.values_mut() {
            for plug in node
                .frame
                .flow_plugs
                .iter_mut()
                .chain(node.frame.data_plugs.iter_mut())
            {
                plug.style = style;
            }
        }
        for id in &self.connector_order {
            if let Some(connector) = self.connectors.get_mut(id) {
                connector.style = style;
                self.sink.set_path(*id, style, connector.path());
            }
        }
    }

    pub fn toggle_connector_style(&mut self) -> ConnectorStyle {
        let style = self.config.connector_style.toggled();
        self.set_connector_style(style);
        style
    }
}
