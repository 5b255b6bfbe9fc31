//! Interactive connection: dragging a connector out of a plug, snapping it to
//! the nearest compatible socket, and tearing edges down again.

use super::{Drawable, GraphSession};
use crate::error::ConnectionError;
use crate::model::{
    Connector, ConnectorId, ConnectorState, PlugRef, Point, PortKind, PortType, SNAP_RADIUS,
    SocketRef, plug_anchor, socket_anchor,
};

/// A socket the active drag may snap to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub socket: SocketRef,
    /// Canvas position of the socket indicator when the drag started.
    pub anchor: Point,
    /// Distance to the pointer at the last move.
    pub distance: f64,
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    Plug(PlugRef),
    Connector(ConnectorId),
    Canvas,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Start { target: PointerTarget, position: Point },
    Move { position: Point },
    End,
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Connected(ConnectorId),
    Discarded(ConnectorId),
}

#[derive(Debug, Clone)]
pub(super) struct DragState {
    pub connector: ConnectorId,
    pub plug: PlugRef,
    pub candidates: Vec<Candidate>,
    pub snap: Option<SocketRef>,
}

impl GraphSession {
    /// Feeds one pointer event into the drag state machine.
    ///
    /// Events that make no sense in the current state (a move with no drag, a
    /// second start while dragging) are ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<DragOutcome> {
        match event {
            PointerEvent::Start { target, position } => {
                if self.drag.is_some() {
                    return None;
                }
                match target {
                    PointerTarget::Plug(plug) => {
                        self.begin_connection(plug, position);
                    }
                    PointerTarget::Connector(id) => {
                        self.reconnect(id, position);
                    }
                    PointerTarget::Canvas => {}
                }
                None
            }
            PointerEvent::Move { position } => {
                self.update_drag(position);
                None
            }
            PointerEvent::End => self.end_drag(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The connector currently following the pointer.
    pub fn dragging_connector(&self) -> Option<ConnectorId> {
        self.drag.as_ref().map(|d| d.connector)
    }

    /// Candidates of the active drag, nearest first after the last move.
    pub fn drag_candidates(&self) -> &[Candidate] {
        match &self.drag {
            Some(drag) => &drag.candidates,
            None => &[],
        }
    }

    /// The socket the active drag would connect to if released now.
    pub fn snap_target(&self) -> Option<SocketRef> {
        self.drag.as_ref().and_then(|d| d.snap)
    }

    /// Starts dragging a new connector out of `plug`.
    ///
    /// Returns `None` if a drag is already active, the plug does not exist, or
    /// the plug is ANY-typed and the session forbids dragging from those.
    pub fn begin_connection(&mut self, plug: PlugRef, pointer: Point) -> Option<ConnectorId> {
        if self.drag.is_some() {
            return None;
        }
        let node = self.nodes.get_mut(&plug.node)?;
        let port = node.frame.plug(plug.kind, plug.index)?;
        if port.port_type == PortType::Any && !self.config.allow_any_plug_drag {
            log::debug!("refusing drag from ANY plug on node {}", plug.node);
            return None;
        }
        let style = port.style;
        let start = plug_anchor(&node.frame, plug.kind, plug.index)?;
        let id = self.ids.connector();
        node.frame.dependents.push(id);

        let connector = Connector::new(id, plug, start, pointer, style);
        self.sink.attach(Drawable::Connector(id));
        self.sink.set_path(id, style, connector.path());
        self.connectors.insert(id, connector);
        self.connector_order.push(id);

        let candidates = self.candidates_for(plug);
        log::debug!(
            "drag {} started from node {} with {} candidates",
            id,
            plug.node,
            candidates.len()
        );
        self.drag = Some(DragState {
            connector: id,
            plug,
            candidates,
            snap: None,
        });
        Some(id)
    }

    /// Moves the free end of the dragged connector and re-evaluates the snap
    /// target.
    pub fn update_drag(&mut self, pointer: Point) {
        let Some(mut drag) = self.drag.take() else {
            return;
        };
        if let Some(connector) = self.connectors.get_mut(&drag.connector) {
            connector.end = pointer;
            self.sink
                .set_path(connector.id, connector.style, connector.path());
        }

        for candidate in &mut drag.candidates {
            candidate.distance = candidate.anchor.distance(pointer);
        }
        drag.candidates
            .sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let scale = self
            .nodes
            .get(&drag.plug.node)
            .map_or(1.0, |n| n.frame.scale);
        let threshold = self.config.snap_distance * scale;
        let snap = drag
            .candidates
            .first()
            .filter(|c| c.distance <= threshold)
            .map(|c| c.socket);

        if snap != drag.snap {
            if let Some(previous) = drag.snap {
                self.set_socket_radius(previous, None);
            }
            if let Some(next) = snap {
                self.set_socket_radius(next, Some(SNAP_RADIUS));
            }
            drag.snap = snap;
        }
        self.drag = Some(drag);
    }

    /// Releases the pointer: connects to the prepared snap target, or throws
    /// the connector away.
    pub fn end_drag(&mut self) -> Option<DragOutcome> {
        let drag = self.drag.take()?;
        if let Some(socket) = drag.snap {
            self.set_socket_radius(socket, None);
            match self.validate(drag.plug, socket) {
                Ok(()) => {
                    self.finalize(drag.connector, socket);
                    return Some(DragOutcome::Connected(drag.connector));
                }
                Err(e) => log::debug!("snap target no longer valid: {}", e),
            }
        }
        self.destroy_connector(drag.connector);
        Some(DragOutcome::Discarded(drag.connector))
    }

    /// Abandons the active drag without connecting anything.
    pub fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            if let Some(socket) = drag.snap {
                self.set_socket_radius(socket, None);
            }
            self.destroy_connector(drag.connector);
        }
    }

    /// Removes a connector and every reference to it. Returns `false` if the
    /// connector does not exist.
    pub fn disconnect(&mut self, id: ConnectorId) -> bool {
        if self.drag.as_ref().is_some_and(|d| d.connector == id) {
            self.cancel_drag();
            return true;
        }
        if !self.connectors.contains_key(&id) {
            return false;
        }
        self.detach_socket(id);
        self.destroy_connector(id);
        log::debug!("disconnected {}", id);
        true
    }

    /// Picks up the socket end of an existing connector and drags it again.
    pub fn reconnect(&mut self, id: ConnectorId, pointer: Point) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(plug) = self.connectors.get(&id).map(|c| c.plug) else {
            return false;
        };
        self.detach_socket(id);
        if let Some(node) = self.nodes.get_mut(&plug.node) {
            if let Some(port) = node.frame.plug_mut(plug.kind, plug.index) {
                port.connected.retain(|c| *c != id);
            }
        }
        if let Some(connector) = self.connectors.get_mut(&id) {
            connector.state = ConnectorState::Dragging;
            connector.end = pointer;
            self.sink.set_path(id, connector.style, connector.path());
        }
        let candidates = self.candidates_for(plug);
        self.drag = Some(DragState {
            connector: id,
            plug,
            candidates,
            snap: None,
        });
        true
    }

    /// Every socket `plug` could legally connect to right now.
    pub fn candidate_sockets(&self, plug: PlugRef) -> Vec<SocketRef> {
        let Some(plug_type) = self
            .nodes
            .get(&plug.node)
            .and_then(|n| n.frame.plug(plug.kind, plug.index))
            .map(|p| p.port_type)
        else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for id in &self.render_order {
            if *id == plug.node {
                continue;
            }
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            for (index, socket) in node.frame.sockets(plug.kind).iter().enumerate() {
                let socket_ref = SocketRef {
                    node: *id,
                    kind: plug.kind,
                    index,
                };
                if plug.kind == PortKind::Data && socket.is_connected() {
                    continue;
                }
                if !socket.accepts(plug_type) || self.is_linked(plug, socket_ref) {
                    continue;
                }
                out.push(socket_ref);
            }
        }
        out
    }

    /// Connects `plug` to `socket` without a drag. Used by the importer and by
    /// hosts that build graphs programmatically.
    pub fn connect_direct(
        &mut self,
        plug: PlugRef,
        socket: SocketRef,
    ) -> Result<ConnectorId, ConnectionError> {
        self.validate(plug, socket)?;
        let node = self
            .nodes
            .get_mut(&plug.node)
            .ok_or(ConnectionError::UnknownNode(plug.node))?;
        let port = node
            .frame
            .plug(plug.kind, plug.index)
            .ok_or(ConnectionError::UnknownPort {
                node: plug.node,
                what: "plug",
                index: plug.index,
            })?;
        let style = port.style;
        let start = plug_anchor(&node.frame, plug.kind, plug.index).unwrap_or_default();
        let id = self.ids.connector();
        node.frame.dependents.push(id);

        self.sink.attach(Drawable::Connector(id));
        self.connectors
            .insert(id, Connector::new(id, plug, start, start, style));
        self.connector_order.push(id);
        self.finalize(id, socket);
        Ok(id)
    }

    fn validate(&self, plug: PlugRef, socket: SocketRef) -> Result<(), ConnectionError> {
        let plug_node = self
            .nodes
            .get(&plug.node)
            .ok_or(ConnectionError::UnknownNode(plug.node))?;
        let socket_node = self
            .nodes
            .get(&socket.node)
            .ok_or(ConnectionError::UnknownNode(socket.node))?;
        let port = plug_node
            .frame
            .plug(plug.kind, plug.index)
            .ok_or(ConnectionError::UnknownPort {
                node: plug.node,
                what: "plug",
                index: plug.index,
            })?;
        let target = socket_node
            .frame
            .socket(socket.kind, socket.index)
            .ok_or(ConnectionError::UnknownPort {
                node: socket.node,
                what: "socket",
                index: socket.index,
            })?;
        if plug.node == socket.node {
            return Err(ConnectionError::SelfConnection(plug.node));
        }
        if plug.kind != socket.kind || !target.accepts(port.port_type) {
            return Err(ConnectionError::TypeMismatch {
                socket: target.port_type,
                plug: port.port_type,
            });
        }
        if self.is_linked(plug, socket) {
            return Err(ConnectionError::Duplicate);
        }
        if socket.kind == PortKind::Data && target.is_connected() {
            return Err(ConnectionError::SocketOccupied);
        }
        Ok(())
    }

    fn is_linked(&self, plug: PlugRef, socket: SocketRef) -> bool {
        self.nodes
            .get(&plug.node)
            .and_then(|n| n.frame.plug(plug.kind, plug.index))
            .is_some_and(|p| {
                p.connected.iter().any(|c| {
                    self.connectors
                        .get(c)
                        .is_some_and(|c| c.connected_to == Some(socket))
                })
            })
    }

    fn candidates_for(&self, plug: PlugRef) -> Vec<Candidate> {
        self.candidate_sockets(plug)
            .into_iter()
            .filter_map(|socket| {
                let node = self.nodes.get(&socket.node)?;
                let anchor = socket_anchor(&node.frame, socket.kind, socket.index)?;
                Some(Candidate {
                    socket,
                    anchor,
                    distance: f64::INFINITY,
                })
            })
            .collect()
    }

    /// Binds a validated connector to `socket` on both ends.
    fn finalize(&mut self, id: ConnectorId, socket: SocketRef) {
        let Some(plug) = self.connectors.get(&id).map(|c| c.plug) else {
            return;
        };
        let plug_type = self
            .nodes
            .get(&plug.node)
            .and_then(|n| n.frame.plug(plug.kind, plug.index))
            .map_or(PortType::Any, |p| p.port_type);

        let mut end = None;
        if let Some(node) = self.nodes.get_mut(&socket.node) {
            end = socket_anchor(&node.frame, socket.kind, socket.index);
            if let Some(target) = node.frame.socket_mut(socket.kind, socket.index) {
                target.incoming.push(id);
                target.reset_radius();
            }
            if !node.frame.dependents.contains(&id) {
                node.frame.dependents.push(id);
            }
            let kind = node.kind;
            kind.on_socket_connected(&mut node.frame, socket.kind, socket.index, plug_type);
        }
        if let Some(node) = self.nodes.get_mut(&plug.node) {
            if let Some(port) = node.frame.plug_mut(plug.kind, plug.index) {
                port.connected.push(id);
            }
            if !node.frame.dependents.contains(&id) {
                node.frame.dependents.push(id);
            }
        }
        if let Some(connector) = self.connectors.get_mut(&id) {
            connector.connected_to = Some(socket);
            connector.state = ConnectorState::Connected;
            if let Some(end) = end {
                connector.end = end;
            }
            self.sink.set_path(id, connector.style, connector.path());
        }
        log::debug!("connected {} from node {} to node {}", id, plug.node, socket.node);
    }

    /// Unbinds the socket end of a connector, leaving the plug end alone.
    fn detach_socket(&mut self, id: ConnectorId) {
        let Some(connector) = self.connectors.get_mut(&id) else {
            return;
        };
        let Some(socket) = connector.connected_to.take() else {
            return;
        };
        connector.state = ConnectorState::Dragging;
        if let Some(node) = self.nodes.get_mut(&socket.node) {
            if let Some(target) = node.frame.socket_mut(socket.kind, socket.index) {
                target.incoming.retain(|c| *c != id);
            }
            node.frame.unsubscribe(id);
            let kind = node.kind;
            kind.on_socket_disconnected(&mut node.frame, socket.kind, socket.index);
        }
    }

    /// Drops a connector and its plug-side references.
    fn destroy_connector(&mut self, id: ConnectorId) {
        let Some(connector) = self.connectors.remove(&id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&connector.plug.node) {
            if let Some(port) = node.frame.plug_mut(connector.plug.kind, connector.plug.index) {
                port.connected.retain(|c| *c != id);
            }
            node.frame.unsubscribe(id);
        }
        self.connector_order.retain(|c| *c != id);
        self.sink.dispose(Drawable::Connector(id));
    }

    fn set_socket_radius(&mut self, socket: SocketRef, radius: Option<f64>) {
        let Some(target) = self
            .nodes
            .get_mut(&socket.node)
            .and_then(|n| n.frame.socket_mut(socket.kind, socket.index))
        else {
            return;
        };
        match radius {
            Some(r) => target.radius = r,
            None => target.reset_radius(),
        }
    }
}
