//! Common test utilities for building graphs and inspecting specifications.
use serde_json::Value as Json;
use std::cell::RefCell;
use std::rc::Rc;
use visflow::model::socket_anchor;
use visflow::prelude::*;
use visflow::session::Drawable;

/// Nodes of the canonical branching scenario.
#[allow(dead_code)]
pub struct Scenario {
    pub session: GraphSession,
    pub start: NodeId,
    pub condition: NodeId,
    pub log: NodeId,
    pub mobile: NodeId,
}

/// Builds `Start -> Condition`, with Condition's "Met" plug flowing into a
/// Log node, "Not met" left open, and its boolean input fed by IsMobile.
#[allow(dead_code)]
pub fn create_condition_scenario() -> Scenario {
    let mut session = GraphSession::default();
    let start = session.spawn(NodeKind::StartEvent, Point::new(0.0, 0.0), 1.0);
    let condition = session.spawn(NodeKind::Condition, Point::new(300.0, 0.0), 1.0);
    let log = session.spawn(NodeKind::ConsoleLog, Point::new(600.0, 0.0), 1.0);
    let mobile = session.spawn(NodeKind::IsMobile, Point::new(0.0, 300.0), 1.0);

    session
        .connect_direct(PlugRef::flow(start, 0), SocketRef::flow(condition, 0))
        .expect("start -> condition");
    session
        .connect_direct(PlugRef::flow(condition, 0), SocketRef::flow(log, 0))
        .expect("condition -> log");
    session
        .connect_direct(PlugRef::data(mobile, 0), SocketRef::data(condition, 0))
        .expect("mobile -> condition");

    Scenario {
        session,
        start,
        condition,
        log,
        mobile,
    }
}

/// `Start -> Log -> Log -> ...`, one Log per value, each printing its value.
#[allow(dead_code)]
pub fn create_log_chain(values: &[LiteralValue]) -> (GraphSession, Vec<NodeId>) {
    let mut session = GraphSession::default();
    let start = session.spawn(NodeKind::StartEvent, Point::new(0.0, 0.0), 1.0);
    let mut previous = start;
    let mut logs = Vec::new();
    for (i, value) in values.iter().enumerate() {
        let log = session.spawn(NodeKind::ConsoleLog, Point::new(300.0 * (i + 1) as f64, 0.0), 1.0);
        session.set_socket_value(SocketRef::data(log, 0), Some(value.clone()));
        session
            .connect_direct(PlugRef::flow(previous, 0), SocketRef::flow(log, 0))
            .expect("flow link");
        previous = log;
        logs.push(log);
    }
    (session, logs)
}

/// Canvas position of a socket in the session, for pointing at it.
#[allow(dead_code)]
pub fn anchor_of(session: &GraphSession, socket: SocketRef) -> Point {
    let node = session.node(socket.node).expect("node exists");
    socket_anchor(&node.frame, socket.kind, socket.index).expect("socket exists")
}

/// Every id a socket or plug in the session still refers to.
#[allow(dead_code)]
pub fn referenced_connectors(session: &GraphSession) -> Vec<ConnectorId> {
    let mut out = Vec::new();
    for node in session.nodes() {
        out.extend(node.frame.attached_connectors());
        out.extend(node.frame.dependents.iter().copied());
    }
    out
}

/// A specification as JSON with uids renamed by order of first appearance and
/// connector ids dropped, so graphs with regenerated ids compare equal.
#[allow(dead_code)]
pub fn canonical(spec: &ProgramSpec) -> Json {
    let uids: Vec<String> = spec.records().iter().map(|r| r.uid.clone()).collect();
    let mut json = serde_json::to_value(spec).expect("serializable");
    rename(&mut json, &uids);
    json
}

#[allow(dead_code)]
fn rename(json: &mut Json, uids: &[String]) {
    match json {
        Json::Object(map) => {
            map.remove("connectorId");
            for key in ["uid", "conTo", "source"] {
                if let Some(Json::String(uid)) = map.get_mut(key) {
                    if let Some(pos) = uids.iter().position(|u| u == uid) {
                        *uid = format!("#{}", pos);
                    }
                }
            }
            for value in map.values_mut() {
                rename(value, uids);
            }
        }
        Json::Array(items) => {
            for item in items {
                rename(item, uids);
            }
        }
        _ => {}
    }
}

/// Everything a session pushed to its render sink.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum SinkEvent {
    Attach(Drawable),
    Position(Drawable, Point),
    Scale(Drawable, f64),
    Path(ConnectorId, ConnectorStyle),
    Raise(Drawable),
    Dispose(Drawable),
}

/// A render sink that records every call, shared with the test through `events`.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingSink {
    pub events: Rc<RefCell<Vec<SinkEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn take(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl RenderSink for RecordingSink {
    fn attach(&mut self, drawable: Drawable) {
        self.events.borrow_mut().push(SinkEvent::Attach(drawable));
    }

    fn set_position(&mut self, drawable: Drawable, position: Point) {
        self.events
            .borrow_mut()
            .push(SinkEvent::Position(drawable, position));
    }

    fn set_scale(&mut self, drawable: Drawable, scale: f64) {
        self.events.borrow_mut().push(SinkEvent::Scale(drawable, scale));
    }

    fn set_path(&mut self, connector: ConnectorId, style: ConnectorStyle, _path: [Point; 4]) {
        self.events
            .borrow_mut()
            .push(SinkEvent::Path(connector, style));
    }

    fn raise(&mut self, drawable: Drawable) {
        self.events.borrow_mut().push(SinkEvent::Raise(drawable));
    }

    fn dispose(&mut self, drawable: Drawable) {
        self.events.borrow_mut().push(SinkEvent::Dispose(drawable));
    }
}
