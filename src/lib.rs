//! # visflow - Node-Graph Model and Flow Compiler
//!
//! **visflow** is the core of a visual scripting editor: typed nodes connected
//! by flow and data edges, an editing session that keeps the graph consistent
//! under dragging, moving and deleting, and a compiler that turns the graph
//! into linear program text.
//!
//! ## Core Workflow
//!
//! 1.  **Edit**: Spawn nodes into a `GraphSession` and connect their plugs to
//!     sockets, either through pointer events or with `connect_direct`.
//! 2.  **Export**: Snapshot the session as a `ProgramSpec`, the JSON document
//!     used for saving, loading and compiling.
//! 3.  **Compile**: Build a `Compiler` with a snippet table for the target
//!     language and compile the specification into a script.
//! 4.  **Import**: Rebuild a session from a saved specification through a
//!     `NodeRegistry`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use visflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut session = GraphSession::default();
//!     let start = session.spawn(NodeKind::StartEvent, Point::new(0.0, 0.0), 1.0);
//!     let log = session.spawn(NodeKind::ConsoleLog, Point::new(300.0, 0.0), 1.0);
//!     session.connect_direct(PlugRef::flow(start, 0), SocketRef::flow(log, 0))?;
//!     session.set_socket_value(
//!         SocketRef::data(log, 0),
//!         Some(LiteralValue::Str("hello".to_string())),
//!     );
//!
//!     let spec = export(&session);
//!     let program = Compiler::builder().build().compile(&spec)?;
//!     println!("{}", program.script);
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod model;
pub mod prelude;
pub mod registry;
pub mod session;
pub mod spec;
