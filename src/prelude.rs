//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types of the visflow crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use visflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/program.json")?;
//! let spec = ProgramSpec::from_json(&json)?;
//!
//! let mut session = GraphSession::default();
//! let report = import(&mut session, &NodeRegistry::standard(), &spec);
//! println!("{} nodes restored", report.nodes.len());
//!
//! let program = Compiler::builder().build().compile(&export(&session))?;
//! println!("{}", program.script);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::model::{
    ConnectorId, ConnectorStyle, LiteralValue, Node, NodeId, NodeKind, PlugRef, Point, PortKind,
    PortType, SocketRef, VariantKind, compatible,
};

// Editing
pub use crate::registry::NodeRegistry;
pub use crate::session::{
    DragOutcome, GraphSession, NullSink, PointerEvent, PointerTarget, RenderSink, SessionConfig,
};

// Specification
pub use crate::spec::{DisplaySpec, FlowEntry, ImportReport, NodeRecord, ProgramSpec, export, import};

// Compilation
pub use crate::compiler::{
    CompiledProgram, Compiler, LiteralFormatter, QuotingTable, SnippetDescriptor, SnippetTable,
};

// Error types
pub use crate::error::{CompileError, ConnectionError, SpecError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
