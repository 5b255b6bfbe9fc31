//! The portable program specification: what the exporter writes, the importer
//! reads and the compiler consumes.
//!
//! A specification never holds live references, only ids. Nodes appear as
//! [`NodeRecord`]s; a flow is an ordered list of [`FlowEntry`]s where a branch
//! wraps one sub-flow per outcome.

use crate::error::SpecError;
use crate::model::{LiteralValue, PortType, VariantKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod display;
mod export;
mod import;

pub use display::DisplaySpec;
pub use export::export;
pub use import::{ImportReport, import};

/// Identifier of the synthetic marker that precedes the branches of any node
/// other than the canonical condition node.
pub const BRANCH_SPLIT_IDENTIFIER: &str = "Connector-Branch-Split";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgramSpec {
    /// One flow per start node.
    pub flows: Vec<Vec<FlowEntry>>,
    /// Data sources feeding flow nodes, deduplicated by uid.
    #[serde(default)]
    pub additional: Vec<NodeRecord>,
    /// Session variables by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, PortType>,
}

/// One step of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FlowEntry {
    Node(NodeRecord),
    /// Marks the start of `branch_count` parallel continuations.
    Split {
        #[serde(rename = "branchCount")]
        branch_count: usize,
    },
    /// One sub-flow per flow plug of the preceding node; unconnected plugs
    /// give an empty sub-flow.
    Branch { branches: Vec<Vec<FlowEntry>> },
}

/// A serialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub uid: String,
    /// Stable identifier, used for registry and snippet lookups.
    pub identifier: String,
    /// Type name of the node kind, informational.
    #[serde(default)]
    pub node: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantKind>,
    /// Outgoing flow edges, per plug.
    #[serde(default)]
    pub flow_plugs: Vec<Vec<PortLink>>,
    /// Outgoing data edges, per plug.
    #[serde(default)]
    pub data_plugs: Vec<Vec<PortLink>>,
    /// One entry per data socket.
    #[serde(default)]
    pub inputs: Vec<InputRecord>,
}

fn unit_scale() -> f64 {
    1.0
}

/// An outgoing edge: which connector, to which node, into which socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortLink {
    #[serde(rename = "connectorId")]
    pub connector_id: String,
    #[serde(rename = "conTo")]
    pub con_to: String,
    #[serde(rename = "targetPort")]
    pub target_port: usize,
}

/// Where a data socket gets its value from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Uid of the upstream node when connected.
    #[serde(default)]
    pub source: Option<String>,
    /// Data plug index on the upstream node.
    #[serde(default)]
    pub port: Option<usize>,
    #[serde(rename = "type")]
    pub port_type: PortType,
    pub constant: bool,
    #[serde(default)]
    pub value: Option<LiteralValue>,
}

impl NodeRecord {
    /// Snippet table key: `identifier:variant` for variant nodes.
    pub fn snippet_key(&self) -> String {
        match self.variant {
            Some(variant) => format!("{}:{}", self.identifier, variant.key()),
            None => self.identifier.clone(),
        }
    }
}

impl ProgramSpec {
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every node record: flows depth-first in order, then `additional`.
    pub fn records(&self) -> Vec<&NodeRecord> {
        let mut out = Vec::new();
        for flow in &self.flows {
            collect_records(flow, &mut out);
        }
        out.extend(self.additional.iter());
        out
    }

    pub fn find(&self, uid: &str) -> Option<&NodeRecord> {
        self.records().into_iter().find(|r| r.uid == uid)
    }
}

fn collect_records<'a>(entries: &'a [FlowEntry], out: &mut Vec<&'a NodeRecord>) {
    for entry in entries {
        match entry {
            FlowEntry::Node(record) => out.push(record),
            FlowEntry::Split { .. } => {}
            FlowEntry::Branch { branches } => {
                for branch in branches {
                    collect_records(branch, out);
                }
            }
        }
    }
}
