//! Turns a [`ProgramSpec`] into linear program text.
//!
//! Each flow is flattened into a list of snippets, with nested branches kept
//! as sub-lists. Data inputs are resolved into expressions by compiling their
//! upstream sources recursively; pure sources are hoisted once into a shared
//! function block. Rendering then threads every snippet into the `$further`
//! slot of the one before it.
//!
//! The compiler only reads the specification it is given, so a `Compiler` can
//! be moved to another thread and run there.

use crate::error::CompileError;
use crate::spec::{BRANCH_SPLIT_IDENTIFIER, FlowEntry, InputRecord, NodeRecord, ProgramSpec};
use ahash::{AHashMap, AHashSet};

mod literal;
mod snippets;
mod template;

pub use literal::{LiteralFormatter, QuotingTable};
pub use snippets::{ScriptContext, ScriptTemplate, SnippetDescriptor, SnippetTable, branch_split};
pub use template::{Segment, Slot, Template};

/// Default bound on how deep data sources may feed each other.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The result of a successful compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProgram {
    /// Function block followed by every flow, in order.
    pub script: String,
    /// Snippet keys of the hoisted pure functions, in first-use order.
    pub functions: Vec<String>,
}

pub struct Compiler {
    snippets: SnippetTable,
    formatter: Box<dyn LiteralFormatter>,
    max_depth: usize,
}

pub struct CompilerBuilder {
    snippets: SnippetTable,
    formatter: Box<dyn LiteralFormatter>,
    max_depth: usize,
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerBuilder {
    /// Starts from the JavaScript snippet and quoting tables.
    pub fn new() -> Self {
        Self {
            snippets: SnippetTable::javascript(),
            formatter: Box::new(QuotingTable::javascript()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replaces the whole snippet table, e.g. for another target language.
    pub fn with_snippet_table(mut self, table: SnippetTable) -> Self {
        self.snippets = table;
        self
    }

    /// Adds or overrides one snippet.
    pub fn with_snippet(mut self, key: &str, descriptor: SnippetDescriptor) -> Self {
        self.snippets.register(key, descriptor);
        self
    }

    pub fn with_literal_formatter(mut self, formatter: impl LiteralFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            snippets: self.snippets,
            formatter: self.formatter,
            max_depth: self.max_depth,
        }
    }
}

impl Compiler {
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    pub fn snippets(&self) -> &SnippetTable {
        &self.snippets
    }

    /// Compiles every flow of `spec`. Deterministic: the same specification
    /// always yields the same text.
    pub fn compile(&self, spec: &ProgramSpec) -> Result<CompiledProgram, CompileError> {
        let mut pass = Pass::new(self, spec);
        let mut bodies = Vec::with_capacity(spec.flows.len());
        for flow in &spec.flows {
            let steps = pass.flatten(flow, 0, None)?;
            bodies.push(render_chain(&steps));
        }

        let mut script = String::new();
        for (_, source) in &pass.functions {
            script.push_str(source);
            script.push('\n');
        }
        script.push_str(&bodies.join("\n"));

        log::debug!(
            "compiled {} flows with {} hoisted functions",
            spec.flows.len(),
            pass.functions.len()
        );
        Ok(CompiledProgram {
            script,
            functions: pass.functions.into_iter().map(|(key, _)| key).collect(),
        })
    }

    pub fn compile_json(&self, json: &str) -> Result<CompiledProgram, CompileError> {
        let spec = ProgramSpec::from_json(json).map_err(|e| CompileError::InvalidSpec(e.to_string()))?;
        self.compile(&spec)
    }
}

/// A flattened flow step.
enum Step {
    Snippet {
        template: Template,
        inputs: AHashMap<String, String>,
    },
    Branch(Vec<Vec<Step>>),
}

/// State of one compilation.
struct Pass<'a> {
    compiler: &'a Compiler,
    index: AHashMap<&'a str, &'a NodeRecord>,
    /// Hoisted `(key, source)` pairs.
    functions: Vec<(String, String)>,
    hoisted: AHashSet<String>,
    /// Uids of the data sources currently being resolved.
    visiting: Vec<String>,
}

impl<'a> Pass<'a> {
    fn new(compiler: &'a Compiler, spec: &'a ProgramSpec) -> Self {
        let mut index = AHashMap::new();
        for record in spec.records() {
            index.entry(record.uid.as_str()).or_insert(record);
        }
        Self {
            compiler,
            index,
            functions: Vec::new(),
            hoisted: AHashSet::new(),
            visiting: Vec::new(),
        }
    }

    fn flatten(
        &mut self,
        entries: &[FlowEntry],
        level: usize,
        parent: Option<&str>,
    ) -> Result<Vec<Step>, CompileError> {
        let compiler = self.compiler;
        let mut steps = Vec::with_capacity(entries.len());
        let mut last_uid = parent.map(str::to_string);

        for entry in entries {
            match entry {
                FlowEntry::Node(record) => {
                    let (_, descriptor) = compiler.snippets.lookup(record).ok_or_else(|| {
                        CompileError::UnknownIdentifier {
                            node_id: record.uid.clone(),
                            identifier: record.identifier.clone(),
                        }
                    })?;
                    let context = ScriptContext {
                        record: Some(record),
                        branch_count: descriptor.branch_count,
                    };
                    let template = Template::parse(&descriptor.script.source(&context));
                    let inputs = self.resolve_inputs(record, &descriptor.inputs)?;
                    steps.push(Step::Snippet { template, inputs });
                    last_uid = Some(record.uid.clone());
                }
                FlowEntry::Split { branch_count } => {
                    let descriptor = compiler
                        .snippets
                        .get(BRANCH_SPLIT_IDENTIFIER)
                        .ok_or_else(|| CompileError::UnknownIdentifier {
                            node_id: last_uid.clone().unwrap_or_default(),
                            identifier: BRANCH_SPLIT_IDENTIFIER.to_string(),
                        })?;
                    let context = ScriptContext {
                        record: None,
                        branch_count: *branch_count,
                    };
                    steps.push(Step::Snippet {
                        template: Template::parse(&descriptor.script.source(&context)),
                        inputs: AHashMap::new(),
                    });
                }
                FlowEntry::Branch { branches } => {
                    log::debug!("{} branches at nesting level {}", branches.len(), level);
                    let mut flattened = Vec::with_capacity(branches.len());
                    for branch in branches {
                        flattened.push(self.flatten(branch, level + 1, last_uid.as_deref())?);
                    }
                    steps.push(Step::Branch(flattened));
                }
            }
        }
        Ok(steps)
    }

    /// Maps each input placeholder of `record` to the text it is replaced by.
    fn resolve_inputs(
        &mut self,
        record: &NodeRecord,
        names: &[String],
    ) -> Result<AHashMap<String, String>, CompileError> {
        let mut resolved = AHashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let value = match record.inputs.get(index) {
                Some(input) => self.input_value(record, index, input)?,
                None => self.compiler.formatter.missing(),
            };
            resolved.insert(name.clone(), value);
        }
        Ok(resolved)
    }

    fn input_value(
        &mut self,
        record: &NodeRecord,
        index: usize,
        input: &InputRecord,
    ) -> Result<String, CompileError> {
        if let Some(source) = &input.source {
            let Some(port) = input.port else {
                return Err(CompileError::InvalidInput {
                    node_id: record.uid.clone(),
                    input_index: index,
                    message: format!("connected to '{}' without a source port", source),
                });
            };
            return self.source_expression(record, index, source, port);
        }
        match &input.value {
            Some(value) => self
                .compiler
                .formatter
                .format(value, input.port_type)
                .map_err(|message| CompileError::InvalidInput {
                    node_id: record.uid.clone(),
                    input_index: index,
                    message,
                }),
            None => Ok(self.compiler.formatter.missing()),
        }
    }

    /// The expression for data plug `port` of node `uid`, compiled together
    /// with that node's own inputs.
    fn source_expression(
        &mut self,
        consumer: &NodeRecord,
        input_index: usize,
        uid: &str,
        port: usize,
    ) -> Result<String, CompileError> {
        let compiler = self.compiler;
        let record = *self
            .index
            .get(uid)
            .ok_or_else(|| CompileError::MissingSource {
                node_id: consumer.uid.clone(),
                input_index,
                source_node_id: uid.to_string(),
            })?;
        if self.visiting.iter().any(|v| v == uid) {
            return Err(CompileError::DataCycle {
                node_id: uid.to_string(),
            });
        }
        if self.visiting.len() >= compiler.max_depth {
            return Err(CompileError::RecursionLimit {
                node_id: uid.to_string(),
                limit: compiler.max_depth,
            });
        }

        let (key, descriptor) =
            compiler
                .snippets
                .lookup(record)
                .ok_or_else(|| CompileError::UnknownIdentifier {
                    node_id: record.uid.clone(),
                    identifier: record.identifier.clone(),
                })?;
        let output = descriptor
            .outputs
            .get(port)
            .ok_or_else(|| CompileError::MissingOutput {
                node_id: record.uid.clone(),
                port,
            })?;

        if descriptor.pure_function && self.hoisted.insert(key.clone()) {
            let context = ScriptContext {
                record: Some(record),
                branch_count: 0,
            };
            self.functions.push((key, descriptor.script.source(&context)));
        }

        self.visiting.push(uid.to_string());
        let inputs = self.resolve_inputs(record, &descriptor.inputs);
        self.visiting.pop();
        let inputs = inputs?;

        Ok(Template::parse(output).render(|name| inputs.get(name).cloned()))
    }
}

/// Renders a flattened chain back to front, so each snippet is complete
/// before it lands in the `$further` slot of its predecessor.
fn render_chain(steps: &[Step]) -> String {
    let mut continuation = String::new();
    let mut pending: Vec<String> = Vec::new();

    for step in steps.iter().rev() {
        match step {
            Step::Branch(branches) => {
                pending = branches.iter().map(|b| render_chain(b)).collect();
            }
            Step::Snippet { template, inputs } => {
                let branch_texts = std::mem::take(&mut pending);
                let mut further = std::mem::take(&mut continuation);
                let has_branch_slots = template
                    .placeholders()
                    .any(|p| matches!(Slot::classify(p), Slot::Branch(_)));
                if !has_branch_slots && !branch_texts.is_empty() {
                    further = branch_texts.concat() + &further;
                }

                let mut further = Some(further);
                continuation = template.render(|name| match Slot::classify(name) {
                    Slot::Further => Some(further.take().unwrap_or_default()),
                    Slot::Branch(n) => Some(branch_texts.get(n).cloned().unwrap_or_default()),
                    Slot::Named(n) => inputs.get(n).cloned(),
                });
            }
        }
    }

    if !pending.is_empty() {
        continuation = pending.concat() + &continuation;
    }
    continuation
}
