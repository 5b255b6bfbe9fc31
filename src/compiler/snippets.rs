use crate::model::{NodeKind, VariantKind};
use crate::spec::{BRANCH_SPLIT_IDENTIFIER, NodeRecord};
use ahash::AHashMap;
use itertools::Itertools;

/// Facts a generated script may depend on.
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext<'a> {
    /// The node being compiled; `None` for the branch-split marker.
    pub record: Option<&'a NodeRecord>,
    /// Number of branches following a branch-split marker.
    pub branch_count: usize,
}

#[derive(Debug, Clone)]
pub enum ScriptTemplate {
    Text(String),
    /// Built per use from the context.
    Generated(fn(&ScriptContext) -> String),
}

impl ScriptTemplate {
    pub fn source(&self, context: &ScriptContext) -> String {
        match self {
            ScriptTemplate::Text(text) => text.clone(),
            ScriptTemplate::Generated(generate) => generate(context),
        }
    }
}

/// How one stable identifier compiles.
///
/// Flow snippets put their code in `script`, with `$further` where the next
/// snippet goes and `$branchN` for branch bodies. Data sources describe the
/// value of each data plug in `outputs`. Pure functions have their `script`
/// hoisted once into the function block instead.
#[derive(Debug, Clone)]
pub struct SnippetDescriptor {
    pub script: ScriptTemplate,
    /// Placeholder name of each data socket, in socket order.
    pub inputs: Vec<String>,
    /// Expression of each data plug, in plug order.
    pub outputs: Vec<String>,
    pub branching: bool,
    pub branch_count: usize,
    pub pure_function: bool,
}

impl SnippetDescriptor {
    pub fn new(script: &str) -> Self {
        Self {
            script: ScriptTemplate::Text(script.to_string()),
            inputs: Vec::new(),
            outputs: Vec::new(),
            branching: false,
            branch_count: 0,
            pure_function: false,
        }
    }

    pub fn generated(generate: fn(&ScriptContext) -> String) -> Self {
        Self {
            script: ScriptTemplate::Generated(generate),
            ..Self::new("")
        }
    }

    pub fn with_inputs(mut self, inputs: &[&str]) -> Self {
        self.inputs = inputs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_outputs(mut self, outputs: &[&str]) -> Self {
        self.outputs = outputs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_branches(mut self, count: usize) -> Self {
        self.branching = true;
        self.branch_count = count;
        self
    }

    pub fn pure(mut self) -> Self {
        self.pure_function = true;
        self
    }
}

/// Snippet descriptors for one target language, keyed by stable identifier
/// (or `identifier:variant` for variant nodes).
#[derive(Debug, Clone, Default)]
pub struct SnippetTable {
    entries: AHashMap<String, SnippetDescriptor>,
}

impl SnippetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, descriptor: SnippetDescriptor) -> Option<SnippetDescriptor> {
        self.entries.insert(key.to_string(), descriptor)
    }

    pub fn get(&self, key: &str) -> Option<&SnippetDescriptor> {
        self.entries.get(key)
    }

    /// Looks up the variant-specific entry first, then the plain identifier.
    /// Returns the key that matched.
    pub fn lookup(&self, record: &NodeRecord) -> Option<(String, &SnippetDescriptor)> {
        let key = record.snippet_key();
        if let Some(descriptor) = self.entries.get(&key) {
            return Some((key, descriptor));
        }
        self.entries
            .get(&record.identifier)
            .map(|d| (record.identifier.clone(), d))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Browser JavaScript for every built-in node kind.
    pub fn javascript() -> Self {
        let mut table = Self::new();
        let add = SnippetDescriptor::new("").with_inputs(&["a", "b"]).with_outputs(&["($a + $b)"]);
        let multiply = SnippetDescriptor::new("")
            .with_inputs(&["a", "b"])
            .with_outputs(&["($a * $b)"]);

        for kind in NodeKind::ALL {
            let descriptor = match kind {
                NodeKind::StartEvent => SnippetDescriptor::new("(function() {$further})()"),
                NodeKind::Condition => SnippetDescriptor::new("if ($in) {$branch0} else {$branch1}")
                    .with_inputs(&["in"])
                    .with_branches(2),
                NodeKind::ConsoleLog => {
                    SnippetDescriptor::new("console.log($in);$further").with_inputs(&["in"])
                }
                NodeKind::IsMobile => SnippetDescriptor::new(
                    "function OVSBIsMobile() {\n  return typeof screen.orientation !== 'undefined';\n}",
                )
                .with_outputs(&["OVSBIsMobile()"])
                .pure(),
                NodeKind::ScreenSize => SnippetDescriptor::new(
                    "function OVSBScreenWidth() {return window.screen.width;}\nfunction OVSBScreenHeight() {return window.screen.height;}",
                )
                .with_outputs(&["OVSBScreenWidth()", "OVSBScreenHeight()"])
                .pure(),
                NodeKind::Addition | NodeKind::GeneralAddition | NodeKind::Math => add.clone(),
                NodeKind::Multiplication => multiply.clone(),
                NodeKind::VariableWrite => {
                    SnippetDescriptor::new("(globalThis.OVSVariables ??= {})[$name] = $value;$further")
                        .with_inputs(&["name", "value"])
                }
                NodeKind::VariableRead => SnippetDescriptor::new("")
                    .with_inputs(&["name"])
                    .with_outputs(&["(globalThis.OVSVariables ?? {})[$name]"]),
            };
            table.register(kind.identifier(), descriptor);
        }

        let math = NodeKind::Math.identifier();
        table.register(&format!("{}:{}", math, VariantKind::Add.key()), add);
        table.register(&format!("{}:{}", math, VariantKind::Multiply.key()), multiply);
        table.register(BRANCH_SPLIT_IDENTIFIER, branch_split());
        table
    }
}

/// Runs every branch in order: `$branch0$branch1...`.
pub fn branch_split() -> SnippetDescriptor {
    SnippetDescriptor::generated(|context| {
        (0..context.branch_count)
            .map(|i| format!("$branch{}", i))
            .join("")
    })
}
