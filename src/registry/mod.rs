use crate::model::{NodeClass, NodeKind};
use ahash::AHashMap;

/// What the registry knows about one stable identifier.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// The kind spawned for this identifier.
    pub kind: NodeKind,
    pub display_name: String,
    pub class: NodeClass,
}

/// Maps stable identifiers to the node kinds that implement them.
///
/// Consumed by the importer and by palette UIs. Several identifiers may map to
/// the same kind, which lets a host accept legacy names.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    entries: AHashMap<String, RegistryEntry>,
    order: Vec<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in kind under its own identifier.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in NodeKind::ALL {
            registry.register(kind.identifier(), *kind, kind.display_name(), kind.class());
        }
        registry
    }

    /// Registers `identifier`, replacing and returning any previous entry.
    pub fn register(
        &mut self,
        identifier: &str,
        kind: NodeKind,
        display_name: &str,
        class: NodeClass,
    ) -> Option<RegistryEntry> {
        let entry = RegistryEntry {
            kind,
            display_name: display_name.to_string(),
            class,
        };
        let previous = self.entries.insert(identifier.to_string(), entry);
        if previous.is_none() {
            self.order.push(identifier.to_string());
        }
        previous
    }

    pub fn lookup(&self, identifier: &str) -> Option<NodeKind> {
        self.entries.get(identifier).map(|e| e.kind)
    }

    pub fn entry(&self, identifier: &str) -> Option<&RegistryEntry> {
        self.entries.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries grouped by class, in class order then registration order.
    /// Classes without entries are omitted.
    pub fn palette(&self) -> Vec<(NodeClass, Vec<(&str, &RegistryEntry)>)> {
        NodeClass::ALL
            .into_iter()
            .filter_map(|class| {
                let items: Vec<_> = self
                    .order
                    .iter()
                    .filter_map(|id| self.entries.get(id).map(|e| (id.as_str(), e)))
                    .filter(|(_, e)| e.class == class)
                    .collect();
                (!items.is_empty()).then_some((class, items))
            })
            .collect()
    }
}
