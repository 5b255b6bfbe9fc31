use super::{FlowEntry, NodeRecord, ProgramSpec};
use std::fmt;

/// Renders a specification as an indented tree, one line per entry.
pub struct DisplaySpec<'a> {
    pub spec: &'a ProgramSpec,
}

impl fmt::Display for DisplaySpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, flow) in self.spec.flows.iter().enumerate() {
            writeln!(f, "Flow {}", i)?;
            self.fmt_entries(flow, f, "")?;
        }
        if !self.spec.additional.is_empty() {
            writeln!(f, "Additional")?;
            let count = self.spec.additional.len();
            for (i, record) in self.spec.additional.iter().enumerate() {
                let marker = if i + 1 == count { "└── " } else { "├── " };
                writeln!(f, "{}{}", marker, label(record))?;
            }
        }
        Ok(())
    }
}

impl DisplaySpec<'_> {
    fn fmt_entries(&self, entries: &[FlowEntry], f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        if entries.is_empty() {
            return writeln!(f, "{}└── <empty>", prefix);
        }
        for (i, entry) in entries.iter().enumerate() {
            self.fmt_entry(entry, f, prefix, i + 1 == entries.len())?;
        }
        Ok(())
    }

    fn fmt_entry(
        &self,
        entry: &FlowEntry,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match entry {
            FlowEntry::Node(record) => writeln!(f, "{}", label(record))?,
            FlowEntry::Split { branch_count } => writeln!(f, "Split ({})", branch_count)?,
            FlowEntry::Branch { branches } => {
                writeln!(f, "Branch ({})", branches.len())?;
                for (j, branch) in branches.iter().enumerate() {
                    let last = j + 1 == branches.len();
                    writeln!(f, "{}{}#{}", child_prefix, if last { "└── " } else { "├── " }, j)?;
                    let branch_prefix =
                        format!("{}{}", child_prefix, if last { "    " } else { "│   " });
                    self.fmt_entries(branch, f, &branch_prefix)?;
                }
            }
        }
        Ok(())
    }
}

fn label(record: &NodeRecord) -> String {
    let mut out = format!("{} [{}]", record.uid, record.snippet_key());
    let inputs: Vec<String> = record
        .inputs
        .iter()
        .enumerate()
        .filter_map(|(i, input)| match (&input.source, &input.value) {
            (Some(source), _) => Some(format!("${}<-{}:{}", i, source, input.port.unwrap_or(0))),
            (None, Some(value)) => Some(format!("${}={}", i, value)),
            (None, None) => None,
        })
        .collect();
    if !inputs.is_empty() {
        out.push_str(&format!(" ({})", inputs.join(", ")));
    }
    out
}
