//! `$name` placeholder templates.
//!
//! A template is parsed once into text and placeholder segments and rendered
//! in a single pass, so substituted text is never scanned for placeholders
//! again.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// A `$name` placeholder, stored without the `$`.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    segments: Vec<Segment>,
}

/// What a placeholder name stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    /// `$further`: where the next snippet of the chain goes.
    Further,
    /// `$branchN`: where the N-th branch goes.
    Branch(usize),
    /// Any other name, typically an input.
    Named(&'a str),
}

impl<'a> Slot<'a> {
    pub fn classify(name: &'a str) -> Self {
        if name == "further" {
            return Slot::Further;
        }
        if let Some(index) = name
            .strip_prefix("branch")
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|n| n.parse().ok())
        {
            return Slot::Branch(index);
        }
        Slot::Named(name)
    }
}

impl Template {
    /// Splits `source` at every `$` followed by an identifier character. A
    /// lone `$` stays text.
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '$' {
                text.push(c);
                continue;
            }
            let mut name = String::new();
            while let Some(&(_, next)) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                text.push('$');
                continue;
            }
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Placeholder(name));
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Renders the template. `resolve` is called once per placeholder, left
    /// to right; `None` keeps the placeholder verbatim.
    pub fn render(&self, mut resolve: impl FnMut(&str) -> Option<String>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(name) => match resolve(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('$');
                        out.push_str(name);
                    }
                },
            }
        }
        out
    }
}

