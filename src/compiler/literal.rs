use crate::model::{LiteralValue, PortType};
use itertools::Itertools;

/// Turns socket constants into target-language literal syntax.
pub trait LiteralFormatter: Send + Sync {
    /// Formats `value` for a socket declared as `port_type`. An error message
    /// means the value cannot stand in for that type.
    fn format(&self, value: &LiteralValue, port_type: PortType) -> Result<String, String>;

    /// Text used for an input that is neither connected nor given a value.
    fn missing(&self) -> String;
}

/// Literal syntax described as a table of keywords and delimiters.
#[derive(Debug, Clone)]
pub struct QuotingTable {
    pub true_literal: String,
    pub false_literal: String,
    pub missing_literal: String,
    pub array_open: String,
    pub array_close: String,
    pub separator: String,
    pub nan_literal: String,
    pub infinity_literal: String,
    /// Quotes and escapes a string.
    pub quote: fn(&str) -> String,
}

/// Double-quoted string with JSON escapes, valid in both JavaScript and Python.
fn json_quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

impl QuotingTable {
    pub fn javascript() -> Self {
        Self {
            true_literal: "true".to_string(),
            false_literal: "false".to_string(),
            missing_literal: "undefined".to_string(),
            array_open: "[".to_string(),
            array_close: "]".to_string(),
            separator: ", ".to_string(),
            nan_literal: "NaN".to_string(),
            infinity_literal: "Infinity".to_string(),
            quote: json_quote,
        }
    }

    pub fn python() -> Self {
        Self {
            true_literal: "True".to_string(),
            false_literal: "False".to_string(),
            missing_literal: "None".to_string(),
            nan_literal: "float('nan')".to_string(),
            infinity_literal: "float('inf')".to_string(),
            ..Self::javascript()
        }
    }

    fn bool(&self, b: bool) -> String {
        if b {
            self.true_literal.clone()
        } else {
            self.false_literal.clone()
        }
    }

    fn float(&self, n: f64) -> String {
        if n.is_nan() {
            self.nan_literal.clone()
        } else if n.is_infinite() {
            let sign = if n < 0.0 { "-" } else { "" };
            format!("{}{}", sign, self.infinity_literal)
        } else {
            format!("{}", n)
        }
    }

    /// Formats by the value's own shape, ignoring the socket type.
    fn natural(&self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::Bool(b) => self.bool(*b),
            LiteralValue::Int(i) => i.to_string(),
            LiteralValue::Float(n) => self.float(*n),
            LiteralValue::Str(s) => (self.quote)(s),
            LiteralValue::Array(items) => {
                let inner = items.iter().map(|i| self.natural(i)).join(&self.separator);
                format!("{}{}{}", self.array_open, inner, self.array_close)
            }
        }
    }
}

impl LiteralFormatter for QuotingTable {
    fn format(&self, value: &LiteralValue, port_type: PortType) -> Result<String, String> {
        match (port_type, value) {
            (PortType::String, LiteralValue::Str(s)) => Ok((self.quote)(s)),
            (PortType::String, other) => Ok((self.quote)(&other.to_string())),
            (PortType::Boolean, LiteralValue::Bool(b)) => Ok(self.bool(*b)),
            (PortType::Boolean, LiteralValue::Str(s)) => match s.trim() {
                "true" => Ok(self.bool(true)),
                "false" => Ok(self.bool(false)),
                _ => Err(format!("'{}' is not a boolean", s)),
            },
            (PortType::Integer, LiteralValue::Int(i)) => Ok(i.to_string()),
            (PortType::Integer, LiteralValue::Float(n)) if n.fract() == 0.0 => {
                // `as` saturates, so the range is checked first.
                if *n >= i64::MIN as f64 && *n < i64::MAX as f64 {
                    Ok(format!("{}", *n as i64))
                } else {
                    Err(format!("{} is out of integer range", n))
                }
            }
            (PortType::Integer, LiteralValue::Str(s)) => s
                .trim()
                .parse::<i64>()
                .map(|i| i.to_string())
                .map_err(|_| format!("'{}' is not an integer", s)),
            (PortType::Float | PortType::Number, LiteralValue::Int(i)) => Ok(i.to_string()),
            (PortType::Float | PortType::Number, LiteralValue::Float(n)) => Ok(self.float(*n)),
            (PortType::Float | PortType::Number, LiteralValue::Str(s)) => s
                .trim()
                .parse::<f64>()
                .map(|n| self.float(n))
                .map_err(|_| format!("'{}' is not a number", s)),
            (PortType::Array, LiteralValue::Array(_)) => Ok(self.natural(value)),
            (PortType::Any, _) => Ok(self.natural(value)),
            (PortType::Connector, _) => Err("flow sockets hold no values".to_string()),
            (expected, other) => Err(format!("{} does not fit a '{}' socket", other, expected)),
        }
    }

    fn missing(&self) -> String {
        self.missing_literal.clone()
    }
}
