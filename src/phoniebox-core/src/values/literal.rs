use super::InvalidConfig;
use std::fmt;

/// Scalar value of a function argument, e.g. the `5` in `seek_fwd,seconds=5`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl ArgValue {
    /// Parses an integer, float, single/double quoted string or boolean.
    pub fn parse_literal(raw: &str) -> Result<Self, InvalidConfig> {
        let text = raw.trim();
        let invalid = || InvalidConfig::Literal(text.to_string());

        match text {
            "True" | "true" => return Ok(ArgValue::Bool(true)),
            "False" | "false" => return Ok(ArgValue::Bool(false)),
            _ => {}
        }

        if let Some(quote) = text.chars().next().filter(|c| *c == '\'' || *c == '"') {
            return unquote(text, quote).map(ArgValue::Str).ok_or_else(invalid);
        }

        if !looks_numeric(text) {
            return Err(invalid());
        }
        if let Ok(int) = text.parse::<i64>() {
            return Ok(ArgValue::Int(int));
        }
        text.parse::<f64>()
            .ok()
            .filter(|float| float.is_finite())
            .map(ArgValue::Float)
            .ok_or_else(invalid)
    }

    /// Numeric view of the value; strings and booleans have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Int(int) => Some(*int as f64),
            ArgValue::Float(float) => Some(*float),
            ArgValue::Str(_) | ArgValue::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(text) => Some(text),
            _ => None,
        }
    }
}

// Rejects words like `inf` or `nan` that `f64::from_str` would accept.
fn looks_numeric(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

fn unquote(text: &str, quote: char) -> Option<String> {
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                other => out.push(other),
            },
            c if c == quote => return None,
            c => out.push(c),
        }
    }
    Some(out)
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(int) => write!(f, "{int}"),
            // Debug keeps the fraction (`2.0`) so the value reparses as a float.
            ArgValue::Float(float) => write!(f, "{float:?}"),
            ArgValue::Bool(true) => f.write_str("True"),
            ArgValue::Bool(false) => f.write_str("False"),
            ArgValue::Str(text) => {
                f.write_str("'")?;
                for c in text.chars() {
                    match c {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("'")
            }
        }
    }
}
