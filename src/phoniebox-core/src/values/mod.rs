//! Parsers for the comma separated values found in the `[gpio]` and
//! `[buttons]` config tables.
//!
//! Every parser treats a missing, empty or whitespace-only value as "not
//! configured" and returns `Ok(None)`; only malformed text is an error.
//! Each value type also serializes back to a string that parses to an
//! equal value.

mod button;
mod function;
mod gpio;
mod literal;

pub use button::ButtonConfig;
pub use function::FunctionConfig;
pub use gpio::{PinElectricalConfig, PullMode};
pub use literal::ArgValue;

use thiserror::Error;

/// A single config value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidConfig {
    #[error("expected {expected} fields but found {found} in '{value}'")]
    FieldCount {
        value: String,
        expected: &'static str,
        found: usize,
    },
    #[error("invalid pull mode '{0}' (one of pull_up, pull_down, none, none_invert required)")]
    PullMode(String),
    #[error("invalid bounce time '{0}' (positive integer milliseconds or none required)")]
    BounceTime(String),
    #[error("invalid hold time '{0}' (positive number of seconds required)")]
    HoldTime(String),
    #[error("invalid hold repeat '{0}' (true or false required)")]
    HoldRepeat(String),
    #[error("invalid gpio '{0}' (expected gpio<N>)")]
    PinPrefix(String),
    #[error("gpio {0} out of range (must be between 0 and 27)")]
    PinRange(i64),
    #[error("invalid button edge '{0}' (one of when_pressed, when_held required)")]
    Edge(String),
    #[error("empty function name in '{0}'")]
    EmptyFunction(String),
    #[error("malformed function argument '{0}' (expected key=value)")]
    MissingAssignment(String),
    #[error("empty argument name in '{0}'")]
    EmptyArgumentName(String),
    #[error("malformed literal '{0}' (expected integer, float, quoted string or boolean)")]
    Literal(String),
    #[error("unknown config key '{0}'")]
    UnknownKey(String),
}

/// Trims the raw value and maps empty input to `None`.
fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}
