use super::{non_empty, InvalidConfig};
use crate::models::{EdgeKind, PinIndex};
use std::fmt;

/// Action-centric button assignment: `gpio<N>,<edge>`.
///
/// Only the press and hold edges can be targeted this way; release
/// bindings need the pin-centric `gpioN.when_released` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonConfig {
    pub pin: PinIndex,
    pub edge: EdgeKind,
}

impl ButtonConfig {
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, InvalidConfig> {
        let Some(value) = non_empty(raw) else {
            return Ok(None);
        };

        let fields: Vec<&str> = value.split(',').map(str::trim).collect();
        let [pin, edge] = fields.as_slice() else {
            return Err(InvalidConfig::FieldCount {
                value: value.to_string(),
                expected: "2",
                found: fields.len(),
            });
        };

        let number = pin
            .strip_prefix("gpio")
            .and_then(|n| n.parse::<i64>().ok())
            .ok_or_else(|| InvalidConfig::PinPrefix(pin.to_string()))?;
        let pin = u8::try_from(number)
            .ok()
            .and_then(PinIndex::new)
            .ok_or(InvalidConfig::PinRange(number))?;

        let edge = match EdgeKind::from_config_name(edge) {
            Some(edge @ (EdgeKind::Pressed | EdgeKind::Held)) => edge,
            _ => return Err(InvalidConfig::Edge(edge.to_string())),
        };

        Ok(Some(Self { pin, edge }))
    }
}

impl fmt::Display for ButtonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.pin, self.edge)
    }
}
