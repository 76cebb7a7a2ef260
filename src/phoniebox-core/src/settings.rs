//! Interpretation of the `[gpio]` and `[buttons]` config tables.

use crate::models::{EdgeKind, PinIndex};
use crate::values::{ButtonConfig, FunctionConfig, InvalidConfig, PinElectricalConfig};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A key of the `[gpio]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GpioKey {
    /// `gpioN`: electrical setup of a line.
    Pin(PinIndex),
    /// `gpioN.when_pressed` and friends: function bound to an edge.
    Edge(PinIndex, EdgeKind),
}

impl FromStr for GpioKey {
    type Err = InvalidConfig;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let unknown = || InvalidConfig::UnknownKey(key.to_string());
        let (pin, edge) = match key.split_once('.') {
            Some((pin, edge)) => (pin, Some(edge)),
            None => (key, None),
        };

        let pin = pin
            .strip_prefix("gpio")
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            // only the canonical spelling, so `gpio01` cannot shadow `gpio1`
            .filter(|n| *n == "0" || !n.starts_with('0'))
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(PinIndex::new)
            .ok_or_else(unknown)?;

        match edge {
            None => Ok(GpioKey::Pin(pin)),
            Some(edge) => EdgeKind::from_config_name(edge)
                .map(|edge| GpioKey::Edge(pin, edge))
                .ok_or_else(unknown),
        }
    }
}

impl fmt::Display for GpioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioKey::Pin(pin) => write!(f, "{pin}"),
            GpioKey::Edge(pin, edge) => write!(f, "{pin}.{edge}"),
        }
    }
}

/// One function to bind to a pin edge, in application order.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingEntry {
    pub pin: PinIndex,
    pub edge: EdgeKind,
    pub function: FunctionConfig,
}

/// A config entry that was skipped because its key or value is malformed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{table}.{key}: {error}")]
pub struct SettingsError {
    pub table: &'static str,
    pub key: String,
    #[source]
    pub error: InvalidConfig,
}

/// Button related settings extracted from the raw config tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpioSettings {
    pub pins: BTreeMap<PinIndex, PinElectricalConfig>,
    /// Pin-centric bindings first (by pin, then edge), followed by the
    /// action-centric `[buttons]` entries.
    pub bindings: Vec<BindingEntry>,
    pub errors: Vec<SettingsError>,
}

impl GpioSettings {
    pub fn from_tables(
        gpio: &BTreeMap<String, String>,
        buttons: &BTreeMap<String, String>,
    ) -> Self {
        let mut settings = Self::default();
        let mut pin_bindings = BTreeMap::new();

        for (key, value) in gpio {
            let parsed = key.parse::<GpioKey>().and_then(|parsed| match parsed {
                GpioKey::Pin(pin) => PinElectricalConfig::parse(Some(value)).map(|config| {
                    if let Some(config) = config {
                        settings.pins.insert(pin, config);
                    }
                }),
                GpioKey::Edge(pin, edge) => FunctionConfig::parse(Some(value)).map(|function| {
                    if let Some(function) = function {
                        pin_bindings.insert((pin, edge), function);
                    }
                }),
            });
            if let Err(error) = parsed {
                settings.reject("gpio", key, error);
            }
        }

        settings.bindings = pin_bindings
            .into_iter()
            .map(|((pin, edge), function)| BindingEntry {
                pin,
                edge,
                function,
            })
            .collect();

        for (action, value) in buttons {
            match ButtonConfig::parse(Some(value)) {
                Ok(Some(button)) => settings.bindings.push(BindingEntry {
                    pin: button.pin,
                    edge: button.edge,
                    function: FunctionConfig::new(action.trim()),
                }),
                Ok(None) => {}
                Err(error) => settings.reject("buttons", action, error),
            }
        }

        settings
    }

    /// Serializes the pin-centric view back into `[gpio]` table entries.
    pub fn to_gpio_table(&self) -> BTreeMap<String, String> {
        let pins = self
            .pins
            .iter()
            .map(|(pin, config)| (GpioKey::Pin(*pin), config.to_string()));
        let bindings = self.bindings.iter().map(|binding| {
            (
                GpioKey::Edge(binding.pin, binding.edge),
                binding.function.to_string(),
            )
        });

        let mut table = BTreeMap::new();
        for (key, value) in pins.chain(bindings) {
            // keep the first binding of an edge, like the dispatcher does
            table.entry(key.to_string()).or_insert(value);
        }
        table
    }

    fn reject(&mut self, table: &'static str, key: &str, error: InvalidConfig) {
        tracing::warn!("ignoring {table}.{key}: {error}");
        self.errors.push(SettingsError {
            table,
            key: key.to_string(),
            error,
        });
    }
}
