pub mod config;
pub mod logging;
pub mod models;
pub mod paths;
pub mod settings;
pub mod values;

pub use config::{Config, ConfigError, LogLevel, LoggingConfig, ValidationError};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use models::{EdgeKind, ParseStateError, PinIndex, PlaybackState, PIN_COUNT};
pub use paths::{AppDirs, DirsError};
pub use settings::{BindingEntry, GpioKey, GpioSettings, SettingsError};
pub use values::{
    ArgValue, ButtonConfig, FunctionConfig, InvalidConfig, PinElectricalConfig, PullMode,
};

pub const APP_NAME: &str = "phoniebox";
pub const APP_AUTHOR: &str = "Phoniebox";
pub const APP_QUALIFIER: &str = "io";
