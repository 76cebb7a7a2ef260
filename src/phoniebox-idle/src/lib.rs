//! Powers the box off after a configurable time without playback.

mod timer;
mod watchdog;

pub use timer::WatchdogTimer;
pub use watchdog::{IdleWatchdog, WatchdogNotifier};
