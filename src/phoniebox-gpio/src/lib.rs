//! Button handling: electrical setup of the GPIO lines and dispatch of
//! debounced edge events to the bound playback actions.

mod dispatcher;
mod driver;
mod worker;

pub use dispatcher::{Binding, BindingError, ButtonState, GpioDispatcher, PinSlot};
pub use driver::{pin_event_channel, GpioDriver, GpioDriverError, NullGpioDriver, PinEvent};
pub use worker::spawn_dispatcher;
