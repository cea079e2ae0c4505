//! Background relays draining client event channels into the output sink.
//!
//! Each relay owns its receiver and ends when the client drops the sending
//! side. Channel closure is the only stop signal they observe.

pub mod notification;
pub mod state_update;

pub use notification::NotificationRelay;
pub use state_update::{DEFAULT_UPDATE_CAPACITY, MAX_UPDATE_CAPACITY, StateUpdateRelay};
