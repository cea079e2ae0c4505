//! Domain layer: the ephemeral values that flow through the console.
//!
//! Every value here is created by the protocol client, consumed exactly
//! once by a relay or the command loop, and dropped after rendering.

pub mod command_response;
pub mod message;
pub mod radio_address;
pub mod state_update;
pub mod subscription;

pub use command_response::CommandResponse;
pub use message::Message;
pub use radio_address::{ClientHandle, DISCOVER_SENTINEL, RadioAddress};
pub use state_update::StateUpdate;
pub use subscription::{Subscription, SubscriptionId, SubscriptionSet};
