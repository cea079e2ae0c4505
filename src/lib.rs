//! # flex-console
//!
//! Interactive command console for a software-defined radio.
//!
//! The console connects a protocol client to the radio, relays the radio's
//! asynchronous notices and object-state deltas to the terminal, and lets
//! the user type commands whose responses are printed as they arrive. All
//! protocol details live behind [`client::ProtocolClient`]; this crate is a
//! coordination layer.
//!
//! ## Architecture
//!
//! ```text
//! stdin ── InputSource (input)
//!     │
//!     ├── CommandLoop (session/)          ── send_and_wait ──┐
//!     ├── ShutdownCoordinator (session/)  ── close ──────────┤
//!     │                                                      ▼
//!     │                                   ProtocolClient (client/)
//!     │                                     │           │
//!     ├── NotificationRelay (relay/) ◀── notices     deltas ──▶ StateUpdateRelay (relay/)
//!     │
//!     └── render/ ── LineSink (sink) ── terminal
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod input;
pub mod relay;
pub mod render;
pub mod session;
pub mod sink;
