//! Room registry and WebSocket signaling endpoint.
//!
//! Each connection becomes a [`SignalingSession`]; sessions share one [`RoomRegistry`]
//! that pairs members two per room and relays offers, answers and candidates between them.

mod app;
mod config;
mod error;
mod registry;
mod signaling;

pub use app::*;
pub use config::*;
pub use error::*;
pub use registry::*;
pub use signaling::*;
