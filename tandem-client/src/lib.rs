//! Client side of a two-party call.
//!
//! [`Negotiator`] is the pure state machine that reacts to signaling and transport
//! events; [`Call`] drives it, owning the signaling socket, the local media and a
//! [`PeerAdapter`] around the external peer-connection engine.

mod adapter;
mod call;
mod config;
mod error;
mod media;
mod negotiation;
mod peer;
mod signaling;

pub use adapter::*;
pub use call::*;
pub use config::*;
pub use error::*;
pub use media::*;
pub use negotiation::*;
pub use peer::*;
pub use signaling::*;
