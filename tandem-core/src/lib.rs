//! Wire model shared by the tandem signaling server and client.
//!
//! Every frame on the signaling socket is one JSON object tagged by `type`;
//! [`SignalMessage`] is that object and [`codec`] turns text into messages and back.

pub mod codec;
pub mod error;
pub mod model;

pub use codec::{Inbound, RelayFrame, decode, decode_inbound, encode};
pub use error::CodecError;
pub use model::*;
