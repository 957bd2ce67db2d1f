mod join_outcome;
mod outbound;
mod room;
mod room_registry;

pub use join_outcome::*;
pub use outbound::*;
pub use room::*;
pub use room_registry::*;
