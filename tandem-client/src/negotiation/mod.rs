mod command;
mod event;
mod negotiator;
mod state;

pub use command::*;
pub use event::*;
pub use negotiator::*;
pub use state::*;
