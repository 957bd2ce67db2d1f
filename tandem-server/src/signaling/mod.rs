mod session;
mod ws_handler;

pub use session::*;
pub use ws_handler::*;
