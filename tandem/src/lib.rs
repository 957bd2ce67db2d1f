pub use tandem_core::model::{MemberId, RoomId, SignalMessage};

pub mod model {
    pub use tandem_core::model::*;
}

pub mod codec {
    pub use tandem_core::codec::*;
    pub use tandem_core::error::CodecError;
}

#[cfg(feature = "server")]
pub mod server {
    pub use tandem_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tandem_client::*;
}
