use tandem_core::MemberId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The member has no live connection registered.
    #[error("unknown member {0}")]
    UnknownMember(MemberId),
}
