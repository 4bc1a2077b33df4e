//! Card register decoders.
//!
//! Each register arrives on the wire as a fixed-size byte block; the
//! command/data layer ([`crate::command`], [`crate::data`]) is responsible
//! for fetching the raw bytes, and these types are responsible only for
//! giving them field-level meaning.

mod cid;
mod csd;
mod scr;
mod status;

pub use cid::CardIdentification;
pub use csd::CardSpecificData;
pub use scr::Configuration;
pub use status::SdStatus;
