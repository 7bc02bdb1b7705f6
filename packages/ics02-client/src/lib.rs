#![doc = include_str!("../README.md")]
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]
#![allow(clippy::module_name_repetitions)]

pub mod client_state;
pub mod codec;
pub mod config;
pub mod consensus_state;
pub mod error;
pub mod genesis;
pub mod height;
pub mod host;
pub mod identifier;
pub mod keeper;
pub mod migrations;
pub mod self_client;
pub mod serde_helpers;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client_state::{AnyClientState, ClientType, Status};
pub use consensus_state::AnyConsensusState;
pub use error::{ClientError, ErrorKind};
pub use height::Height;
pub use keeper::ClientKeeper;
