//! Parameter providers of the host chain.

use core::time::Duration;

use crate::{height::Height, identifier::chain_id_revision};

/// Historical header information retained by the host's staking module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoricalInfo {
    /// Block time in unix nanoseconds
    pub timestamp: u64,
    /// App hash committed in the header
    pub app_hash: Vec<u8>,
    /// Hash of the next validator set
    pub next_validators_hash: Vec<u8>,
}

/// Live parameters of the host chain, supplied by the surrounding state
/// machine for the duration of one call.
pub trait HostContext {
    /// The chain id of the host.
    fn chain_id(&self) -> &str;

    /// The current block height within the host's revision.
    fn block_height(&self) -> u64;

    /// The current block time in unix nanoseconds.
    fn block_time(&self) -> u64;

    /// The unbonding period of the host's staking module.
    fn unbonding_period(&self) -> Duration;

    /// Historical info at `height`, `None` once it has been pruned.
    fn historical_info(&self, height: u64) -> Option<HistoricalInfo>;

    /// The current height of the host, on the revision parsed from its chain id.
    fn self_height(&self) -> Height {
        Height::new(chain_id_revision(self.chain_id()), self.block_height())
    }
}
