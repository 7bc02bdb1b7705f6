//! Test helpers: an in-memory [`HostContext`] and state fixtures.

use core::time::Duration;
use std::collections::BTreeMap;

use crate::host::{HistoricalInfo, HostContext};

/// Nanoseconds per second.
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// An in-memory host chain whose parameters tests set directly.
#[derive(Clone, Debug)]
pub struct MockHost {
    /// The chain id
    pub chain_id: String,
    /// The current block height
    pub block_height: u64,
    /// The current block time in unix nanoseconds
    pub block_time: u64,
    /// The staking unbonding period
    pub unbonding_period: Duration,
    /// Retained historical info, keyed by block height
    pub historical: BTreeMap<u64, HistoricalInfo>,
}

impl MockHost {
    /// Creates a host at `block_height` with historical info for every height
    /// from 1 up to and including `block_height`. Block `h` has time
    /// `genesis_time + h` seconds.
    #[must_use]
    pub fn new(chain_id: &str, block_height: u64) -> Self {
        let mut host = Self {
            chain_id: chain_id.to_string(),
            block_height: 0,
            block_time: fixtures::GENESIS_TIME,
            unbonding_period: fixtures::UNBONDING_PERIOD,
            historical: BTreeMap::new(),
        };
        for _ in 0..block_height {
            host.advance_block();
        }
        host
    }

    /// Commits a new block one second after the previous one.
    pub fn advance_block(&mut self) {
        self.block_height += 1;
        self.block_time = fixtures::GENESIS_TIME + self.block_height * NANOS_PER_SECOND;
        self.historical.insert(
            self.block_height,
            HistoricalInfo {
                timestamp: self.block_time,
                app_hash: format!("app-hash-{}", self.block_height).into_bytes(),
                next_validators_hash: b"next-validators".to_vec(),
            },
        );
    }

    /// Drops historical info below `height`, as the staking module does once
    /// entries fall out of its retention window.
    pub fn prune_historical_below(&mut self, height: u64) {
        self.historical = self.historical.split_off(&height);
    }
}

impl HostContext for MockHost {
    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn block_height(&self) -> u64 {
        self.block_height
    }

    fn block_time(&self) -> u64 {
        self.block_time
    }

    fn unbonding_period(&self) -> Duration {
        self.unbonding_period
    }

    fn historical_info(&self, height: u64) -> Option<HistoricalInfo> {
        self.historical.get(&height).cloned()
    }
}

/// State fixtures shared by unit and integration tests.
pub mod fixtures {
    use core::time::Duration;

    use super::NANOS_PER_SECOND;
    use crate::{
        client_state::{
            LocalhostClientState, SolomachineClientState, TendermintClientState, TrustThreshold,
        },
        config::{sdk_proof_specs, DEFAULT_UPGRADE_PATH},
        consensus_state::{SolomachineConsensusState, TendermintConsensusState},
        height::Height,
    };

    /// 2020-01-01T00:00:00Z in unix nanoseconds.
    pub const GENESIS_TIME: u64 = 1_577_836_800 * NANOS_PER_SECOND;
    /// Two weeks.
    pub const TRUSTING_PERIOD: Duration = Duration::from_secs(60 * 60 * 24 * 7 * 2);
    /// Three weeks.
    pub const UNBONDING_PERIOD: Duration = Duration::from_secs(60 * 60 * 24 * 7 * 3);
    /// Ten seconds.
    pub const MAX_CLOCK_DRIFT: Duration = Duration::from_secs(10);

    /// A valid Tendermint client state with SDK proof specs and the default upgrade path.
    #[must_use]
    pub fn tendermint_client_state(chain_id: &str, latest_height: Height) -> TendermintClientState {
        TendermintClientState {
            chain_id: chain_id.to_string(),
            trust_level: TrustThreshold::TWO_THIRDS,
            trusting_period: TRUSTING_PERIOD,
            unbonding_period: UNBONDING_PERIOD,
            max_clock_drift: MAX_CLOCK_DRIFT,
            latest_height,
            frozen_height: Height::ZERO,
            proof_specs: sdk_proof_specs(),
            upgrade_path: DEFAULT_UPGRADE_PATH.iter().map(ToString::to_string).collect(),
            allow_update_after_expiry: false,
            allow_update_after_misbehaviour: false,
        }
    }

    /// A Tendermint consensus state with the given timestamp.
    #[must_use]
    pub fn tendermint_consensus_state(timestamp: u64) -> TendermintConsensusState {
        TendermintConsensusState {
            timestamp,
            root: format!("root-{timestamp}").into_bytes(),
            next_validators_hash: b"next-validators".to_vec(),
        }
    }

    /// A solo machine consensus state.
    #[must_use]
    pub fn solomachine_consensus_state(timestamp: u64) -> SolomachineConsensusState {
        SolomachineConsensusState {
            public_key: vec![0x02; 33],
            diversifier: "solo".to_string(),
            timestamp,
        }
    }

    /// A valid, unfrozen solo machine client state at `sequence`.
    #[must_use]
    pub fn solomachine_client_state(sequence: u64) -> SolomachineClientState {
        SolomachineClientState {
            sequence,
            is_frozen: false,
            consensus_state: solomachine_consensus_state(GENESIS_TIME),
            allow_update_after_proposal: false,
        }
    }

    /// A localhost client state.
    #[must_use]
    pub fn localhost_client_state(chain_id: &str, latest_height: Height) -> LocalhostClientState {
        LocalhostClientState {
            chain_id: chain_id.to_string(),
            latest_height,
        }
    }
}
