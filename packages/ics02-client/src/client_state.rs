//! This module defines [`AnyClientState`] and the client states of the
//! supported light client models.

use core::fmt;
use core::time::Duration;

use ics23::ProofSpec;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationNanoSeconds};

use crate::{
    consensus_state::SolomachineConsensusState, error::ClientError, height::Height,
    identifier::chain_id_revision,
};

/// Maximum length of a Tendermint chain id.
pub const MAX_CHAIN_ID_LEN: usize = 50;

/// The client types known to the registry. Adding a light client model means
/// adding a variant here and to [`AnyClientState`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClientType {
    /// Tendermint light client
    #[serde(rename = "07-tendermint")]
    Tendermint,
    /// Solo machine (single signer) client
    #[serde(rename = "06-solomachine")]
    Solomachine,
    /// The loopback client representing the host chain itself
    #[serde(rename = "09-localhost")]
    Localhost,
}

impl ClientType {
    /// All client types, in identifier order.
    pub const ALL: [Self; 3] = [Self::Solomachine, Self::Tendermint, Self::Localhost];

    /// The client type string used as identifier prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tendermint => "07-tendermint",
            Self::Solomachine => "06-solomachine",
            Self::Localhost => "09-localhost",
        }
    }

    /// Parses a client type string.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|client_type| client_type.as_str() == s)
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status of a light client.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The client can be updated and used for verification
    Active,
    /// The client was frozen after misbehaviour
    Frozen,
    /// The client's latest consensus state is outside the trusting period
    Expired,
    /// The client does not exist
    Unknown,
}

/// A fraction of the validator set that must sign a header.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrustThreshold {
    /// The numerator
    pub numerator: u64,
    /// The denominator
    pub denominator: u64,
}

impl TrustThreshold {
    /// Two thirds of the validator set.
    pub const TWO_THIRDS: Self = Self::new(2, 3);

    /// Creates a new trust threshold.
    #[must_use]
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Checks that the fraction lies within (1/3, 1].
    /// # Errors
    /// Returns [`ClientError::InvalidTrustLevel`] otherwise.
    pub fn validate(&self) -> Result<(), ClientError> {
        let numerator = u128::from(self.numerator);
        let denominator = u128::from(self.denominator);
        if denominator == 0 || numerator * 3 <= denominator || numerator > denominator {
            return Err(ClientError::InvalidTrustLevel {
                numerator: self.numerator,
                denominator: self.denominator,
            });
        }
        Ok(())
    }
}

/// The Tendermint client state
#[serde_as]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TendermintClientState {
    /// The chain id of the counterparty
    pub chain_id: String,
    /// Fraction of the validator set required to trust a new header
    pub trust_level: TrustThreshold,
    /// Duration during which a consensus state can be trusted
    #[serde_as(as = "DurationNanoSeconds<u64>")]
    pub trusting_period: Duration,
    /// Unbonding period of the counterparty's staking module
    #[serde_as(as = "DurationNanoSeconds<u64>")]
    pub unbonding_period: Duration,
    /// Maximum tolerated clock drift of headers
    #[serde_as(as = "DurationNanoSeconds<u64>")]
    pub max_clock_drift: Duration,
    /// Latest height the client was updated to
    pub latest_height: Height,
    /// Height at which the client was frozen, zero if not frozen
    pub frozen_height: Height,
    /// Proof specs of the counterparty's commitment store
    #[serde(with = "crate::serde_helpers::proof_specs_as_base64")]
    pub proof_specs: Vec<ProofSpec>,
    /// Key path under which the counterparty commits to an upgraded client
    pub upgrade_path: Vec<String>,
    /// Whether the client may be updated after the trusting period expired
    pub allow_update_after_expiry: bool,
    /// Whether the client may be unfrozen by governance after misbehaviour
    pub allow_update_after_misbehaviour: bool,
}

impl TendermintClientState {
    /// Stateless validation of the client parameters.
    /// # Errors
    /// Returns an error describing the first invalid parameter.
    pub fn validate(&self) -> Result<(), ClientError> {
        let invalid = |reason: &str| {
            Err(ClientError::InvalidClientState {
                reason: reason.to_string(),
            })
        };

        if self.chain_id.trim().is_empty() {
            return invalid("chain id cannot be empty");
        }
        if self.chain_id.len() > MAX_CHAIN_ID_LEN {
            return invalid("chain id is too long");
        }
        self.trust_level.validate()?;
        if self.trusting_period.is_zero() {
            return invalid("trusting period must be positive");
        }
        if self.unbonding_period.is_zero() {
            return invalid("unbonding period must be positive");
        }
        if self.max_clock_drift.is_zero() {
            return invalid("max clock drift must be positive");
        }
        if self.trusting_period >= self.unbonding_period {
            return Err(ClientError::InvalidTrustingPeriod {
                trusting: self.trusting_period,
                unbonding: self.unbonding_period,
            });
        }
        if self.latest_height.revision_height == 0 {
            return invalid("latest revision height cannot be zero");
        }
        if self.latest_height.revision_number != chain_id_revision(&self.chain_id) {
            return invalid("latest revision number must match the chain id revision");
        }
        if self.proof_specs.is_empty() {
            return invalid("proof specs cannot be empty");
        }
        if self.upgrade_path.iter().any(|segment| segment.trim().is_empty()) {
            return invalid("upgrade path segments cannot be empty");
        }
        Ok(())
    }

    /// Returns the status given the timestamp of the latest consensus state.
    #[must_use]
    pub fn status(&self, latest_consensus_timestamp: Option<u64>, host_time: u64) -> Status {
        if !self.frozen_height.is_zero() {
            return Status::Frozen;
        }
        match latest_consensus_timestamp {
            Some(timestamp) if !is_expired(timestamp, self.trusting_period, host_time) => {
                Status::Active
            }
            _ => Status::Expired,
        }
    }
}

/// Returns true when `timestamp + trusting_period <= now`, all in nanoseconds.
#[must_use]
pub fn is_expired(timestamp: u64, trusting_period: Duration, now: u64) -> bool {
    u128::from(timestamp) + trusting_period.as_nanos() <= u128::from(now)
}

/// The solo machine client state (schema v2)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SolomachineClientState {
    /// Latest sequence signed by the solo machine
    pub sequence: u64,
    /// Whether the client is frozen
    pub is_frozen: bool,
    /// The public key and diversifier currently trusted
    pub consensus_state: SolomachineConsensusState,
    /// Whether governance may substitute the client
    pub allow_update_after_proposal: bool,
}

impl SolomachineClientState {
    /// Stateless validation of the client parameters.
    /// # Errors
    /// Returns an error if the sequence is zero or the consensus state is invalid.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.sequence == 0 {
            return Err(ClientError::InvalidClientState {
                reason: "sequence cannot be zero".to_string(),
            });
        }
        self.consensus_state.validate()
    }
}

/// The loopback client state: the host chain's trust in itself
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LocalhostClientState {
    /// The chain id of the host
    pub chain_id: String,
    /// The latest height of the host seen by the client
    pub latest_height: Height,
}

impl LocalhostClientState {
    /// Stateless validation of the client parameters.
    /// # Errors
    /// Returns an error if the chain id is empty or the height is zero.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.chain_id.trim().is_empty() {
            return Err(ClientError::InvalidClientState {
                reason: "chain id cannot be empty".to_string(),
            });
        }
        if self.latest_height.revision_height == 0 {
            return Err(ClientError::InvalidClientState {
                reason: "latest revision height cannot be zero".to_string(),
            });
        }
        Ok(())
    }
}

/// A client state of any supported light client model
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "client_type", content = "state")]
pub enum AnyClientState {
    /// Tendermint client state
    #[serde(rename = "07-tendermint")]
    Tendermint(TendermintClientState),
    /// Solo machine client state
    #[serde(rename = "06-solomachine")]
    Solomachine(SolomachineClientState),
    /// Localhost client state
    #[serde(rename = "09-localhost")]
    Localhost(LocalhostClientState),
}

impl AnyClientState {
    /// The client type of the variant.
    #[must_use]
    pub const fn client_type(&self) -> ClientType {
        match self {
            Self::Tendermint(_) => ClientType::Tendermint,
            Self::Solomachine(_) => ClientType::Solomachine,
            Self::Localhost(_) => ClientType::Localhost,
        }
    }

    /// The latest height of the client.
    #[must_use]
    pub const fn latest_height(&self) -> Height {
        match self {
            Self::Tendermint(client_state) => client_state.latest_height,
            Self::Solomachine(client_state) => Height::new(0, client_state.sequence),
            Self::Localhost(client_state) => client_state.latest_height,
        }
    }

    /// The frozen height of the client, zero if it is not frozen. Solo
    /// machines only record a frozen flag and report `0-1` when frozen.
    #[must_use]
    pub const fn frozen_height(&self) -> Height {
        match self {
            Self::Tendermint(client_state) => client_state.frozen_height,
            Self::Solomachine(client_state) if client_state.is_frozen => Height::new(0, 1),
            Self::Solomachine(_) | Self::Localhost(_) => Height::ZERO,
        }
    }

    /// Whether the client is frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        !self.frozen_height().is_zero()
    }

    /// Stateless validation of the client parameters.
    /// # Errors
    /// Returns the validation error of the variant.
    pub fn validate(&self) -> Result<(), ClientError> {
        match self {
            Self::Tendermint(client_state) => client_state.validate(),
            Self::Solomachine(client_state) => client_state.validate(),
            Self::Localhost(client_state) => client_state.validate(),
        }
    }

    /// The status of the client given its latest consensus timestamp and the
    /// host time, both in unix nanoseconds.
    #[must_use]
    pub fn status(&self, latest_consensus_timestamp: Option<u64>, host_time: u64) -> Status {
        match self {
            Self::Tendermint(client_state) => {
                client_state.status(latest_consensus_timestamp, host_time)
            }
            Self::Solomachine(client_state) if client_state.is_frozen => Status::Frozen,
            Self::Solomachine(_) | Self::Localhost(_) => Status::Active,
        }
    }

    /// Returns a copy with the latest height advanced to `height`. Solo
    /// machines track their sequence instead; the height is ignored for them.
    #[must_use]
    pub fn with_latest_height(&self, height: Height) -> Self {
        let mut client_state = self.clone();
        match &mut client_state {
            Self::Tendermint(tm) => tm.latest_height = height,
            Self::Localhost(localhost) => localhost.latest_height = height,
            Self::Solomachine(_) => {}
        }
        client_state
    }

    /// Returns a copy frozen at `height`.
    #[must_use]
    pub fn frozen_at(&self, height: Height) -> Self {
        let mut client_state = self.clone();
        match &mut client_state {
            Self::Tendermint(tm) => tm.frozen_height = height,
            Self::Solomachine(solomachine) => solomachine.is_frozen = true,
            Self::Localhost(_) => {}
        }
        client_state
    }
}

impl From<TendermintClientState> for AnyClientState {
    fn from(client_state: TendermintClientState) -> Self {
        Self::Tendermint(client_state)
    }
}

impl From<SolomachineClientState> for AnyClientState {
    fn from(client_state: SolomachineClientState) -> Self {
        Self::Solomachine(client_state)
    }
}

impl From<LocalhostClientState> for AnyClientState {
    fn from(client_state: LocalhostClientState) -> Self {
        Self::Localhost(client_state)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_utils::fixtures;

    #[rstest]
    #[case::two_thirds(2, 3, true)]
    #[case::one(1, 1, true)]
    #[case::just_above_a_third(334, 1000, true)]
    #[case::one_third(1, 3, false)]
    #[case::zero(0, 1, false)]
    #[case::above_one(4, 3, false)]
    #[case::zero_denominator(1, 0, false)]
    fn trust_threshold_bounds(#[case] numerator: u64, #[case] denominator: u64, #[case] ok: bool) {
        assert_eq!(TrustThreshold::new(numerator, denominator).validate().is_ok(), ok);
    }

    #[test]
    fn tendermint_validate_accepts_fixture() {
        fixtures::tendermint_client_state("testchain-1", Height::new(1, 10))
            .validate()
            .unwrap();
    }

    #[test]
    fn tendermint_validate_rejects_bad_parameters() {
        let base = fixtures::tendermint_client_state("testchain-1", Height::new(1, 10));

        let mut cs = base.clone();
        cs.chain_id = String::new();
        assert!(matches!(cs.validate(), Err(ClientError::InvalidClientState { .. })));

        let mut cs = base.clone();
        cs.trusting_period = cs.unbonding_period;
        assert!(matches!(cs.validate(), Err(ClientError::InvalidTrustingPeriod { .. })));

        let mut cs = base.clone();
        cs.proof_specs.clear();
        assert!(matches!(cs.validate(), Err(ClientError::InvalidClientState { .. })));

        let mut cs = base.clone();
        cs.latest_height = Height::new(2, 10);
        assert!(matches!(cs.validate(), Err(ClientError::InvalidClientState { .. })));

        let mut cs = base;
        cs.upgrade_path = vec!["upgrade".to_string(), " ".to_string()];
        assert!(matches!(cs.validate(), Err(ClientError::InvalidClientState { .. })));
    }

    #[test]
    fn tendermint_status() {
        let mut cs = fixtures::tendermint_client_state("testchain-1", Height::new(1, 10));
        cs.trusting_period = Duration::from_secs(10);
        let ts = 1_000_000_000;

        assert_eq!(cs.status(Some(ts), ts + 9_999_999_999), Status::Active);
        assert_eq!(cs.status(Some(ts), ts + 10_000_000_000), Status::Expired);
        assert_eq!(cs.status(None, ts), Status::Expired);

        cs.frozen_height = Height::new(1, 5);
        assert_eq!(cs.status(Some(ts), ts), Status::Frozen);
    }

    #[test]
    fn solomachine_height_and_freeze() {
        let cs = AnyClientState::Solomachine(fixtures::solomachine_client_state(7));
        assert_eq!(cs.latest_height(), Height::new(0, 7));
        assert!(!cs.is_frozen());

        let frozen = cs.frozen_at(Height::new(0, 7));
        assert!(frozen.is_frozen());
        assert_eq!(frozen.status(None, 0), Status::Frozen);
    }

    #[test]
    fn client_type_strings() {
        for client_type in ClientType::ALL {
            assert_eq!(ClientType::from_str_opt(client_type.as_str()), Some(client_type));
        }
        assert_eq!(ClientType::from_str_opt("08-wasm"), None);
    }

    #[test]
    fn any_client_state_json_is_tagged() {
        let cs: AnyClientState =
            fixtures::tendermint_client_state("testchain-1", Height::new(1, 10)).into();
        let json = serde_json::to_value(&cs).unwrap();
        assert_eq!(json["client_type"], "07-tendermint");
        assert_eq!(serde_json::from_value::<AnyClientState>(json).unwrap(), cs);
    }
}
