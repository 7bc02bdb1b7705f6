//! This module defines [`AnyConsensusState`].

use serde::{Deserialize, Serialize};

use crate::{client_state::ClientType, error::ClientError};

/// The Tendermint consensus state: a snapshot of the counterparty at one height
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TendermintConsensusState {
    /// Block time of the snapshot in unix nanoseconds
    pub timestamp: u64,
    /// Commitment root (app hash) of the counterparty state
    #[serde(with = "hex::serde")]
    pub root: Vec<u8>,
    /// Hash of the next validator set
    #[serde(with = "hex::serde")]
    pub next_validators_hash: Vec<u8>,
}

/// The solo machine consensus state
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SolomachineConsensusState {
    /// Public key of the solo machine
    #[serde(with = "hex::serde")]
    pub public_key: Vec<u8>,
    /// Diversifier distinguishing solo machines sharing a key
    pub diversifier: String,
    /// Unix nanoseconds at which the key was set
    pub timestamp: u64,
}

impl SolomachineConsensusState {
    /// Stateless validation of the consensus state.
    /// # Errors
    /// Returns an error if the timestamp is zero, the diversifier is blank or the key is empty.
    pub fn validate(&self) -> Result<(), ClientError> {
        let invalid = |reason: &str| ClientError::InvalidClientState {
            reason: reason.to_string(),
        };

        if self.timestamp == 0 {
            return Err(invalid("solo machine timestamp cannot be zero"));
        }
        if !self.diversifier.is_empty() && self.diversifier.trim().is_empty() {
            return Err(invalid("solo machine diversifier cannot be blank"));
        }
        if self.public_key.is_empty() {
            return Err(invalid("solo machine public key cannot be empty"));
        }
        Ok(())
    }
}

/// A consensus state of any supported light client model
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "client_type", content = "state")]
pub enum AnyConsensusState {
    /// Tendermint consensus state
    #[serde(rename = "07-tendermint")]
    Tendermint(TendermintConsensusState),
    /// Solo machine consensus state
    #[serde(rename = "06-solomachine")]
    Solomachine(SolomachineConsensusState),
}

impl AnyConsensusState {
    /// The client type the consensus state belongs to.
    #[must_use]
    pub const fn client_type(&self) -> ClientType {
        match self {
            Self::Tendermint(_) => ClientType::Tendermint,
            Self::Solomachine(_) => ClientType::Solomachine,
        }
    }

    /// The timestamp of the consensus state in unix nanoseconds.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        match self {
            Self::Tendermint(consensus_state) => consensus_state.timestamp,
            Self::Solomachine(consensus_state) => consensus_state.timestamp,
        }
    }
}

impl From<TendermintConsensusState> for AnyConsensusState {
    fn from(consensus_state: TendermintConsensusState) -> Self {
        Self::Tendermint(consensus_state)
    }
}

impl From<SolomachineConsensusState> for AnyConsensusState {
    fn from(consensus_state: SolomachineConsensusState) -> Self {
        Self::Solomachine(consensus_state)
    }
}
