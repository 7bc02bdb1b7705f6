//! The schema version 1 layout, kept only to read stores written before the
//! 1 to 2 migration.

use cosmwasm_std::Storage;
use serde::{Deserialize, Serialize};

use crate::{
    client_state::SolomachineClientState as SolomachineClientStateV2, codec::encode_any,
    consensus_state::SolomachineConsensusState, error::ClientError, height::Height, store,
};

/// Type URL of the v1 solo machine client state.
pub const SOLOMACHINE_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.solomachine.v1.ClientState";
/// Type URL of the v1 solo machine consensus state.
pub const SOLOMACHINE_CONSENSUS_STATE_TYPE_URL: &str =
    "/ibc.lightclients.solomachine.v1.ConsensusState";
/// Suffix of the v1 processed time key, nested under the consensus state key.
pub const PROCESSED_TIME_SUFFIX: &str = "/processedTime";

/// The v1 solo machine client state. A non-zero `frozen_sequence` means frozen.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SolomachineClientState {
    /// Latest sequence signed by the solo machine
    pub sequence: u64,
    /// Sequence at which the client was frozen, zero if not frozen
    pub frozen_sequence: u64,
    /// The public key and diversifier currently trusted
    pub consensus_state: SolomachineConsensusState,
    /// Whether governance may substitute the client
    pub allow_update_after_proposal: bool,
}

impl From<SolomachineClientState> for SolomachineClientStateV2 {
    fn from(legacy: SolomachineClientState) -> Self {
        Self {
            sequence: legacy.sequence,
            is_frozen: legacy.frozen_sequence != 0,
            consensus_state: legacy.consensus_state,
            allow_update_after_proposal: legacy.allow_update_after_proposal,
        }
    }
}

/// Encodes a v1 solo machine client state the way schema version 1 stored it.
/// # Errors
/// Returns an error if the state cannot be serialized.
pub fn encode_solomachine_client_state(
    client_state: &SolomachineClientState,
) -> Result<Vec<u8>, ClientError> {
    Ok(encode_any(
        SOLOMACHINE_CLIENT_STATE_TYPE_URL,
        serde_json::to_vec(client_state)?,
    ))
}

/// Encodes a v1 solo machine consensus state the way schema version 1 stored it.
/// # Errors
/// Returns an error if the state cannot be serialized.
pub fn encode_solomachine_consensus_state(
    consensus_state: &SolomachineConsensusState,
) -> Result<Vec<u8>, ClientError> {
    Ok(encode_any(
        SOLOMACHINE_CONSENSUS_STATE_TYPE_URL,
        serde_json::to_vec(consensus_state)?,
    ))
}

/// Decodes the JSON body of a v1 solo machine client state and upgrades it.
/// # Errors
/// Returns an error if the body is malformed.
pub fn upgrade_solomachine_client_state(
    value: &[u8],
) -> Result<SolomachineClientStateV2, ClientError> {
    let legacy: SolomachineClientState = serde_json::from_slice(value)?;
    Ok(legacy.into())
}

/// Key of the v1 processed time of a client's consensus state at `height`.
#[must_use]
pub fn processed_time_key(client_id: &str, height: Height) -> Vec<u8> {
    let mut key = store::consensus_state_key(client_id, height);
    key.extend_from_slice(PROCESSED_TIME_SUFFIX.as_bytes());
    key
}

/// Writes a v1 processed time entry.
pub fn set_processed_time(storage: &mut dyn Storage, client_id: &str, height: Height, time: u64) {
    storage.set(&processed_time_key(client_id, height), &time.to_be_bytes());
}
