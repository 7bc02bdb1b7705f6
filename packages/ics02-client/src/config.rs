//! Static configuration of the client registry.

use ics23::ProofSpec;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Default upgrade path under which the host commits to upgraded clients.
pub const DEFAULT_UPGRADE_PATH: [&str; 2] = ["upgrade", "upgradedIBCState"];

/// Which self heights `get_self_consensus_state` describes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelfConsensusPolicy {
    /// Heights up to and including the current block height
    #[default]
    IncludeCurrent,
    /// Heights strictly below the current block height
    PrecedingOnly,
}

/// Configuration of the host chain that does not change between blocks.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Proof specs of the host's commitment store
    #[serde(
        with = "crate::serde_helpers::proof_specs_as_base64",
        default = "sdk_proof_specs"
    )]
    pub proof_specs: Vec<ProofSpec>,
    /// Upgrade path a self client must use, if it sets one
    #[serde(default = "default_upgrade_path")]
    pub upgrade_path: Vec<String>,
    /// Self consensus state policy
    #[serde(default)]
    pub self_consensus_policy: SelfConsensusPolicy,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            proof_specs: sdk_proof_specs(),
            upgrade_path: default_upgrade_path(),
            self_consensus_policy: SelfConsensusPolicy::default(),
        }
    }
}

impl HostConfig {
    /// Parses the configuration from JSON; missing fields take their defaults.
    /// # Errors
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The proof specs of a Cosmos SDK store: IAVL substores under a Tendermint
/// simple merkle root.
#[must_use]
pub fn sdk_proof_specs() -> Vec<ProofSpec> {
    vec![ics23::iavl_spec(), ics23::tendermint_spec()]
}

fn default_upgrade_path() -> Vec<String> {
    DEFAULT_UPGRADE_PATH.iter().map(ToString::to_string).collect()
}
