//! Genesis import and export of the client registry.

use std::collections::{BTreeMap, BTreeSet};

use cosmwasm_std::Storage;
use serde::{Deserialize, Serialize};

use crate::{
    client_state::{AnyClientState, ClientType},
    consensus_state::AnyConsensusState,
    error::ClientError,
    height::Height,
    host::HostContext,
    identifier::{parse_client_identifier, validate_client_identifier, LOCALHOST_CLIENT_ID},
    keeper::{is_metadata_key, ClientKeeper},
};

/// A client state together with its identifier.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IdentifiedClientState {
    /// The client identifier
    pub client_id: String,
    /// The client state
    pub client_state: AnyClientState,
}

/// A consensus state together with the height it is stored at.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConsensusStateWithHeight {
    /// The height of the consensus state
    pub height: Height,
    /// The consensus state
    pub consensus_state: AnyConsensusState,
}

/// All consensus states of one client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClientConsensusStates {
    /// The client identifier
    pub client_id: String,
    /// The consensus states in ascending height order
    pub consensus_states: Vec<ConsensusStateWithHeight>,
}

/// A raw metadata entry, keyed relative to the client's key prefix.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GenesisMetadata {
    /// The key, relative to `clients/{client_id}/`
    #[serde(with = "hex::serde")]
    pub key: Vec<u8>,
    /// The value
    #[serde(with = "hex::serde")]
    pub value: Vec<u8>,
}

/// All metadata entries of one client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IdentifiedGenesisMetadata {
    /// The client identifier
    pub client_id: String,
    /// The metadata entries in ascending key order
    pub metadata: Vec<GenesisMetadata>,
}

/// Governance controlled parameters of the registry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Params {
    /// Client types that may be created
    pub allowed_clients: Vec<ClientType>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            allowed_clients: ClientType::ALL.to_vec(),
        }
    }
}

impl Params {
    /// Whether clients of `client_type` may be created.
    #[must_use]
    pub fn is_allowed(&self, client_type: ClientType) -> bool {
        self.allowed_clients.contains(&client_type)
    }

    /// Checks that no client type is listed twice.
    /// # Errors
    /// Returns [`ClientError::InvalidGenesis`] on a duplicate.
    pub fn validate(&self) -> Result<(), ClientError> {
        let mut seen = BTreeSet::new();
        match self
            .allowed_clients
            .iter()
            .find(|client_type| !seen.insert(**client_type))
        {
            Some(duplicate) => Err(ClientError::InvalidGenesis {
                reason: format!("client type {duplicate} is allowed twice"),
            }),
            None => Ok(()),
        }
    }
}

/// The exported state of the client registry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct GenesisState {
    /// All clients, sorted by identifier
    pub clients: Vec<IdentifiedClientState>,
    /// The consensus states of every client, sorted by identifier then height
    pub clients_consensus: Vec<ClientConsensusStates>,
    /// The metadata of every client, in client order
    pub clients_metadata: Vec<IdentifiedGenesisMetadata>,
    /// The registry parameters
    pub params: Params,
    /// Whether to create the loopback client at import
    pub create_localhost: bool,
    /// The sequence the next generated client identifier uses
    pub next_client_sequence: u64,
}

impl GenesisState {
    /// Stateless validation of the genesis state.
    /// # Errors
    /// Returns [`ClientError::InvalidGenesis`] or the validation error of an
    /// invalid client state.
    pub fn validate(&self) -> Result<(), ClientError> {
        let invalid = |reason: String| Err(ClientError::InvalidGenesis { reason });

        self.params.validate()?;

        let mut client_types = BTreeMap::new();
        for client in &self.clients {
            validate_client_identifier(&client.client_id)?;
            let client_type = client.client_state.client_type();
            if !self.params.is_allowed(client_type) {
                return invalid(format!(
                    "client {} has type {client_type}, which is not allowed",
                    client.client_id
                ));
            }
            if client.client_id == LOCALHOST_CLIENT_ID {
                if client_type != ClientType::Localhost {
                    return invalid(format!("client {LOCALHOST_CLIENT_ID} must be a localhost client"));
                }
                if self.create_localhost {
                    return invalid(format!(
                        "client {LOCALHOST_CLIENT_ID} is listed and create_localhost is set"
                    ));
                }
            } else {
                match parse_client_identifier(&client.client_id) {
                    Some((id_type, sequence)) if id_type == client_type => {
                        if sequence >= self.next_client_sequence {
                            return invalid(format!(
                                "client {} has a sequence at or above the next client sequence {}",
                                client.client_id, self.next_client_sequence
                            ));
                        }
                    }
                    _ => {
                        return invalid(format!(
                            "client id {} does not name a {client_type} client",
                            client.client_id
                        ))
                    }
                }
            }
            client.client_state.validate()?;
            if client_types
                .insert(client.client_id.as_str(), client_type)
                .is_some()
            {
                return invalid(format!("duplicate client {}", client.client_id));
            }
        }

        let mut seen_consensus = BTreeSet::new();
        for client_consensus in &self.clients_consensus {
            let Some(client_type) = client_types.get(client_consensus.client_id.as_str()) else {
                return invalid(format!(
                    "consensus states of unknown client {}",
                    client_consensus.client_id
                ));
            };
            if !seen_consensus.insert(client_consensus.client_id.as_str()) {
                return invalid(format!(
                    "consensus states of client {} are listed twice",
                    client_consensus.client_id
                ));
            }
            let mut heights = BTreeSet::new();
            for cs in &client_consensus.consensus_states {
                if cs.height.revision_height == 0 {
                    return invalid(format!(
                        "consensus state of client {} has a zero height",
                        client_consensus.client_id
                    ));
                }
                if cs.consensus_state.client_type() != *client_type {
                    return invalid(format!(
                        "consensus state of client {} at {} is not a {client_type} consensus state",
                        client_consensus.client_id, cs.height
                    ));
                }
                if !heights.insert(cs.height) {
                    return invalid(format!(
                        "client {} has two consensus states at {}",
                        client_consensus.client_id, cs.height
                    ));
                }
            }
        }

        for identified in &self.clients_metadata {
            if !client_types.contains_key(identified.client_id.as_str()) {
                return invalid(format!("metadata of unknown client {}", identified.client_id));
            }
            let mut previous: Option<&[u8]> = None;
            for metadata in &identified.metadata {
                if metadata.key.is_empty() || !is_metadata_key(&metadata.key) {
                    return invalid(format!(
                        "invalid metadata key {} of client {}",
                        hex::encode(&metadata.key),
                        identified.client_id
                    ));
                }
                // keys are exported in store order, so only ascending keys round trip
                if previous.is_some_and(|previous| previous >= metadata.key.as_slice()) {
                    return invalid(format!(
                        "metadata key {} of client {} is not strictly ascending",
                        hex::encode(&metadata.key),
                        identified.client_id
                    ));
                }
                previous = Some(metadata.key.as_slice());
            }
        }

        Ok(())
    }
}

/// Writes a validated genesis state into the store.
/// # Errors
/// Returns an error if the genesis state is invalid or a state cannot be encoded.
pub fn init_genesis<H: HostContext>(
    keeper: &ClientKeeper<H>,
    storage: &mut dyn Storage,
    genesis: &GenesisState,
) -> Result<(), ClientError> {
    genesis.validate()?;

    keeper.set_params(storage, &genesis.params)?;
    for client in &genesis.clients {
        keeper.set_client_state(storage, &client.client_id, &client.client_state)?;
    }
    for client_consensus in &genesis.clients_consensus {
        for cs in &client_consensus.consensus_states {
            keeper.set_client_consensus_state(
                storage,
                &client_consensus.client_id,
                cs.height,
                &cs.consensus_state,
            )?;
        }
    }
    keeper.set_all_client_metadata(storage, &genesis.clients_metadata);
    keeper.set_next_client_sequence(storage, genesis.next_client_sequence);

    if genesis.create_localhost {
        keeper.create_localhost_client(storage)?;
    }

    tracing::info!(
        clients = genesis.clients.len(),
        next_client_sequence = genesis.next_client_sequence,
        "initialized client registry from genesis"
    );
    Ok(())
}

/// Reads the registry's state out of the store. The result is canonically
/// sorted, so exporting, importing into an empty store and exporting again
/// yields the same value. The loopback client, if stored, is exported as a
/// regular client and `create_localhost` is always false.
/// # Errors
/// Returns an error if a stored state cannot be decoded.
pub fn export_genesis<H: HostContext>(
    keeper: &ClientKeeper<H>,
    storage: &dyn Storage,
) -> Result<GenesisState, ClientError> {
    let clients = keeper.get_all_genesis_clients(storage)?;
    let clients_metadata = keeper.get_all_client_metadata(storage, &clients);
    Ok(GenesisState {
        clients_consensus: keeper.get_all_consensus_states(storage)?,
        clients_metadata,
        clients,
        params: keeper.get_params(storage)?,
        create_localhost: false,
        next_client_sequence: keeper.get_next_client_sequence(storage)?,
    })
}
