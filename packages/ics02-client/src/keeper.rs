//! The client registry: deterministic storage of client states, per-height
//! consensus states and their metadata.

use cosmwasm_std::{Order, Storage};

use crate::{
    client_state::{AnyClientState, ClientType, LocalhostClientState, Status},
    codec::ClientCodec,
    config::{HostConfig, SelfConsensusPolicy},
    consensus_state::{AnyConsensusState, TendermintConsensusState},
    error::{ClientError, ErrorKind},
    genesis::{
        ClientConsensusStates, ConsensusStateWithHeight, GenesisMetadata, IdentifiedClientState,
        IdentifiedGenesisMetadata, Params,
    },
    height::Height,
    host::HostContext,
    identifier::{format_client_identifier, LOCALHOST_CLIENT_ID},
    store,
};

/// The client registry. It owns the host parameter providers, the static host
/// configuration and the codec table; the store is passed to every call.
#[derive(Clone, Debug)]
pub struct ClientKeeper<H> {
    host: H,
    config: HostConfig,
    codec: ClientCodec,
}

impl<H: HostContext> ClientKeeper<H> {
    /// Creates a keeper for the given host.
    #[must_use]
    pub fn new(host: H, config: HostConfig) -> Self {
        Self {
            host,
            config,
            codec: ClientCodec::new(),
        }
    }

    /// The host parameter providers.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host parameter providers.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The static host configuration.
    pub const fn config(&self) -> &HostConfig {
        &self.config
    }

    /// The codec table.
    pub const fn codec(&self) -> &ClientCodec {
        &self.codec
    }

    /// Stores the client state of `client_id`, replacing any previous one.
    /// # Errors
    /// Returns an error if the client state cannot be encoded.
    pub fn set_client_state(
        &self,
        storage: &mut dyn Storage,
        client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientError> {
        let bz = self.codec.encode_client_state(client_state)?;
        storage.set(&store::client_state_key(client_id), &bz);
        tracing::debug!(client_id, height = %client_state.latest_height(), "stored client state");
        Ok(())
    }

    /// Returns the client state of `client_id`, `None` if there is none.
    /// # Errors
    /// Returns an error if the stored client state cannot be decoded.
    pub fn get_client_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<Option<AnyClientState>, ClientError> {
        storage
            .get(&store::client_state_key(client_id))
            .map(|bz| self.codec.decode_client_state(&bz))
            .transpose()
    }

    /// Returns the client state of `client_id`.
    /// # Errors
    /// Returns [`ClientError::ClientStateNotFound`] if there is none, or a
    /// decoding error.
    pub fn client_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<AnyClientState, ClientError> {
        self.get_client_state(storage, client_id)?
            .ok_or_else(|| ClientError::ClientStateNotFound {
                client_id: client_id.to_string(),
            })
    }

    /// Stores the consensus state of `client_id` at `height`.
    /// # Errors
    /// Returns an error if the consensus state cannot be encoded.
    pub fn set_client_consensus_state(
        &self,
        storage: &mut dyn Storage,
        client_id: &str,
        height: Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        let bz = self.codec.encode_consensus_state(consensus_state)?;
        storage.set(&store::consensus_state_key(client_id, height), &bz);
        tracing::debug!(client_id, %height, "stored consensus state");
        Ok(())
    }

    /// Returns the consensus state of `client_id` at `height`, `None` if there is none.
    /// # Errors
    /// Returns an error if the stored consensus state cannot be decoded.
    pub fn get_client_consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Option<AnyConsensusState>, ClientError> {
        storage
            .get(&store::consensus_state_key(client_id, height))
            .map(|bz| self.codec.decode_consensus_state(&bz))
            .transpose()
    }

    /// Whether a consensus state of `client_id` exists at `height`.
    #[must_use]
    pub fn has_client_consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> bool {
        storage
            .get(&store::consensus_state_key(client_id, height))
            .is_some()
    }

    /// Returns the consensus state at the latest height of `client_id`.
    /// # Errors
    /// Returns [`ClientError::ClientStateNotFound`] if the client does not
    /// exist and [`ClientError::MissingLatestConsensusState`] if the client's
    /// latest height has no consensus state, which means the store is corrupt.
    pub fn get_latest_client_consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<AnyConsensusState, ClientError> {
        let height = self.client_state(storage, client_id)?.latest_height();
        self.get_client_consensus_state(storage, client_id, height)?
            .ok_or_else(|| ClientError::MissingLatestConsensusState {
                client_id: client_id.to_string(),
                height,
            })
    }

    /// Describes the host chain at `height` as a Tendermint consensus state,
    /// built from the host's historical info.
    /// # Errors
    /// Returns [`ClientError::SelfHeightOutOfRange`] if the height is zero, on
    /// another revision, above the current height, or equal to it under
    /// [`SelfConsensusPolicy::PrecedingOnly`]. Returns
    /// [`ClientError::SelfHistoryPruned`] if the historical info is gone.
    pub fn get_self_consensus_state(&self, height: Height) -> Result<AnyConsensusState, ClientError> {
        let current = self.host.self_height();
        let out_of_range = height.revision_height == 0
            || height.revision_number != current.revision_number
            || height.revision_height > current.revision_height
            || (self.config.self_consensus_policy == SelfConsensusPolicy::PrecedingOnly
                && height.revision_height == current.revision_height);
        if out_of_range {
            return Err(ClientError::SelfHeightOutOfRange { height, current });
        }

        let info = self
            .host
            .historical_info(height.revision_height)
            .ok_or(ClientError::SelfHistoryPruned { height })?;

        Ok(AnyConsensusState::Tendermint(TendermintConsensusState {
            timestamp: info.timestamp,
            root: info.app_hash,
            next_validators_hash: info.next_validators_hash,
        }))
    }

    /// Returns the identifiers of all stored clients in ascending byte order.
    /// # Errors
    /// Returns an error if a client key is not valid UTF-8.
    pub fn get_all_client_ids(&self, storage: &dyn Storage) -> Result<Vec<String>, ClientError> {
        let prefix = store::CLIENTS_PREFIX.as_bytes();
        let suffix = format!("/{}", store::CLIENT_STATE_KEY);

        let mut client_ids = store::prefix_keys(storage, prefix)
            .into_iter()
            .filter_map(|key| {
                let rest = key.get(prefix.len()..)?;
                let rest = rest.strip_suffix(suffix.as_bytes())?;
                // `clients/{id}/clientState` only; ids never contain '/'
                (!rest.contains(&b'/')).then(|| rest.to_vec())
            })
            .map(|client_id| {
                String::from_utf8(client_id).map_err(|err| ClientError::InvalidStoreKey {
                    reason: format!("client id is not utf-8: {err}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        client_ids.sort_unstable();
        client_ids.dedup();
        Ok(client_ids)
    }

    /// Returns every stored client, sorted by client id. The loopback client
    /// is included when it is stored; its id is fixed, so it appears at most once.
    /// # Errors
    /// Returns [`ClientError::UndecodableClientState`] naming the first client
    /// whose state cannot be decoded, such as one with an unregistered type URL.
    pub fn get_all_genesis_clients(
        &self,
        storage: &dyn Storage,
    ) -> Result<Vec<IdentifiedClientState>, ClientError> {
        let mut clients = self
            .get_all_client_ids(storage)?
            .into_iter()
            .map(|client_id| {
                let client_state = self.client_state(storage, &client_id).map_err(|err| {
                    match err.kind() {
                        ErrorKind::Codec => ClientError::UndecodableClientState {
                            client_id: client_id.clone(),
                            source: Box::new(err),
                        },
                        _ => err,
                    }
                })?;
                Ok(IdentifiedClientState {
                    client_id,
                    client_state,
                })
            })
            .collect::<Result<Vec<_>, ClientError>>()?;

        clients.sort_by(|a, b| a.client_id.as_bytes().cmp(b.client_id.as_bytes()));
        Ok(clients)
    }

    /// Returns the consensus states of `client_id` in ascending height order.
    /// # Errors
    /// Returns an error if a consensus state cannot be decoded.
    pub fn get_client_consensus_states(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<Vec<ConsensusStateWithHeight>, ClientError> {
        let mut consensus_states =
            store::height_records(storage, &store::consensus_states_prefix(client_id))
                .into_iter()
                .map(|(height, bz)| {
                    Ok(ConsensusStateWithHeight {
                        height,
                        consensus_state: self.codec.decode_consensus_state(&bz)?,
                    })
                })
                .collect::<Result<Vec<_>, ClientError>>()?;

        consensus_states.sort_by_key(|cs| cs.height);
        Ok(consensus_states)
    }

    /// Returns the consensus states of every client, sorted by client id and
    /// then by height. Clients without consensus states are omitted.
    /// # Errors
    /// Returns an error if a consensus state cannot be decoded.
    pub fn get_all_consensus_states(
        &self,
        storage: &dyn Storage,
    ) -> Result<Vec<ClientConsensusStates>, ClientError> {
        let mut all = Vec::new();
        for client_id in self.get_all_client_ids(storage)? {
            let consensus_states = self.get_client_consensus_states(storage, &client_id)?;
            if !consensus_states.is_empty() {
                all.push(ClientConsensusStates {
                    client_id,
                    consensus_states,
                });
            }
        }

        all.sort_by(|a, b| a.client_id.as_bytes().cmp(b.client_id.as_bytes()));
        Ok(all)
    }

    /// Writes the metadata of every listed client. Keys are relative to the
    /// client's key prefix.
    pub fn set_all_client_metadata(
        &self,
        storage: &mut dyn Storage,
        clients_metadata: &[IdentifiedGenesisMetadata],
    ) {
        for identified in clients_metadata {
            let prefix = store::client_prefix(&identified.client_id);
            for metadata in &identified.metadata {
                let mut key = prefix.clone();
                key.extend_from_slice(&metadata.key);
                storage.set(&key, &metadata.value);
            }
            tracing::debug!(
                client_id = %identified.client_id,
                entries = identified.metadata.len(),
                "stored client metadata"
            );
        }
    }

    /// Returns the metadata of the given clients, in the order given. Clients
    /// without metadata are omitted. Within a client, entries are in
    /// ascending key order.
    #[must_use]
    pub fn get_all_client_metadata(
        &self,
        storage: &dyn Storage,
        clients: &[IdentifiedClientState],
    ) -> Vec<IdentifiedGenesisMetadata> {
        clients
            .iter()
            .filter_map(|client| {
                let metadata: Vec<GenesisMetadata> =
                    store::prefix_records(storage, &store::client_prefix(&client.client_id))
                        .into_iter()
                        .filter(|(key, _)| is_metadata_key(key))
                        .map(|(key, value)| GenesisMetadata { key, value })
                        .collect();
                (!metadata.is_empty()).then(|| IdentifiedGenesisMetadata {
                    client_id: client.client_id.clone(),
                    metadata,
                })
            })
            .collect()
    }

    /// Returns the sequence number the next generated client id will use.
    /// # Errors
    /// Returns an error if the stored counter is malformed.
    pub fn get_next_client_sequence(&self, storage: &dyn Storage) -> Result<u64, ClientError> {
        let Some(bz) = storage.get(store::NEXT_CLIENT_SEQUENCE_KEY.as_bytes()) else {
            return Ok(0);
        };
        let bz: [u8; 8] = bz
            .as_slice()
            .try_into()
            .map_err(|_| ClientError::InvalidStoreKey {
                reason: "next client sequence must be 8 bytes".to_string(),
            })?;
        Ok(u64::from_be_bytes(bz))
    }

    /// Sets the sequence number the next generated client id will use.
    pub fn set_next_client_sequence(&self, storage: &mut dyn Storage, sequence: u64) {
        storage.set(
            store::NEXT_CLIENT_SEQUENCE_KEY.as_bytes(),
            &sequence.to_be_bytes(),
        );
    }

    /// Allocates the next client identifier for `client_type`.
    /// # Errors
    /// Returns an error if the stored counter is malformed or exhausted.
    pub fn generate_client_identifier(
        &self,
        storage: &mut dyn Storage,
        client_type: ClientType,
    ) -> Result<String, ClientError> {
        let sequence = self.get_next_client_sequence(storage)?;
        let next = sequence
            .checked_add(1)
            .ok_or(ClientError::ClientSequenceExhausted { sequence })?;
        self.set_next_client_sequence(storage, next);
        Ok(format_client_identifier(client_type, sequence))
    }

    /// Returns the module parameters, the defaults if none are stored.
    /// # Errors
    /// Returns an error if the stored parameters cannot be decoded.
    pub fn get_params(&self, storage: &dyn Storage) -> Result<Params, ClientError> {
        match storage.get(store::PARAMS_KEY.as_bytes()) {
            Some(bz) => Ok(serde_json::from_slice(&bz)?),
            None => Ok(Params::default()),
        }
    }

    /// Stores the module parameters.
    /// # Errors
    /// Returns an error if the parameters cannot be encoded.
    pub fn set_params(&self, storage: &mut dyn Storage, params: &Params) -> Result<(), ClientError> {
        storage.set(store::PARAMS_KEY.as_bytes(), &serde_json::to_vec(params)?);
        Ok(())
    }

    /// Creates a new client from its initial client and consensus state and
    /// returns the allocated identifier.
    ///
    /// Tendermint clients store the consensus state at their latest height.
    /// Solo machines keep their consensus state inside the client state, so
    /// the given one replaces the embedded one.
    /// # Errors
    /// Returns an error if the client type is not allowed, is the localhost
    /// type, if the states are invalid or do not belong together.
    pub fn create_client(
        &self,
        storage: &mut dyn Storage,
        client_state: &AnyClientState,
        consensus_state: &AnyConsensusState,
    ) -> Result<String, ClientError> {
        let client_type = client_state.client_type();
        if client_type == ClientType::Localhost
            || !self.get_params(storage)?.is_allowed(client_type)
        {
            return Err(ClientError::ClientTypeNotAllowed {
                client_type: client_type.to_string(),
            });
        }
        if consensus_state.client_type() != client_type {
            return Err(ClientError::ConsensusStateTypeMismatch {
                expected: client_type.to_string(),
                actual: consensus_state.client_type().to_string(),
            });
        }
        client_state.validate()?;

        let client_id = self.generate_client_identifier(storage, client_type)?;
        match (client_state, consensus_state) {
            (AnyClientState::Solomachine(solomachine), AnyConsensusState::Solomachine(cs)) => {
                cs.validate()?;
                let mut solomachine = solomachine.clone();
                solomachine.consensus_state = cs.clone();
                self.set_client_state(storage, &client_id, &solomachine.into())?;
            }
            _ => {
                let height = client_state.latest_height();
                self.set_client_state(storage, &client_id, client_state)?;
                self.set_client_consensus_state(storage, &client_id, height, consensus_state)?;
                self.set_consensus_metadata(storage, &client_id, height);
            }
        }

        tracing::info!(client_id, %client_type, "created client");
        Ok(client_id)
    }

    /// Records a verified update of `client_id` at `height`.
    ///
    /// The consensus state is written as a new record; existing records are
    /// never overwritten. The latest height only moves forward, so updates
    /// filling in older heights leave it untouched. For solo machines the
    /// height is the new sequence and must increase.
    /// # Errors
    /// Returns an error if the client is missing, frozen, a localhost client,
    /// if the consensus state belongs to another client type or if a record
    /// already exists at `height`.
    pub fn update_client(
        &self,
        storage: &mut dyn Storage,
        client_id: &str,
        height: Height,
        consensus_state: &AnyConsensusState,
    ) -> Result<(), ClientError> {
        let client_state = self.client_state(storage, client_id)?;
        if client_state.is_frozen() {
            return Err(ClientError::ClientIsFrozen {
                client_id: client_id.to_string(),
            });
        }
        if consensus_state.client_type() != client_state.client_type() {
            return Err(ClientError::ConsensusStateTypeMismatch {
                expected: client_state.client_type().to_string(),
                actual: consensus_state.client_type().to_string(),
            });
        }
        if height.revision_height == 0 {
            return Err(ClientError::InvalidClientState {
                reason: "update height cannot be zero".to_string(),
            });
        }

        match (client_state, consensus_state) {
            (AnyClientState::Solomachine(mut solomachine), AnyConsensusState::Solomachine(cs)) => {
                if height.revision_number != 0 || height.revision_height <= solomachine.sequence {
                    return Err(ClientError::InvalidClientState {
                        reason: format!(
                            "solo machine sequence must increase past {}",
                            solomachine.sequence
                        ),
                    });
                }
                cs.validate()?;
                solomachine.sequence = height.revision_height;
                solomachine.consensus_state = cs.clone();
                self.set_client_state(storage, client_id, &solomachine.into())?;
            }
            (client_state, _) => {
                if self.has_client_consensus_state(storage, client_id, height) {
                    return Err(ClientError::ConsensusStateExists {
                        client_id: client_id.to_string(),
                        height,
                    });
                }
                self.set_client_consensus_state(storage, client_id, height, consensus_state)?;
                self.set_consensus_metadata(storage, client_id, height);
                if height > client_state.latest_height() {
                    self.set_client_state(
                        storage,
                        client_id,
                        &client_state.with_latest_height(height),
                    )?;
                }
            }
        }

        tracing::info!(client_id, %height, "updated client");
        Ok(())
    }

    /// Freezes `client_id` at `frozen_height` after misbehaviour was proven.
    /// Freezing is terminal.
    /// # Errors
    /// Returns an error if the height is zero, the client is missing, already
    /// frozen, or the localhost client.
    pub fn freeze_client(
        &self,
        storage: &mut dyn Storage,
        client_id: &str,
        frozen_height: Height,
    ) -> Result<(), ClientError> {
        if frozen_height.is_zero() {
            return Err(ClientError::ZeroFrozenHeight);
        }
        let client_state = self.client_state(storage, client_id)?;
        if client_state.is_frozen() {
            return Err(ClientError::ClientIsFrozen {
                client_id: client_id.to_string(),
            });
        }
        if client_state.client_type() == ClientType::Localhost {
            return Err(ClientError::InvalidClientState {
                reason: "the localhost client cannot be frozen".to_string(),
            });
        }

        self.set_client_state(storage, client_id, &client_state.frozen_at(frozen_height))?;
        tracing::info!(client_id, %frozen_height, "froze client");
        Ok(())
    }

    /// Stores the loopback client at the host's current height.
    /// # Errors
    /// Returns an error if the localhost type is not allowed or the host
    /// height is zero.
    pub fn create_localhost_client(&self, storage: &mut dyn Storage) -> Result<(), ClientError> {
        if !self.get_params(storage)?.is_allowed(ClientType::Localhost) {
            return Err(ClientError::ClientTypeNotAllowed {
                client_type: ClientType::Localhost.to_string(),
            });
        }
        let client_state = AnyClientState::Localhost(LocalhostClientState {
            chain_id: self.host.chain_id().to_string(),
            latest_height: self.host.self_height(),
        });
        client_state.validate()?;
        self.set_client_state(storage, LOCALHOST_CLIENT_ID, &client_state)?;
        tracing::info!(height = %client_state.latest_height(), "created localhost client");
        Ok(())
    }

    /// Advances the loopback client to the host's current height.
    /// # Errors
    /// Returns an error if the loopback client does not exist.
    pub fn update_localhost_client(&self, storage: &mut dyn Storage) -> Result<(), ClientError> {
        let client_state = self.client_state(storage, LOCALHOST_CLIENT_ID)?;
        let height = self.host.self_height();
        if height > client_state.latest_height() {
            self.set_client_state(
                storage,
                LOCALHOST_CLIENT_ID,
                &client_state.with_latest_height(height),
            )?;
        }
        Ok(())
    }

    /// Returns the status of `client_id` relative to the host's block time.
    /// # Errors
    /// Returns an error if a stored state cannot be decoded.
    pub fn get_client_status(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<Status, ClientError> {
        let Some(client_state) = self.get_client_state(storage, client_id)? else {
            return Ok(Status::Unknown);
        };
        let latest_timestamp = self
            .get_client_consensus_state(storage, client_id, client_state.latest_height())?
            .map(|cs| cs.timestamp());
        Ok(client_state.status(latest_timestamp, self.host.block_time()))
    }

    /// Writes the processed time, processed height and iteration index
    /// entries of the consensus state of `client_id` at `height`, using the
    /// host's current time and height.
    pub fn set_consensus_metadata(&self, storage: &mut dyn Storage, client_id: &str, height: Height) {
        set_consensus_metadata(
            storage,
            client_id,
            height,
            self.host.block_time(),
            self.host.self_height(),
        );
    }

    /// Returns the host time at which the consensus state at `height` was processed.
    /// # Errors
    /// Returns an error if the stored processed time is malformed.
    pub fn get_processed_time(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Option<u64>, ClientError> {
        let Some(bz) = storage.get(&store::processed_time_key(client_id, height)) else {
            return Ok(None);
        };
        let bz: [u8; 8] = bz
            .as_slice()
            .try_into()
            .map_err(|_| ClientError::InvalidStoreKey {
                reason: format!("processed time of client {client_id} at {height} must be 8 bytes"),
            })?;
        Ok(Some(u64::from_be_bytes(bz)))
    }

    /// Returns the host height at which the consensus state at `height` was processed.
    /// # Errors
    /// Returns an error if the stored processed height is malformed.
    pub fn get_processed_height(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Option<Height>, ClientError> {
        storage
            .get(&store::processed_height_key(client_id, height))
            .map(|bz| Height::from_key_bytes(&bz))
            .transpose()
    }

    /// Returns the heights in the iteration index of `client_id`, ascending.
    #[must_use]
    pub fn iterate_consensus_heights(&self, storage: &dyn Storage, client_id: &str) -> Vec<Height> {
        store::height_records(storage, &store::iteration_prefix(client_id))
            .into_iter()
            .map(|(height, _)| height)
            .collect()
    }

    /// Returns the consensus state at the highest indexed height below `height`.
    /// # Errors
    /// Returns an error if the indexed consensus state is missing or cannot be decoded.
    pub fn get_previous_consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Option<AnyConsensusState>, ClientError> {
        let prefix = store::iteration_prefix(client_id);
        let target = store::iteration_key(client_id, height);
        let previous = storage
            .range(Some(prefix.as_slice()), Some(target.as_slice()), Order::Descending)
            .next();
        previous
            .map(|(_, consensus_key)| self.load_indexed(storage, client_id, &consensus_key))
            .transpose()
    }

    /// Returns the consensus state at the lowest indexed height above `height`.
    /// # Errors
    /// Returns an error if the indexed consensus state is missing or cannot be decoded.
    pub fn get_next_consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Option<AnyConsensusState>, ClientError> {
        let end = store::prefix_end(&store::iteration_prefix(client_id));
        let target = store::iteration_key(client_id, height);
        let next = storage
            .range(Some(target.as_slice()), end.as_deref(), Order::Ascending)
            .find(|(key, _)| key != &target);
        next.map(|(_, consensus_key)| self.load_indexed(storage, client_id, &consensus_key))
            .transpose()
    }

    fn load_indexed(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        consensus_key: &[u8],
    ) -> Result<AnyConsensusState, ClientError> {
        let bz = storage
            .get(consensus_key)
            .ok_or_else(|| ClientError::InvalidStoreKey {
                reason: format!(
                    "iteration index of client {client_id} points at a missing consensus state"
                ),
            })?;
        self.codec.decode_consensus_state(&bz)
    }
}

/// Writes the processed time, processed height and iteration index entries
/// of the consensus state of `client_id` at `height`.
pub fn set_consensus_metadata(
    storage: &mut dyn Storage,
    client_id: &str,
    height: Height,
    processed_time: u64,
    processed_height: Height,
) {
    storage.set(
        &store::processed_time_key(client_id, height),
        &processed_time.to_be_bytes(),
    );
    storage.set(
        &store::processed_height_key(client_id, height),
        &processed_height.to_key_bytes(),
    );
    storage.set(
        &store::iteration_key(client_id, height),
        &store::consensus_state_key(client_id, height),
    );
}

/// Removes the metadata entries of the consensus state of `client_id` at `height`.
pub fn remove_consensus_metadata(storage: &mut dyn Storage, client_id: &str, height: Height) {
    storage.remove(&store::processed_time_key(client_id, height));
    storage.remove(&store::processed_height_key(client_id, height));
    storage.remove(&store::iteration_key(client_id, height));
}

/// Whether a key relative to a client prefix holds metadata, i.e. is neither
/// the client state nor a consensus state.
#[must_use]
pub fn is_metadata_key(relative_key: &[u8]) -> bool {
    relative_key != store::CLIENT_STATE_KEY.as_bytes()
        && !relative_key.starts_with(store::CONSENSUS_STATES_KEY.as_bytes())
}
