//! Store migrations of the client registry, gated by the cw2 schema version.

pub mod v1;

use cosmwasm_std::{StdError, Storage};
use ibc_proto::google::protobuf::Any;
use prost::Message;

use crate::{
    client_state::{AnyClientState, TendermintClientState},
    error::ClientError,
    height::Height,
    host::HostContext,
    keeper::{remove_consensus_metadata, set_consensus_metadata, ClientKeeper},
    store,
};

/// The name the schema version is recorded under.
pub const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
/// Schema version 1: legacy processed time keys, solo machine v1.
pub const SCHEMA_V1: &str = "1.0.0";
/// Schema version 2: processed height and iteration indices, solo machine v2.
pub const SCHEMA_V2: &str = "2.0.0";

/// Returns the persisted schema version, `None` if none was ever recorded.
/// # Errors
/// Returns an error if the version record is malformed.
pub fn get_schema_version(storage: &dyn Storage) -> Result<Option<String>, ClientError> {
    match cw2::get_contract_version(storage) {
        Ok(info) => Ok(Some(info.version)),
        Err(StdError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Records the persisted schema version.
/// # Errors
/// Returns an error if the version record cannot be written.
pub fn set_schema_version(storage: &mut dyn Storage, version: &str) -> Result<(), ClientError> {
    Ok(cw2::set_contract_version(storage, CONTRACT_NAME, version)?)
}

/// Counts of what a migration changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Client states re-encoded into the current schema
    pub reencoded_clients: usize,
    /// Consensus states deleted
    pub pruned_consensus_states: usize,
    /// Consensus states whose indices were backfilled
    pub backfilled_consensus_states: usize,
}

/// Runs store migrations with exclusive access to the store.
#[derive(Debug)]
pub struct Migrator<'a, H> {
    keeper: &'a ClientKeeper<H>,
}

impl<'a, H: HostContext> Migrator<'a, H> {
    /// Creates a migrator over the keeper's host and codec.
    #[must_use]
    pub const fn new(keeper: &'a ClientKeeper<H>) -> Self {
        Self { keeper }
    }

    /// Migrates a schema version 1 store to version 2:
    ///
    /// - solo machine v1 client states are re-encoded as v2, client states
    ///   with unknown type URLs are left untouched;
    /// - all solo machine consensus states are deleted;
    /// - Tendermint consensus states whose `timestamp + trusting_period` lies
    ///   before the client's latest retained timestamp are deleted together
    ///   with their metadata;
    /// - every remaining Tendermint consensus state gets its processed time
    ///   moved to the v2 key, a processed height of the host's current height
    ///   and an iteration index entry.
    ///
    /// Clients left untouched stay undecodable for this registry, so a later
    /// [`export_genesis`](crate::genesis::export_genesis) fails with
    /// [`ClientError::UndecodableClientState`] naming the first of them.
    ///
    /// The store must not be used after a failed migration.
    /// # Errors
    /// Returns [`ClientError::MigrationFailed`] wrapping the first failure,
    /// including a persisted schema version other than [`SCHEMA_V1`].
    pub fn migrate_1_to_2(&self, storage: &mut dyn Storage) -> Result<MigrationSummary, ClientError> {
        self.run_1_to_2(storage)
            .map_err(|source| ClientError::MigrationFailed {
                from: SCHEMA_V1.to_string(),
                to: SCHEMA_V2.to_string(),
                source: Box::new(source),
            })
    }

    fn run_1_to_2(&self, storage: &mut dyn Storage) -> Result<MigrationSummary, ClientError> {
        let found = get_schema_version(storage)?;
        if found.as_deref() != Some(SCHEMA_V1) {
            return Err(ClientError::SchemaVersionMismatch {
                expected: SCHEMA_V1.to_string(),
                found: found.unwrap_or_else(|| "none".to_string()),
            });
        }

        let mut summary = MigrationSummary::default();
        for client_id in self.keeper.get_all_client_ids(storage)? {
            let Some(client_state) = self.load_client_state(storage, &client_id, &mut summary)?
            else {
                tracing::debug!(client_id, "left client with unknown type url unchanged");
                continue;
            };

            match client_state {
                AnyClientState::Solomachine(_) => {
                    summary.pruned_consensus_states +=
                        prune_all_consensus_states(storage, &client_id);
                }
                AnyClientState::Tendermint(client_state) => {
                    self.migrate_tendermint(storage, &client_id, &client_state, &mut summary)?;
                }
                AnyClientState::Localhost(_) => {}
            }
        }

        set_schema_version(storage, SCHEMA_V2)?;
        tracing::info!(
            reencoded_clients = summary.reencoded_clients,
            pruned_consensus_states = summary.pruned_consensus_states,
            backfilled_consensus_states = summary.backfilled_consensus_states,
            "migrated client registry from schema {SCHEMA_V1} to {SCHEMA_V2}"
        );
        Ok(summary)
    }

    /// Decodes a stored client state, re-encoding v1 solo machines on the way.
    /// Returns `None` for type URLs neither schema knows.
    fn load_client_state(
        &self,
        storage: &mut dyn Storage,
        client_id: &str,
        summary: &mut MigrationSummary,
    ) -> Result<Option<AnyClientState>, ClientError> {
        let bz = storage
            .get(&store::client_state_key(client_id))
            .ok_or_else(|| ClientError::ClientStateNotFound {
                client_id: client_id.to_string(),
            })?;
        let any = Any::decode(bz.as_slice())?;

        if any.type_url == v1::SOLOMACHINE_CLIENT_STATE_TYPE_URL {
            let client_state: AnyClientState =
                v1::upgrade_solomachine_client_state(&any.value)?.into();
            self.keeper
                .set_client_state(storage, client_id, &client_state)?;
            summary.reencoded_clients += 1;
            tracing::debug!(client_id, "re-encoded solo machine client state as v2");
            return Ok(Some(client_state));
        }

        if !self.keeper.codec().is_registered(&any.type_url) {
            return Ok(None);
        }
        self.keeper.codec().decode_client_state(&bz).map(Some)
    }

    fn migrate_tendermint(
        &self,
        storage: &mut dyn Storage,
        client_id: &str,
        client_state: &TendermintClientState,
        summary: &mut MigrationSummary,
    ) -> Result<(), ClientError> {
        let records = store::height_records(storage, &store::consensus_states_prefix(client_id))
            .into_iter()
            .map(|(height, bz)| {
                let consensus_state = self.keeper.codec().decode_consensus_state(&bz)?;
                Ok((height, consensus_state.timestamp()))
            })
            .collect::<Result<Vec<(Height, u64)>, ClientError>>()?;

        let Some(latest_timestamp) = records.iter().map(|(_, timestamp)| *timestamp).max() else {
            return Ok(());
        };
        let trusting_period = client_state.trusting_period.as_nanos();
        let processed_height = self.keeper.host().self_height();

        for (height, timestamp) in records {
            if u128::from(timestamp) + trusting_period < u128::from(latest_timestamp) {
                storage.remove(&store::consensus_state_key(client_id, height));
                storage.remove(&v1::processed_time_key(client_id, height));
                remove_consensus_metadata(storage, client_id, height);
                summary.pruned_consensus_states += 1;
                tracing::debug!(client_id, %height, "pruned expired consensus state");
                continue;
            }

            let legacy_key = v1::processed_time_key(client_id, height);
            let processed_time = match storage.get(&legacy_key) {
                Some(bz) => {
                    storage.remove(&legacy_key);
                    Some(decode_processed_time(&bz)?)
                }
                None => self.keeper.get_processed_time(storage, client_id, height)?,
            };
            set_consensus_metadata(
                storage,
                client_id,
                height,
                processed_time.unwrap_or_default(),
                processed_height,
            );
            summary.backfilled_consensus_states += 1;
        }

        Ok(())
    }
}

/// Deletes every key under a client's consensus state prefix, including the
/// legacy processed time entries nested there.
fn prune_all_consensus_states(storage: &mut dyn Storage, client_id: &str) -> usize {
    let keys = store::prefix_keys(storage, &store::consensus_states_prefix(client_id));
    let mut pruned = 0;
    for key in keys {
        if !key.ends_with(v1::PROCESSED_TIME_SUFFIX.as_bytes()) {
            pruned += 1;
        }
        storage.remove(&key);
    }
    if pruned > 0 {
        tracing::debug!(client_id, pruned, "pruned solo machine consensus states");
    }
    pruned
}

fn decode_processed_time(bz: &[u8]) -> Result<u64, ClientError> {
    let bz: [u8; 8] = bz.try_into().map_err(|_| ClientError::InvalidStoreKey {
        reason: "processed time must be 8 bytes".to_string(),
    })?;
    Ok(u64::from_be_bytes(bz))
}
