//! Store key schema of the client registry.
//!
//! Every per-client record lives under `clients/{client_id}/`. Height scoped
//! records end in the fixed-width big-endian height, so a prefix scan yields
//! them in ascending height order.

use cosmwasm_std::{Order, Record, Storage};

use crate::height::{Height, HEIGHT_KEY_LEN};

/// Prefix of all per-client records.
pub const CLIENTS_PREFIX: &str = "clients/";
/// Suffix of the client state key.
pub const CLIENT_STATE_KEY: &str = "clientState";
/// Sub-prefix of consensus state keys.
pub const CONSENSUS_STATES_KEY: &str = "consensusStates/";
/// Sub-prefix of the processed time index.
pub const PROCESSED_TIME_KEY: &str = "processedTime/";
/// Sub-prefix of the processed height index.
pub const PROCESSED_HEIGHT_KEY: &str = "processedHeight/";
/// Sub-prefix of the consensus state iteration index.
pub const ITERATE_CONSENSUS_STATES_KEY: &str = "iterateConsensusStates/";
/// Key of the next client sequence counter.
pub const NEXT_CLIENT_SEQUENCE_KEY: &str = "nextClientSequence";
/// Key of the module parameters.
pub const PARAMS_KEY: &str = "params";

/// Prefix of all records of one client.
#[must_use]
pub fn client_prefix(client_id: &str) -> Vec<u8> {
    format!("{CLIENTS_PREFIX}{client_id}/").into_bytes()
}

/// Key of a client's state.
#[must_use]
pub fn client_state_key(client_id: &str) -> Vec<u8> {
    let mut key = client_prefix(client_id);
    key.extend_from_slice(CLIENT_STATE_KEY.as_bytes());
    key
}

/// Prefix of a client's consensus states.
#[must_use]
pub fn consensus_states_prefix(client_id: &str) -> Vec<u8> {
    let mut key = client_prefix(client_id);
    key.extend_from_slice(CONSENSUS_STATES_KEY.as_bytes());
    key
}

fn height_key(client_id: &str, sub_prefix: &str, height: Height) -> Vec<u8> {
    let mut key = client_prefix(client_id);
    key.extend_from_slice(sub_prefix.as_bytes());
    key.extend_from_slice(&height.to_key_bytes());
    key
}

/// Key of a client's consensus state at `height`.
#[must_use]
pub fn consensus_state_key(client_id: &str, height: Height) -> Vec<u8> {
    height_key(client_id, CONSENSUS_STATES_KEY, height)
}

/// Key of the host time at which a client's consensus state was stored.
#[must_use]
pub fn processed_time_key(client_id: &str, height: Height) -> Vec<u8> {
    height_key(client_id, PROCESSED_TIME_KEY, height)
}

/// Key of the host height at which a client's consensus state was stored.
#[must_use]
pub fn processed_height_key(client_id: &str, height: Height) -> Vec<u8> {
    height_key(client_id, PROCESSED_HEIGHT_KEY, height)
}

/// Prefix of a client's iteration index.
#[must_use]
pub fn iteration_prefix(client_id: &str) -> Vec<u8> {
    let mut key = client_prefix(client_id);
    key.extend_from_slice(ITERATE_CONSENSUS_STATES_KEY.as_bytes());
    key
}

/// Key of a client's iteration index entry at `height`. The entry's value is
/// the consensus state key.
#[must_use]
pub fn iteration_key(client_id: &str, height: Height) -> Vec<u8> {
    height_key(client_id, ITERATE_CONSENSUS_STATES_KEY, height)
}

/// Exclusive upper bound of a prefix range, `None` if the prefix is all `0xff`.
#[must_use]
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// Collects all records under `prefix` in ascending key order, with the
/// prefix stripped from the keys.
#[must_use]
pub fn prefix_records(storage: &dyn Storage, prefix: &[u8]) -> Vec<Record> {
    let end = prefix_end(prefix);
    storage
        .range(Some(prefix), end.as_deref(), Order::Ascending)
        .map(|(key, value)| (key[prefix.len()..].to_vec(), value))
        .collect()
}

/// Collects all keys under `prefix` in ascending order, unstripped.
#[must_use]
pub fn prefix_keys(storage: &dyn Storage, prefix: &[u8]) -> Vec<Vec<u8>> {
    let end = prefix_end(prefix);
    storage
        .range_keys(Some(prefix), end.as_deref(), Order::Ascending)
        .collect()
}

/// Collects the records under a height-scoped prefix whose remaining key is
/// exactly one encoded height, in ascending height order.
#[must_use]
pub fn height_records(storage: &dyn Storage, prefix: &[u8]) -> Vec<(Height, Vec<u8>)> {
    prefix_records(storage, prefix)
        .into_iter()
        .filter(|(suffix, _)| suffix.len() == HEIGHT_KEY_LEN)
        .filter_map(|(suffix, value)| Some((Height::from_key_bytes(&suffix).ok()?, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::testing::MockStorage;

    use super::*;

    #[test]
    fn prefix_end_increments_last_byte() {
        assert_eq!(prefix_end(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_end(&[0x01, 0xff]), Some(vec![0x02]));
        assert_eq!(prefix_end(&[0xff, 0xff]), None);
    }

    #[test]
    fn client_prefixes_do_not_overlap() {
        let mut storage = MockStorage::new();
        storage.set(&client_state_key("client-a"), b"a");
        storage.set(&client_state_key("client-a-1"), b"a1");

        let records = prefix_records(&storage, &client_prefix("client-a"));
        assert_eq!(records, vec![(CLIENT_STATE_KEY.as_bytes().to_vec(), b"a".to_vec())]);
    }

    #[test]
    fn height_records_are_height_ordered() {
        let mut storage = MockStorage::new();
        for height in [Height::new(1, 2), Height::new(0, 300), Height::new(0, 4)] {
            storage.set(&consensus_state_key("client-a", height), height.to_string().as_bytes());
        }
        // a legacy-style nested key under the same prefix is skipped
        let mut nested = consensus_state_key("client-a", Height::new(0, 4));
        nested.extend_from_slice(b"/processedTime");
        storage.set(&nested, b"t");

        let heights: Vec<Height> = height_records(&storage, &consensus_states_prefix("client-a"))
            .into_iter()
            .map(|(height, _)| height)
            .collect();
        assert_eq!(
            heights,
            vec![Height::new(0, 4), Height::new(0, 300), Height::new(1, 2)]
        );
    }
}
