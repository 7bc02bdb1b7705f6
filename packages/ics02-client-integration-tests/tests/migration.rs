use core::time::Duration;

use cosmwasm_std::{testing::MockStorage, Storage};
use ibc_client_registry::{
    codec::encode_any,
    config::HostConfig,
    genesis::export_genesis,
    migrations::{get_schema_version, set_schema_version, v1, Migrator, SCHEMA_V1, SCHEMA_V2},
    store,
    test_utils::{fixtures, MockHost, NANOS_PER_SECOND},
    AnyClientState, AnyConsensusState, ClientError, ClientKeeper, ErrorKind, Height,
};

const TENDERMINT_ID: &str = "07-tendermint-0";
const SOLOMACHINE_ID: &str = "06-solomachine-1";
const WASM_ID: &str = "08-wasm-2";
const WASM_TYPE_URL: &str = "/ibc.lightclients.wasm.v1.ClientState";
const T: u64 = fixtures::GENESIS_TIME;

fn keeper() -> ClientKeeper<MockHost> {
    ClientKeeper::new(MockHost::new("testchain-0", 42), HostConfig::default())
}

/// A schema version 1 store: a Tendermint client with consensus states at
/// heights 1, 2 and 3 one second apart, a v1 solo machine with consensus
/// history, a client of an unknown model and the loopback client.
fn legacy_store(keeper: &ClientKeeper<MockHost>, trusting_period: Duration) -> MockStorage {
    let mut storage = MockStorage::new();
    set_schema_version(&mut storage, SCHEMA_V1).unwrap();

    let mut tendermint = fixtures::tendermint_client_state("gaiahub-0", Height::new(0, 3));
    tendermint.trusting_period = trusting_period;
    keeper
        .set_client_state(&mut storage, TENDERMINT_ID, &tendermint.into())
        .unwrap();
    for h in 1..=3 {
        let height = Height::new(0, h);
        let timestamp = T + (h - 1) * NANOS_PER_SECOND;
        keeper
            .set_client_consensus_state(
                &mut storage,
                TENDERMINT_ID,
                height,
                &fixtures::tendermint_consensus_state(timestamp).into(),
            )
            .unwrap();
        v1::set_processed_time(&mut storage, TENDERMINT_ID, height, timestamp + 100);
    }

    let solomachine = v1::SolomachineClientState {
        sequence: 3,
        frozen_sequence: 2,
        consensus_state: fixtures::solomachine_consensus_state(T),
        allow_update_after_proposal: false,
    };
    storage.set(
        &store::client_state_key(SOLOMACHINE_ID),
        &v1::encode_solomachine_client_state(&solomachine).unwrap(),
    );
    for h in 1..=2 {
        let height = Height::new(0, h);
        storage.set(
            &store::consensus_state_key(SOLOMACHINE_ID, height),
            &v1::encode_solomachine_consensus_state(&fixtures::solomachine_consensus_state(T + h))
                .unwrap(),
        );
        v1::set_processed_time(&mut storage, SOLOMACHINE_ID, height, T + h);
    }

    storage.set(
        &store::client_state_key(WASM_ID),
        &encode_any(WASM_TYPE_URL, b"opaque".to_vec()),
    );
    keeper.create_localhost_client(&mut storage).unwrap();
    storage
}

#[test]
fn migrates_a_legacy_store() {
    let keeper = keeper();
    let mut storage = legacy_store(&keeper, Duration::from_secs(1));
    let wasm_before = storage.get(&store::client_state_key(WASM_ID));

    let summary = Migrator::new(&keeper).migrate_1_to_2(&mut storage).unwrap();

    assert_eq!(summary.reencoded_clients, 1);
    assert_eq!(summary.pruned_consensus_states, 3);
    assert_eq!(summary.backfilled_consensus_states, 2);
    assert_eq!(get_schema_version(&storage).unwrap().as_deref(), Some(SCHEMA_V2));

    // height 1 fell out of the trusting period measured from T+2s
    let surviving = keeper.iterate_consensus_heights(&storage, TENDERMINT_ID);
    assert_eq!(surviving, vec![Height::new(0, 2), Height::new(0, 3)]);
    assert_eq!(
        keeper
            .get_client_consensus_state(&storage, TENDERMINT_ID, Height::new(0, 1))
            .unwrap(),
        None
    );
    let expected = [
        (Height::new(0, 2), T + NANOS_PER_SECOND),
        (Height::new(0, 3), T + 2 * NANOS_PER_SECOND),
    ];
    for (height, timestamp) in expected {
        assert_eq!(
            keeper
                .get_processed_time(&storage, TENDERMINT_ID, height)
                .unwrap(),
            Some(timestamp + 100)
        );
        assert_eq!(
            keeper
                .get_processed_height(&storage, TENDERMINT_ID, height)
                .unwrap(),
            Some(Height::new(0, 42))
        );
    }
    let latest: AnyConsensusState =
        fixtures::tendermint_consensus_state(T + 2 * NANOS_PER_SECOND).into();
    assert_eq!(
        keeper
            .get_latest_client_consensus_state(&storage, TENDERMINT_ID)
            .unwrap(),
        latest
    );

    let Some(AnyClientState::Solomachine(solomachine)) =
        keeper.get_client_state(&storage, SOLOMACHINE_ID).unwrap()
    else {
        panic!("expected a v2 solo machine client state");
    };
    assert_eq!(solomachine.sequence, 3);
    assert!(solomachine.is_frozen);
    assert!(
        store::prefix_keys(&storage, &store::consensus_states_prefix(SOLOMACHINE_ID)).is_empty()
    );

    assert_eq!(storage.get(&store::client_state_key(WASM_ID)), wasm_before);
    assert!(keeper
        .get_client_state(&storage, "09-localhost")
        .unwrap()
        .is_some());
}

#[test]
fn export_names_the_client_left_unmigrated() {
    let keeper = keeper();
    let mut storage = legacy_store(&keeper, Duration::from_secs(1));
    Migrator::new(&keeper).migrate_1_to_2(&mut storage).unwrap();

    let err = export_genesis(&keeper, &storage).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Codec);
    let ClientError::UndecodableClientState { client_id, source } = err else {
        panic!("expected an undecodable client state");
    };
    assert_eq!(client_id, WASM_ID);
    assert!(matches!(*source, ClientError::UnknownTypeUrl { .. }));
}

#[test]
fn boundary_record_survives() {
    let keeper = keeper();
    let mut storage = legacy_store(&keeper, Duration::from_secs(2));

    Migrator::new(&keeper).migrate_1_to_2(&mut storage).unwrap();

    assert_eq!(
        keeper.iterate_consensus_heights(&storage, TENDERMINT_ID),
        vec![Height::new(0, 1), Height::new(0, 2), Height::new(0, 3)]
    );
}

#[test]
fn migration_runs_once() {
    let keeper = keeper();
    let mut storage = legacy_store(&keeper, Duration::from_secs(1));
    Migrator::new(&keeper).migrate_1_to_2(&mut storage).unwrap();

    let err = Migrator::new(&keeper)
        .migrate_1_to_2(&mut storage)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MigrationFailed);
    assert!(matches!(err, ClientError::MigrationFailed { .. }));
}

#[test]
fn corrupt_records_abort_the_migration() {
    let keeper = keeper();
    let mut storage = legacy_store(&keeper, Duration::from_secs(1));
    storage.set(
        &store::consensus_state_key(TENDERMINT_ID, Height::new(0, 2)),
        b"not an any",
    );

    let err = Migrator::new(&keeper)
        .migrate_1_to_2(&mut storage)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MigrationFailed);
    assert_eq!(get_schema_version(&storage).unwrap().as_deref(), Some(SCHEMA_V1));
}
