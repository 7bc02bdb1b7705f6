use core::time::Duration;

use cosmwasm_std::testing::MockStorage;
use ibc_client_registry::{
    client_state::{TendermintClientState, TrustThreshold},
    config::{HostConfig, SelfConsensusPolicy},
    genesis::{
        export_genesis, init_genesis, GenesisMetadata, GenesisState, IdentifiedClientState,
        IdentifiedGenesisMetadata,
    },
    identifier::LOCALHOST_CLIENT_ID,
    test_utils::{fixtures, MockHost},
    AnyClientState, AnyConsensusState, ClientError, ClientKeeper, ClientType, ErrorKind, Height,
};
use rstest::rstest;

const HOST_CHAIN_ID: &str = "testchain-0";
const HOST_HEIGHT: u64 = 10;

fn keeper_with(policy: SelfConsensusPolicy) -> ClientKeeper<MockHost> {
    let config = HostConfig {
        self_consensus_policy: policy,
        ..HostConfig::default()
    };
    ClientKeeper::new(MockHost::new(HOST_CHAIN_ID, HOST_HEIGHT), config)
}

fn keeper() -> ClientKeeper<MockHost> {
    keeper_with(SelfConsensusPolicy::default())
}

fn tendermint(chain_id: &str, height: Height) -> AnyClientState {
    fixtures::tendermint_client_state(chain_id, height).into()
}

fn consensus(timestamp: u64) -> AnyConsensusState {
    fixtures::tendermint_consensus_state(timestamp).into()
}

#[rstest]
#[case::generated("07-tendermint-0")]
#[case::custom("my-client-a")]
#[case::localhost(LOCALHOST_CLIENT_ID)]
fn client_state_round_trips(#[case] client_id: &str) {
    let keeper = keeper();
    let mut storage = MockStorage::new();
    let client_state = tendermint("gaiahub-0", Height::new(0, 3));

    keeper
        .set_client_state(&mut storage, client_id, &client_state)
        .unwrap();

    assert_eq!(
        keeper.get_client_state(&storage, client_id).unwrap(),
        Some(client_state)
    );
}

#[test]
fn consensus_state_is_keyed_by_exact_height() {
    let keeper = keeper();
    let mut storage = MockStorage::new();
    let height = Height::new(2, 7);

    keeper
        .set_client_consensus_state(&mut storage, "07-tendermint-0", height, &consensus(5))
        .unwrap();

    assert_eq!(
        keeper
            .get_client_consensus_state(&storage, "07-tendermint-0", height)
            .unwrap(),
        Some(consensus(5))
    );
    for other in [Height::new(2, 6), Height::new(2, 8), Height::new(0, 7), Height::ZERO] {
        assert_eq!(
            keeper
                .get_client_consensus_state(&storage, "07-tendermint-0", other)
                .unwrap(),
            None
        );
    }
    assert_eq!(
        keeper
            .get_client_consensus_state(&storage, "07-tendermint-1", height)
            .unwrap(),
        None
    );
}

#[rstest]
#[case::zero(Height::ZERO, false)]
#[case::next(Height::new(0, HOST_HEIGHT + 1), false)]
#[case::preceding(Height::new(0, HOST_HEIGHT - 1), true)]
#[case::current(Height::new(0, HOST_HEIGHT), true)]
fn self_consensus_state_include_current(#[case] height: Height, #[case] ok: bool) {
    let keeper = keeper_with(SelfConsensusPolicy::IncludeCurrent);
    let result = keeper.get_self_consensus_state(height);
    assert_eq!(result.is_ok(), ok);
    if let Err(err) = result {
        assert_eq!(err.kind(), ErrorKind::HeightOutOfRange);
    }
}

#[rstest]
#[case::zero(Height::ZERO, false)]
#[case::next(Height::new(0, HOST_HEIGHT + 1), false)]
#[case::preceding(Height::new(0, HOST_HEIGHT - 1), true)]
#[case::current(Height::new(0, HOST_HEIGHT), false)]
fn self_consensus_state_preceding_only(#[case] height: Height, #[case] ok: bool) {
    let keeper = keeper_with(SelfConsensusPolicy::PrecedingOnly);
    assert_eq!(keeper.get_self_consensus_state(height).is_ok(), ok);
}

#[test]
fn self_consensus_state_after_history_pruning() {
    let mut keeper = keeper();
    keeper.host_mut().prune_historical_below(HOST_HEIGHT);

    let err = keeper
        .get_self_consensus_state(Height::new(0, HOST_HEIGHT - 1))
        .unwrap_err();
    assert!(matches!(err, ClientError::SelfHistoryPruned { .. }));

    let AnyConsensusState::Tendermint(current) = keeper
        .get_self_consensus_state(Height::new(0, HOST_HEIGHT))
        .unwrap()
    else {
        panic!("expected a tendermint consensus state");
    };
    assert_eq!(current.timestamp, keeper.host().block_time);
}

fn self_candidate() -> TendermintClientState {
    fixtures::tendermint_client_state(HOST_CHAIN_ID, Height::new(0, HOST_HEIGHT - 1))
}

#[test]
fn faithful_self_client_is_accepted() {
    keeper()
        .validate_self_client(&self_candidate().into())
        .unwrap();
}

#[rstest]
#[case::frozen(
    |cs: &mut TendermintClientState| cs.frozen_height = Height::new(0, 1),
    |e: &ClientError| matches!(e, ClientError::ClientFrozen { .. })
)]
#[case::chain_id(
    |cs: &mut TendermintClientState| cs.chain_id = "othertestchain-0".to_string(),
    |e: &ClientError| matches!(e, ClientError::ChainIdMismatch { .. })
)]
#[case::latest_height(
    |cs: &mut TendermintClientState| cs.latest_height = Height::new(0, HOST_HEIGHT),
    |e: &ClientError| matches!(e, ClientError::InvalidHeight { .. })
)]
#[case::proof_specs(
    |cs: &mut TendermintClientState| cs.proof_specs.truncate(1),
    |e: &ClientError| matches!(e, ClientError::InvalidProofSpecs)
)]
#[case::trust_level_zero(
    |cs: &mut TendermintClientState| cs.trust_level = TrustThreshold::new(0, 1),
    |e: &ClientError| matches!(e, ClientError::InvalidTrustLevel { .. })
)]
#[case::trust_level_one_third(
    |cs: &mut TendermintClientState| cs.trust_level = TrustThreshold::new(1, 3),
    |e: &ClientError| matches!(e, ClientError::InvalidTrustLevel { .. })
)]
#[case::unbonding_period(
    |cs: &mut TendermintClientState| cs.unbonding_period += Duration::from_secs(1),
    |e: &ClientError| matches!(e, ClientError::UnbondingPeriodMismatch { .. })
)]
#[case::trusting_period(
    |cs: &mut TendermintClientState| cs.trusting_period = fixtures::UNBONDING_PERIOD,
    |e: &ClientError| matches!(e, ClientError::InvalidTrustingPeriod { .. })
)]
#[case::upgrade_path(
    |cs: &mut TendermintClientState| cs.upgrade_path = vec!["bad".to_string()],
    |e: &ClientError| matches!(e, ClientError::InvalidUpgradePath { .. })
)]
fn self_client_single_field_mutations(
    #[case] mutate: fn(&mut TendermintClientState),
    #[case] expected: fn(&ClientError) -> bool,
) {
    let mut candidate = self_candidate();
    mutate(&mut candidate);
    let err = keeper()
        .validate_self_client(&candidate.into())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(expected(&err), "unexpected error: {err:?}");
}

#[test]
fn self_client_errors_follow_check_order() {
    let keeper = keeper();

    let mut candidate = self_candidate();
    candidate.latest_height = Height::new(0, HOST_HEIGHT);
    candidate.trust_level = TrustThreshold::new(1, 3);
    assert!(matches!(
        keeper.validate_self_client(&candidate.clone().into()),
        Err(ClientError::InvalidHeight { .. })
    ));

    candidate.latest_height = Height::new(0, 1);
    assert!(matches!(
        keeper.validate_self_client(&candidate.clone().into()),
        Err(ClientError::InvalidTrustLevel { .. })
    ));

    candidate.trust_level = TrustThreshold::TWO_THIRDS;
    candidate.unbonding_period += Duration::from_secs(1);
    candidate.upgrade_path = vec!["bad".to_string()];
    assert!(matches!(
        keeper.validate_self_client(&candidate.clone().into()),
        Err(ClientError::UnbondingPeriodMismatch { .. })
    ));

    candidate.unbonding_period = fixtures::UNBONDING_PERIOD;
    assert!(matches!(
        keeper.validate_self_client(&candidate.into()),
        Err(ClientError::InvalidUpgradePath { .. })
    ));
}

/// Builds a store with Tendermint clients on two chains, a solo machine and
/// the loopback client, then advances the host and updates the clients.
fn populated_store(keeper: &mut ClientKeeper<MockHost>) -> MockStorage {
    let mut storage = MockStorage::new();
    keeper.create_localhost_client(&mut storage).unwrap();

    let first = keeper
        .create_client(
            &mut storage,
            &tendermint("gaiahub-0", Height::new(0, 5)),
            &consensus(fixtures::GENESIS_TIME),
        )
        .unwrap();
    let solo = keeper
        .create_client(
            &mut storage,
            &fixtures::solomachine_client_state(1).into(),
            &fixtures::solomachine_consensus_state(fixtures::GENESIS_TIME).into(),
        )
        .unwrap();
    let second = keeper
        .create_client(
            &mut storage,
            &tendermint("osmosis-1", Height::new(1, 300)),
            &consensus(fixtures::GENESIS_TIME + 1),
        )
        .unwrap();

    keeper.host_mut().advance_block();
    keeper
        .update_client(&mut storage, &first, Height::new(0, 9), &consensus(9))
        .unwrap();
    keeper
        .update_client(&mut storage, &second, Height::new(1, 256), &consensus(256))
        .unwrap();
    keeper
        .update_client(
            &mut storage,
            &solo,
            Height::new(0, 2),
            &fixtures::solomachine_consensus_state(fixtures::GENESIS_TIME + 5).into(),
        )
        .unwrap();
    keeper.update_localhost_client(&mut storage).unwrap();
    storage
}

#[test]
fn genesis_clients_are_sorted_with_one_loopback_client() {
    let mut keeper = keeper();
    let storage = populated_store(&mut keeper);

    let clients = keeper.get_all_genesis_clients(&storage).unwrap();
    let ids: Vec<&str> = clients.iter().map(|c| c.client_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "06-solomachine-1",
            "07-tendermint-0",
            "07-tendermint-2",
            LOCALHOST_CLIENT_ID
        ]
    );
    assert_eq!(
        clients
            .iter()
            .filter(|c| c.client_state.client_type() == ClientType::Localhost)
            .count(),
        1
    );
}

#[test]
fn consensus_states_are_sorted_by_client_then_height() {
    let mut keeper = keeper();
    let storage = populated_store(&mut keeper);

    let all = keeper.get_all_consensus_states(&storage).unwrap();
    let summary: Vec<(&str, Vec<Height>)> = all
        .iter()
        .map(|c| {
            (
                c.client_id.as_str(),
                c.consensus_states.iter().map(|cs| cs.height).collect(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("07-tendermint-0", vec![Height::new(0, 5), Height::new(0, 9)]),
            (
                "07-tendermint-2",
                vec![Height::new(1, 256), Height::new(1, 300)]
            ),
        ]
    );
}

#[test]
fn genesis_export_import_export_is_a_fixed_point() {
    let mut keeper = keeper();
    let storage = populated_store(&mut keeper);
    let exported = export_genesis(&keeper, &storage).unwrap();
    assert_eq!(exported.next_client_sequence, 3);
    assert!(!exported.clients_metadata.is_empty());

    let mut imported = MockStorage::new();
    init_genesis(&keeper, &mut imported, &exported).unwrap();
    let reexported = export_genesis(&keeper, &imported).unwrap();

    assert_eq!(reexported, exported);
    assert_eq!(
        serde_json::to_vec(&reexported).unwrap(),
        serde_json::to_vec(&exported).unwrap()
    );
}

#[test]
fn client_metadata_round_trips_byte_for_byte() {
    let keeper = keeper();
    let mut storage = MockStorage::new();
    let genesis = GenesisState {
        clients: vec![IdentifiedClientState {
            client_id: "07-tendermint-0".to_string(),
            client_state: tendermint("gaiahub-0", Height::new(0, 1)),
        }],
        clients_metadata: vec![IdentifiedGenesisMetadata {
            client_id: "07-tendermint-0".to_string(),
            metadata: vec![
                GenesisMetadata {
                    key: b"a-custom-key".to_vec(),
                    value: vec![0x00, 0xff],
                },
                GenesisMetadata {
                    key: b"b-custom-key".to_vec(),
                    value: b"foo".to_vec(),
                },
            ],
        }],
        next_client_sequence: 1,
        ..GenesisState::default()
    };

    init_genesis(&keeper, &mut storage, &genesis).unwrap();

    assert_eq!(
        keeper.get_all_client_metadata(&storage, &genesis.clients),
        genesis.clients_metadata
    );
}
