//! Validation of client states a counterparty proposes for this chain.

use crate::{
    client_state::{AnyClientState, ClientType},
    config::HostConfig,
    error::ClientError,
    host::HostContext,
    identifier::chain_id_revision,
    keeper::ClientKeeper,
};

/// Checks that `candidate` faithfully describes the host chain. Checks run in
/// a fixed order and the first failure is returned. Nothing is written.
/// # Errors
/// Returns the error of the first violated check:
/// [`ClientError::ClientTypeMismatch`], [`ClientError::ClientFrozen`],
/// [`ClientError::ChainIdMismatch`], [`ClientError::InvalidHeight`],
/// [`ClientError::InvalidProofSpecs`], [`ClientError::InvalidTrustLevel`],
/// [`ClientError::UnbondingPeriodMismatch`], [`ClientError::InvalidTrustingPeriod`]
/// or [`ClientError::InvalidUpgradePath`].
pub fn validate_self_client<H: HostContext>(
    host: &H,
    config: &HostConfig,
    candidate: &AnyClientState,
) -> Result<(), ClientError> {
    let AnyClientState::Tendermint(client_state) = candidate else {
        return Err(ClientError::ClientTypeMismatch {
            expected: ClientType::Tendermint.to_string(),
            actual: candidate.client_type().to_string(),
        });
    };

    if !client_state.frozen_height.is_zero() {
        return Err(ClientError::ClientFrozen {
            frozen_height: client_state.frozen_height,
        });
    }

    if client_state.chain_id != host.chain_id() {
        return Err(ClientError::ChainIdMismatch {
            expected: host.chain_id().to_string(),
            actual: client_state.chain_id.clone(),
        });
    }

    let revision = chain_id_revision(host.chain_id());
    let current = host.self_height();
    if client_state.latest_height.revision_number != revision
        || client_state.latest_height.revision_height >= current.revision_height
    {
        return Err(ClientError::InvalidHeight {
            height: client_state.latest_height,
            revision,
            current,
        });
    }

    if client_state.proof_specs.is_empty() || client_state.proof_specs != config.proof_specs {
        return Err(ClientError::InvalidProofSpecs);
    }

    client_state.trust_level.validate()?;

    let unbonding_period = host.unbonding_period();
    if client_state.unbonding_period != unbonding_period {
        return Err(ClientError::UnbondingPeriodMismatch {
            expected: unbonding_period,
            actual: client_state.unbonding_period,
        });
    }
    if client_state.trusting_period >= client_state.unbonding_period {
        return Err(ClientError::InvalidTrustingPeriod {
            trusting: client_state.trusting_period,
            unbonding: client_state.unbonding_period,
        });
    }

    // an empty path disables upgrades for this client
    if !client_state.upgrade_path.is_empty() && client_state.upgrade_path != config.upgrade_path {
        return Err(ClientError::InvalidUpgradePath {
            expected: config.upgrade_path.clone(),
            actual: client_state.upgrade_path.clone(),
        });
    }

    Ok(())
}

impl<H: HostContext> ClientKeeper<H> {
    /// Validates a candidate self client against the keeper's host and configuration.
    /// # Errors
    /// See [`validate_self_client`].
    pub fn validate_self_client(&self, candidate: &AnyClientState) -> Result<(), ClientError> {
        validate_self_client(self.host(), self.config(), candidate)
    }
}
