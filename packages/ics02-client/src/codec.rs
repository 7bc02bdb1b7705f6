//! Encoding of client and consensus states as protobuf `Any` envelopes.
//!
//! The envelope's `type_url` selects the light client model, the `value`
//! holds the JSON encoding of the model's state.

use std::collections::BTreeMap;

use ibc_proto::google::protobuf::Any;
use prost::Message;

use crate::{
    client_state::{AnyClientState, ClientType},
    consensus_state::AnyConsensusState,
    error::ClientError,
};

/// Type URL of the Tendermint client state.
pub const TENDERMINT_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.tendermint.v1.ClientState";
/// Type URL of the Tendermint consensus state.
pub const TENDERMINT_CONSENSUS_STATE_TYPE_URL: &str =
    "/ibc.lightclients.tendermint.v1.ConsensusState";
/// Type URL of the solo machine client state.
pub const SOLOMACHINE_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.solomachine.v2.ClientState";
/// Type URL of the solo machine consensus state.
pub const SOLOMACHINE_CONSENSUS_STATE_TYPE_URL: &str =
    "/ibc.lightclients.solomachine.v2.ConsensusState";
/// Type URL of the localhost client state.
pub const LOCALHOST_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.localhost.v1.ClientState";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Payload {
    ClientState(ClientType),
    ConsensusState(ClientType),
}

/// The table of registered state encodings, built once when the keeper is
/// constructed and read-only afterwards.
#[derive(Clone, Debug)]
pub struct ClientCodec {
    payloads: BTreeMap<&'static str, Payload>,
}

impl Default for ClientCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientCodec {
    /// Registers every supported light client model.
    #[must_use]
    pub fn new() -> Self {
        let payloads = ClientType::ALL
            .into_iter()
            .flat_map(|client_type| {
                let client_state = (
                    client_state_type_url(client_type),
                    Payload::ClientState(client_type),
                );
                let consensus_state = consensus_state_type_url(client_type)
                    .map(|type_url| (type_url, Payload::ConsensusState(client_type)));
                core::iter::once(client_state).chain(consensus_state)
            })
            .collect();

        Self { payloads }
    }

    /// Whether the type URL belongs to a registered state encoding.
    #[must_use]
    pub fn is_registered(&self, type_url: &str) -> bool {
        self.payloads.contains_key(type_url)
    }

    /// Encodes a client state.
    /// # Errors
    /// Returns an error if the state cannot be serialized.
    pub fn encode_client_state(&self, client_state: &AnyClientState) -> Result<Vec<u8>, ClientError> {
        let value = match client_state {
            AnyClientState::Tendermint(cs) => serde_json::to_vec(cs)?,
            AnyClientState::Solomachine(cs) => serde_json::to_vec(cs)?,
            AnyClientState::Localhost(cs) => serde_json::to_vec(cs)?,
        };
        Ok(encode_any(
            client_state_type_url(client_state.client_type()),
            value,
        ))
    }

    /// Decodes a client state.
    /// # Errors
    /// Returns an error if the bytes are not an `Any`, the type URL is not a
    /// registered client state or the value cannot be deserialized.
    pub fn decode_client_state(&self, bz: &[u8]) -> Result<AnyClientState, ClientError> {
        let any = Any::decode(bz)?;
        match self.payloads.get(any.type_url.as_str()) {
            Some(Payload::ClientState(ClientType::Tendermint)) => Ok(AnyClientState::Tendermint(
                serde_json::from_slice(&any.value)?,
            )),
            Some(Payload::ClientState(ClientType::Solomachine)) => Ok(
                AnyClientState::Solomachine(serde_json::from_slice(&any.value)?),
            ),
            Some(Payload::ClientState(ClientType::Localhost)) => Ok(AnyClientState::Localhost(
                serde_json::from_slice(&any.value)?,
            )),
            Some(Payload::ConsensusState(_)) | None => Err(ClientError::UnknownTypeUrl {
                type_url: any.type_url,
            }),
        }
    }

    /// Encodes a consensus state.
    /// # Errors
    /// Returns an error if the state cannot be serialized.
    pub fn encode_consensus_state(
        &self,
        consensus_state: &AnyConsensusState,
    ) -> Result<Vec<u8>, ClientError> {
        let (type_url, value) = match consensus_state {
            AnyConsensusState::Tendermint(cs) => {
                (TENDERMINT_CONSENSUS_STATE_TYPE_URL, serde_json::to_vec(cs)?)
            }
            AnyConsensusState::Solomachine(cs) => {
                (SOLOMACHINE_CONSENSUS_STATE_TYPE_URL, serde_json::to_vec(cs)?)
            }
        };
        Ok(encode_any(type_url, value))
    }

    /// Decodes a consensus state.
    /// # Errors
    /// Returns an error if the bytes are not an `Any`, the type URL is not a
    /// registered consensus state or the value cannot be deserialized.
    pub fn decode_consensus_state(&self, bz: &[u8]) -> Result<AnyConsensusState, ClientError> {
        let any = Any::decode(bz)?;
        match self.payloads.get(any.type_url.as_str()) {
            Some(Payload::ConsensusState(ClientType::Tendermint)) => Ok(
                AnyConsensusState::Tendermint(serde_json::from_slice(&any.value)?),
            ),
            Some(Payload::ConsensusState(ClientType::Solomachine)) => Ok(
                AnyConsensusState::Solomachine(serde_json::from_slice(&any.value)?),
            ),
            Some(Payload::ConsensusState(ClientType::Localhost) | Payload::ClientState(_))
            | None => Err(ClientError::UnknownTypeUrl {
                type_url: any.type_url,
            }),
        }
    }
}

/// The type URL of a client type's client state.
#[must_use]
pub const fn client_state_type_url(client_type: ClientType) -> &'static str {
    match client_type {
        ClientType::Tendermint => TENDERMINT_CLIENT_STATE_TYPE_URL,
        ClientType::Solomachine => SOLOMACHINE_CLIENT_STATE_TYPE_URL,
        ClientType::Localhost => LOCALHOST_CLIENT_STATE_TYPE_URL,
    }
}

/// The type URL of a client type's consensus state, if it has one.
#[must_use]
pub const fn consensus_state_type_url(client_type: ClientType) -> Option<&'static str> {
    match client_type {
        ClientType::Tendermint => Some(TENDERMINT_CONSENSUS_STATE_TYPE_URL),
        ClientType::Solomachine => Some(SOLOMACHINE_CONSENSUS_STATE_TYPE_URL),
        ClientType::Localhost => None,
    }
}

/// Wraps a value into a protobuf encoded `Any`.
#[must_use]
pub fn encode_any(type_url: &str, value: Vec<u8>) -> Vec<u8> {
    Any {
        type_url: type_url.to_string(),
        value,
    }
    .encode_to_vec()
}
