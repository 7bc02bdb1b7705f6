//! Defines the [`ClientError`] type.

use core::time::Duration;

use cosmwasm_std::StdError;
use thiserror::Error;

use crate::height::Height;

/// Coarse classification of a [`ClientError`], used by callers to decide how
/// to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A record is absent for a syntactically valid key; the caller decides the fallback
    NotFound,
    /// The input was rejected; the originating request must be rejected too
    InvalidArgument,
    /// A self height was zero, in the future, or on another revision
    HeightOutOfRange,
    /// The store violates a registry invariant; processing of the client must halt
    Corruption,
    /// The store migration failed; the upgrade must abort
    MigrationFailed,
    /// Stored bytes could not be decoded or encoded
    Codec,
    /// The store layer reported an error
    Store,
}

/// Error types returned by the client registry
#[derive(Error, Debug)]
pub enum ClientError {
    /// Standard `CosmWasm` error, surfaced by the store layer
    #[error("{0}")]
    Std(#[from] StdError),

    /// Client state not found
    #[error("client state not found for client {client_id}")]
    ClientStateNotFound {
        /// The client identifier
        client_id: String,
    },

    /// The client sequence counter cannot be advanced any further
    #[error("client sequence {sequence} is exhausted")]
    ClientSequenceExhausted {
        /// The sequence that could not be incremented
        sequence: u64,
    },

    /// The client state points at a latest height with no consensus state
    #[error("client {client_id} has no consensus state at its latest height {height}")]
    MissingLatestConsensusState {
        /// The client identifier
        client_id: String,
        /// The latest height recorded in the client state
        height: Height,
    },

    /// The requested self height is zero, in the future or on another revision
    #[error("self height {height} out of range (current height {current})")]
    SelfHeightOutOfRange {
        /// The requested height
        height: Height,
        /// The current height of the host chain
        current: Height,
    },

    /// The host no longer retains historical info for the requested height
    #[error("historical info for self height {height} has been pruned")]
    SelfHistoryPruned {
        /// The requested height
        height: Height,
    },

    /// The candidate self client is not of the self client type
    #[error("client type mismatch: expected {expected}, got {actual}")]
    ClientTypeMismatch {
        /// The required client type
        expected: String,
        /// The client type of the candidate
        actual: String,
    },

    /// The candidate self client is frozen
    #[error("client is frozen at height {frozen_height}")]
    ClientFrozen {
        /// The frozen height of the candidate
        frozen_height: Height,
    },

    /// The candidate self client tracks another chain
    #[error("chain id mismatch: expected {expected}, got {actual}")]
    ChainIdMismatch {
        /// The local chain id
        expected: String,
        /// The chain id of the candidate
        actual: String,
    },

    /// The candidate self client's latest height is not a past local height
    #[error("invalid client height {height}: must be on revision {revision} and below {current}")]
    InvalidHeight {
        /// The latest height of the candidate
        height: Height,
        /// The local revision number
        revision: u64,
        /// The current local height
        current: Height,
    },

    /// The candidate self client's proof specs do not match the local store's
    #[error("proof specs do not match the proof specs of the local store")]
    InvalidProofSpecs,

    /// The trust level is outside of (1/3, 1]
    #[error("trust level {numerator}/{denominator} must be within (1/3, 1]")]
    InvalidTrustLevel {
        /// Numerator of the trust level
        numerator: u64,
        /// Denominator of the trust level
        denominator: u64,
    },

    /// The unbonding period does not equal the local staking unbonding period
    #[error("unbonding period mismatch: expected {expected:?}, got {actual:?}")]
    UnbondingPeriodMismatch {
        /// The local unbonding period
        expected: Duration,
        /// The unbonding period of the candidate
        actual: Duration,
    },

    /// The trusting period is not strictly below the unbonding period
    #[error("trusting period {trusting:?} must be less than unbonding period {unbonding:?}")]
    InvalidTrustingPeriod {
        /// The trusting period
        trusting: Duration,
        /// The unbonding period
        unbonding: Duration,
    },

    /// The upgrade path does not equal the configured upgrade path
    #[error("upgrade path mismatch: expected {expected:?}, got {actual:?}")]
    InvalidUpgradePath {
        /// The configured upgrade path
        expected: Vec<String>,
        /// The upgrade path of the candidate
        actual: Vec<String>,
    },

    /// A client state failed its stateless validation
    #[error("invalid client state: {reason}")]
    InvalidClientState {
        /// Reason for error
        reason: String,
    },

    /// A client or consensus state variant does not match the client's type
    #[error("consensus state of type {actual} cannot be stored for a {expected} client")]
    ConsensusStateTypeMismatch {
        /// The client type of the client
        expected: String,
        /// The client type the consensus state belongs to
        actual: String,
    },

    /// The client identifier is malformed
    #[error("invalid client identifier {client_id}: {reason}")]
    InvalidClientIdentifier {
        /// The client identifier
        client_id: String,
        /// Reason for error
        reason: String,
    },

    /// The client type is not in the allowed clients parameter
    #[error("client type {client_type} is not allowed")]
    ClientTypeNotAllowed {
        /// The rejected client type
        client_type: String,
    },

    /// An update targeted a frozen client
    #[error("client {client_id} is frozen")]
    ClientIsFrozen {
        /// The client identifier
        client_id: String,
    },

    /// A consensus state already exists at the height; records are never overwritten
    #[error("consensus state already exists for client {client_id} at height {height}")]
    ConsensusStateExists {
        /// The client identifier
        client_id: String,
        /// The height of the existing record
        height: Height,
    },

    /// A freeze was requested with the zero height
    #[error("frozen height must be non-zero")]
    ZeroFrozenHeight,

    /// The height string is malformed
    #[error("invalid height {height}: expected `{{revision_number}}-{{revision_height}}`")]
    InvalidHeightFormat {
        /// The rejected input
        height: String,
    },

    /// The store contains a key that does not follow the key schema
    #[error("invalid store key: {reason}")]
    InvalidStoreKey {
        /// Reason for error
        reason: String,
    },

    /// A stored payload carries a type URL that is not registered
    #[error("unknown type url {type_url}")]
    UnknownTypeUrl {
        /// The unregistered type URL
        type_url: String,
    },

    /// A stored client state cannot be decoded, which blocks registry-wide reads
    #[error("client state of client {client_id} cannot be decoded: {source}")]
    UndecodableClientState {
        /// The client identifier
        client_id: String,
        /// The decoding failure
        #[source]
        source: Box<ClientError>,
    },

    /// The genesis state is inconsistent
    #[error("invalid genesis state: {reason}")]
    InvalidGenesis {
        /// Reason for error
        reason: String,
    },

    /// The persisted schema version is not the one the migration starts from
    #[error("schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch {
        /// The schema version the migration requires
        expected: String,
        /// The persisted schema version
        found: String,
    },

    /// The store migration failed
    #[error("migration from schema version {from} to {to} failed: {source}")]
    MigrationFailed {
        /// The schema version migrated from
        from: String,
        /// The schema version migrated to
        to: String,
        /// The underlying failure
        #[source]
        source: Box<ClientError>,
    },

    /// Prost decoding error
    #[error("prost decoding error: {0}")]
    ProstDecodeError(#[from] prost::DecodeError),

    /// Serde JSON error
    #[error("serde json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ClientError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ClientStateNotFound { .. } | Self::SelfHistoryPruned { .. } => ErrorKind::NotFound,
            Self::SelfHeightOutOfRange { .. } => ErrorKind::HeightOutOfRange,
            Self::MissingLatestConsensusState { .. } | Self::InvalidStoreKey { .. } => {
                ErrorKind::Corruption
            }
            Self::MigrationFailed { .. } => ErrorKind::MigrationFailed,
            Self::UnknownTypeUrl { .. }
            | Self::UndecodableClientState { .. }
            | Self::ProstDecodeError(_)
            | Self::SerdeJsonError(_) => ErrorKind::Codec,
            Self::Std(_) => ErrorKind::Store,
            Self::ClientTypeMismatch { .. }
            | Self::ClientFrozen { .. }
            | Self::ChainIdMismatch { .. }
            | Self::InvalidHeight { .. }
            | Self::InvalidProofSpecs
            | Self::InvalidTrustLevel { .. }
            | Self::UnbondingPeriodMismatch { .. }
            | Self::InvalidTrustingPeriod { .. }
            | Self::InvalidUpgradePath { .. }
            | Self::InvalidClientState { .. }
            | Self::ConsensusStateTypeMismatch { .. }
            | Self::InvalidClientIdentifier { .. }
            | Self::ClientTypeNotAllowed { .. }
            | Self::ClientIsFrozen { .. }
            | Self::ConsensusStateExists { .. }
            | Self::ZeroFrozenHeight
            | Self::ClientSequenceExhausted { .. }
            | Self::InvalidHeightFormat { .. }
            | Self::InvalidGenesis { .. }
            | Self::SchemaVersionMismatch { .. } => ErrorKind::InvalidArgument,
        }
    }
}
