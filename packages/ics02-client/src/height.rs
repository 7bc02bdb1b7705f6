//! This module defines [`Height`].

use core::fmt;
use core::str::FromStr;

use ibc_proto::ibc::core::client::v1::Height as IbcProtoHeight;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Length in bytes of a height encoded as a store key suffix.
pub const HEIGHT_KEY_LEN: usize = 16;

/// A block height on a (possibly forked) chain.
///
/// Heights order by revision number first, then by revision height. The zero
/// height is used as a sentinel for "unset".
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Height {
    /// Incremented on every hard fork of the chain
    pub revision_number: u64,
    /// Block height within the revision
    pub revision_height: u64,
}

impl Height {
    /// The zero height.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new height.
    #[must_use]
    pub const fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    /// Returns true for the unset height `0-0`.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }

    /// Fixed-width big-endian encoding used as a store key suffix, so that a
    /// lexicographic key scan yields heights in ascending order.
    #[must_use]
    pub fn to_key_bytes(&self) -> [u8; HEIGHT_KEY_LEN] {
        let mut key = [0u8; HEIGHT_KEY_LEN];
        key[..8].copy_from_slice(&self.revision_number.to_be_bytes());
        key[8..].copy_from_slice(&self.revision_height.to_be_bytes());
        key
    }

    /// Decodes a height from its fixed-width key encoding.
    /// # Errors
    /// Returns an error if the slice is not exactly [`HEIGHT_KEY_LEN`] bytes long.
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self, ClientError> {
        if bytes.len() != HEIGHT_KEY_LEN {
            return Err(ClientError::InvalidStoreKey {
                reason: format!(
                    "height suffix must be {HEIGHT_KEY_LEN} bytes, got {}",
                    bytes.len()
                ),
            });
        }
        let (revision, height) = bytes.split_at(8);
        let mut revision_number = [0u8; 8];
        revision_number.copy_from_slice(revision);
        let mut revision_height = [0u8; 8];
        revision_height.copy_from_slice(height);
        Ok(Self::new(
            u64::from_be_bytes(revision_number),
            u64::from_be_bytes(revision_height),
        ))
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

impl FromStr for Height {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ClientError::InvalidHeightFormat {
            height: s.to_string(),
        };
        let (revision_number, revision_height) = s.split_once('-').ok_or_else(invalid)?;
        Ok(Self::new(
            revision_number.parse().map_err(|_| invalid())?,
            revision_height.parse().map_err(|_| invalid())?,
        ))
    }
}

impl From<IbcProtoHeight> for Height {
    fn from(height: IbcProtoHeight) -> Self {
        Self::new(height.revision_number, height.revision_height)
    }
}

impl From<Height> for IbcProtoHeight {
    fn from(height: Height) -> Self {
        Self {
            revision_number: height.revision_number,
            revision_height: height.revision_height,
        }
    }
}
