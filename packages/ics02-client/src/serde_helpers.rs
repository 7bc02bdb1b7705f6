//! This module provides custom serde implementations.

/// Serialize ICS-23 proof specs as base64-encoded protobuf.
pub mod proof_specs_as_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use ics23::ProofSpec;
    use prost::Message;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Implements the serde `serialize` function for a list of proof specs.
    /// # Errors
    /// Returns an error if the list cannot be serialized.
    pub fn serialize<S>(specs: &[ProofSpec], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        specs
            .iter()
            .map(|spec| STANDARD.encode(spec.encode_to_vec()))
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    /// Implements the serde `deserialize` function for a list of proof specs.
    /// # Errors
    /// Returns an error if an entry is not base64 or not a protobuf `ProofSpec`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<ProofSpec>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .into_iter()
            .map(|encoded| {
                let bz = STANDARD
                    .decode(encoded)
                    .map_err(serde::de::Error::custom)?;
                ProofSpec::decode(bz.as_slice()).map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
