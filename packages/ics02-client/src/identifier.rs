//! Client and chain identifier helpers.

use crate::{client_state::ClientType, error::ClientError};

/// Minimum length of a client identifier.
pub const MIN_CLIENT_ID_LEN: usize = 9;
/// Maximum length of a client identifier.
pub const MAX_CLIENT_ID_LEN: usize = 64;

/// The fixed identifier of the loopback client.
pub const LOCALHOST_CLIENT_ID: &str = "09-localhost";

/// Validates a client identifier: 9 to 64 characters drawn from
/// `[a-zA-Z0-9._+-#[]<>]`. Identifiers never contain `/`, which keeps client
/// key prefixes unambiguous.
/// # Errors
/// Returns [`ClientError::InvalidClientIdentifier`] if the identifier is malformed.
pub fn validate_client_identifier(client_id: &str) -> Result<(), ClientError> {
    let invalid = |reason: String| ClientError::InvalidClientIdentifier {
        client_id: client_id.to_string(),
        reason,
    };

    if !(MIN_CLIENT_ID_LEN..=MAX_CLIENT_ID_LEN).contains(&client_id.len()) {
        return Err(invalid(format!(
            "length must be between {MIN_CLIENT_ID_LEN} and {MAX_CLIENT_ID_LEN}"
        )));
    }
    if let Some(c) = client_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || ".-_+#[]<>".contains(*c)))
    {
        return Err(invalid(format!("invalid character {c:?}")));
    }
    Ok(())
}

/// Formats the identifier of the `sequence`-th client of `client_type`.
#[must_use]
pub fn format_client_identifier(client_type: ClientType, sequence: u64) -> String {
    format!("{client_type}-{sequence}")
}

/// Splits a generated client identifier into its client type and sequence.
#[must_use]
pub fn parse_client_identifier(client_id: &str) -> Option<(ClientType, u64)> {
    let (client_type, sequence) = client_id.rsplit_once('-')?;
    Some((ClientType::from_str_opt(client_type)?, sequence.parse().ok()?))
}

/// Returns the revision number encoded in a chain id of the form
/// `{name}-{revision}`, or zero if the chain id does not follow that format.
#[must_use]
pub fn chain_id_revision(chain_id: &str) -> u64 {
    let Some((name, revision)) = chain_id.rsplit_once('-') else {
        return 0;
    };
    if name.is_empty()
        || name.ends_with('-')
        || revision.is_empty()
        || revision.starts_with('0')
        || !revision.bytes().all(|b| b.is_ascii_digit())
    {
        return 0;
    }
    revision.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::tendermint("07-tendermint-0", true)]
    #[case::localhost(LOCALHOST_CLIENT_ID, true)]
    #[case::symbols("client<A>[1]#x", true)]
    #[case::too_short("07-tm-0", false)]
    #[case::slash("07-tendermint/0", false)]
    #[case::space("07 tendermint 0", false)]
    fn client_identifiers(#[case] client_id: &str, #[case] ok: bool) {
        assert_eq!(validate_client_identifier(client_id).is_ok(), ok);
    }

    #[test]
    fn generated_identifiers_parse() {
        let client_id = format_client_identifier(ClientType::Tendermint, 12);
        assert_eq!(client_id, "07-tendermint-12");
        assert_eq!(
            parse_client_identifier(&client_id),
            Some((ClientType::Tendermint, 12))
        );
        assert_eq!(parse_client_identifier("clientB"), None);
    }

    #[rstest]
    #[case("gaiahub-0", 0)]
    #[case("gaiahub-1", 1)]
    #[case("evmos_9001-2", 2)]
    #[case("gaiahub", 0)]
    #[case("gaiahub-01", 0)]
    #[case("gaia--1", 0)]
    #[case("-1", 0)]
    fn chain_id_revisions(#[case] chain_id: &str, #[case] revision: u64) {
        assert_eq!(chain_id_revision(chain_id), revision);
    }
}
