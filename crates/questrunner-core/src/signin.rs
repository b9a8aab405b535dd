//! Sign-in message construction.
//!
//! Builds the deterministic sign-in-with-Ethereum statement the quest API
//! verifies: origin, account address, a fixed application statement, the
//! endpoint URI, protocol version, chain id, the server-issued nonce, and
//! the issued-at timestamp. The byte layout must match what the server
//! reconstructs, so everything is a single format string.

use crate::config::ApiConfig;

/// Fixed application statement embedded in every sign-in message.
const STATEMENT: &str = "Sign in with Ethereum to the app.";

/// Fixed protocol version.
const VERSION: &str = "1";

/// Build the sign-in statement for one wallet.
///
/// `issued_at` is an RFC 3339 timestamp supplied by the caller so the
/// message stays a pure function of its inputs.
#[must_use]
pub fn build_signin_message(
    api: &ApiConfig,
    address: &str,
    nonce: &str,
    issued_at: &str,
) -> String {
    format!(
        "{origin} wants you to sign in with your Ethereum account:\n\
         {address}\n\
         \n\
         {STATEMENT}\n\
         \n\
         URI: {uri}\n\
         Version: {VERSION}\n\
         Chain ID: {chain_id}\n\
         Nonce: {nonce}\n\
         Issued At: {issued_at}",
        origin = api.origin,
        uri = api.referer,
        chain_id = api.chain_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_layout() {
        let api = ApiConfig::default();
        let message = build_signin_message(
            &api,
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
            "abc123",
            "2024-01-01T00:00:00.000Z",
        );

        assert_eq!(
            message,
            "https://token.gpu.net wants you to sign in with your Ethereum account:\n\
             0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf\n\
             \n\
             Sign in with Ethereum to the app.\n\
             \n\
             URI: https://token.gpu.net/\n\
             Version: 1\n\
             Chain ID: 4048\n\
             Nonce: abc123\n\
             Issued At: 2024-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_message_is_deterministic() {
        let api = ApiConfig::default();
        let a = build_signin_message(&api, "0xabc", "n", "t");
        let b = build_signin_message(&api, "0xabc", "n", "t");
        assert_eq!(a, b);
    }
}
