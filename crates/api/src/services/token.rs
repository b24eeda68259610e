//! Bearer-credential issuance and verification.
//!
//! Credentials are HS256 JWTs carrying exactly the claims the login endpoint
//! signs: the subject's user id and admin flag, plus issued-at/expiry
//! timestamps. There is no server-side revocation store - whether a token is
//! accepted is a pure function of its claims (see
//! [`crate::middleware::auth`]).
//!
//! Verification is deliberately strict: one fixed algorithm, zero clock
//! leeway, expiry always checked.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cartwheel_core::UserId;

/// Token lifetime: one day from issuance.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims carried inside a credential.
///
/// Wire names (`userId`, `isAdmin`) match what storefront clients already
/// decode out of the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The authenticated user.
    pub user_id: UserId,
    /// Administrative flag; the authorization policy keys off this.
    pub is_admin: bool,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds), fixed at issuance + [`TOKEN_TTL_SECS`].
    pub exp: i64,
}

/// Verification failures.
///
/// The gate surfaces all three as one opaque authentication failure; the
/// distinction exists for logs and tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token cannot be parsed into header/payload/signature.
    #[error("malformed token")]
    Malformed,
    /// The signature does not verify under the configured secret.
    #[error("invalid token signature")]
    SignatureInvalid,
    /// The token is past its expiry.
    #[error("token expired")]
    Expired,
}

/// Signing and verification keys derived once from the configured secret.
///
/// Built at startup and shared read-only through `AppState`; the secret
/// itself is not retained.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    /// Derive keys from the shared signing secret.
    #[must_use]
    pub fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }
}

/// Issue a credential for a freshly authenticated user.
///
/// # Errors
///
/// Returns the underlying `jsonwebtoken` error if signing fails (this
/// indicates a broken key, not bad input).
pub fn issue(
    keys: &TokenKeys,
    user_id: UserId,
    is_admin: bool,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id,
        is_admin,
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
}

/// Verify a credential and return its claims unchanged.
///
/// # Errors
///
/// - [`TokenError::Expired`] when past `exp`
/// - [`TokenError::SignatureInvalid`] when the signature does not match
/// - [`TokenError::Malformed`] for anything that is not a structurally valid
///   token signed with the expected algorithm
pub fn verify(keys: &TokenKeys, token: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(token, &keys.decoding, &keys.validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            _ => TokenError::Malformed,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_keys() -> TokenKeys {
        TokenKeys::from_secret(&SecretString::from("kX9#mP2$vL8@qR4!wT6^zN0*bH5&cJ3%"))
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let keys = test_keys();
        let token = issue(&keys, UserId::new(7), true).unwrap();

        let claims = verify(&keys, &token).unwrap();
        assert_eq!(claims.user_id, UserId::new(7));
        assert!(claims.is_admin);
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_SECS);
    }

    #[test]
    fn test_verify_claims_unchanged() {
        // Verification must not enrich or mutate what was signed.
        let keys = test_keys();
        let token = issue(&keys, UserId::new(42), false).unwrap();

        let claims = verify(&keys, &token).unwrap();
        assert_eq!(claims.user_id, UserId::new(42));
        assert!(!claims.is_admin);
    }

    #[test]
    fn test_verify_wrong_secret() {
        let token = issue(&test_keys(), UserId::new(1), true).unwrap();

        let other = TokenKeys::from_secret(&SecretString::from(
            "f7Gh2@kL9#pQ4$rS6!tU8^vW0*xY3&zA5%",
        ));
        assert_eq!(
            verify(&other, &token).unwrap_err(),
            TokenError::SignatureInvalid
        );
    }

    #[test]
    fn test_verify_garbage() {
        let keys = test_keys();
        assert_eq!(
            verify(&keys, "not-a-token").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(
            verify(&keys, "still.not.atoken").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(verify(&keys, "").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_verify_expired() {
        let keys = test_keys();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            user_id: UserId::new(1),
            is_admin: true,
            iat: now - 2 * TOKEN_TTL_SECS,
            exp: now - TOKEN_TTL_SECS,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();

        assert_eq!(verify(&keys, &token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_claims_wire_names() {
        // Storefront clients decode the payload by these exact names.
        let claims = Claims {
            user_id: UserId::new(3),
            is_admin: true,
            iat: 100,
            exp: 200,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 3);
        assert_eq!(json["isAdmin"], true);
    }
}
