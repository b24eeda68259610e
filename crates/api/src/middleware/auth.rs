//! The authorization gate.
//!
//! Every inbound request passes through here before any handler runs. The
//! decision sequence:
//!
//! 1. **Exemption table** - if the (path, method) pair matches a configured
//!    rule, the request passes with no claims attached and no further checks.
//! 2. **Credential verification** - otherwise a bearer credential must be
//!    present and verify (signature, expiry); failures are rejected with an
//!    opaque 401 before any handler runs.
//! 3. **Acceptance predicates** - the claims must not be revoked and must
//!    pass the authorization policy. Today the policy is admin-only: a valid
//!    non-admin credential is uniformly rejected on every non-exempt
//!    endpoint. That reproduces the upstream behavior deliberately; see the
//!    notes on [`authorized`].
//!
//! On success the parsed [`Claims`] are attached to the request extensions
//! for handlers to read via [`CurrentClaims`].

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::services::token::{self, Claims};
use crate::state::AppState;

// =============================================================================
// Exemption rules
// =============================================================================

/// How a rule matches a request path.
#[derive(Debug, Clone)]
enum PathMatcher {
    /// The path must equal the rule path exactly.
    Exact(String),
    /// The path must start with the rule path (any sub-path matches).
    Prefix(String),
}

/// One exemption: a path matcher plus the methods it applies to.
#[derive(Debug, Clone)]
pub struct ExemptRule {
    matcher: PathMatcher,
    methods: Vec<Method>,
}

impl ExemptRule {
    fn exact(path: impl Into<String>, methods: &[Method]) -> Self {
        Self {
            matcher: PathMatcher::Exact(path.into()),
            methods: methods.to_vec(),
        }
    }

    fn prefix(path: impl Into<String>, methods: &[Method]) -> Self {
        Self {
            matcher: PathMatcher::Prefix(path.into()),
            methods: methods.to_vec(),
        }
    }

    fn matches(&self, path: &str, method: &Method) -> bool {
        let path_matches = match &self.matcher {
            PathMatcher::Exact(rule) => path == rule,
            PathMatcher::Prefix(rule) => path.starts_with(rule.as_str()),
        };
        path_matches && self.methods.contains(method)
    }
}

/// The ordered exemption table. Built once at startup from the configured
/// API prefix, shared read-only through `AppState`, never mutated.
#[derive(Debug, Clone)]
pub struct ExemptionRules {
    rules: Vec<ExemptRule>,
}

impl ExemptionRules {
    /// The standard table: anonymous catalog reads, login/register, static
    /// uploads, and the health probes.
    #[must_use]
    pub fn standard(api_prefix: &str) -> Self {
        const READ: &[Method] = &[Method::GET, Method::OPTIONS];
        const SUBMIT: &[Method] = &[Method::POST];

        Self {
            rules: vec![
                ExemptRule::prefix("/public/uploads", READ),
                ExemptRule::prefix(format!("{api_prefix}/products"), READ),
                ExemptRule::prefix(format!("{api_prefix}/categories"), READ),
                ExemptRule::exact(format!("{api_prefix}/users/login"), SUBMIT),
                ExemptRule::exact(format!("{api_prefix}/users/register"), SUBMIT),
                ExemptRule::exact("/health", READ),
                ExemptRule::exact("/health/ready", READ),
            ],
        }
    }

    /// Whether authentication is skipped for this (path, method) pair.
    #[must_use]
    pub fn is_exempt(&self, path: &str, method: &Method) -> bool {
        self.rules.iter().any(|rule| rule.matches(path, method))
    }
}

// =============================================================================
// Acceptance predicates
// =============================================================================

/// Revocation predicate: is this specific credential withdrawn even though
/// it is structurally valid?
///
/// There is no revocation store - revocation is a pure function of the
/// claims, and today no claim combination is revoked. The hook exists so a
/// real revocation list can slot in without touching the policy below.
#[must_use]
pub const fn revoked(_claims: &Claims) -> bool {
    false
}

/// Authorization policy: only administrators may call non-exempt endpoints.
///
/// This rejects every authenticated non-admin user, including a user
/// fetching their own profile. Upstream behaves the same way and almost
/// certainly did not mean to; we reproduce it verbatim until a corrected
/// policy is agreed, and the tests below lock it in.
#[must_use]
pub const fn authorized(claims: &Claims) -> bool {
    claims.is_admin
}

/// Composite acceptance decision for a verified credential.
#[must_use]
pub const fn credential_accepted(claims: &Claims) -> bool {
    !revoked(claims) && authorized(claims)
}

// =============================================================================
// Middleware
// =============================================================================

/// 401 response with the `{"message": ...}` body shape clients expect.
struct AuthRejection(&'static str);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": self.0 })),
        )
            .into_response()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// The gate itself, layered over the whole router via
/// `axum::middleware::from_fn_with_state`.
pub async fn authorization_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let method = request.method().clone();

    if state.exemptions().is_exempt(&path, &method) {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        tracing::warn!(reason = "unauthenticated", %path, %method, "missing bearer credential");
        return AuthRejection("authentication required").into_response();
    };

    let claims = match token::verify(state.token_keys(), token) {
        Ok(claims) => claims,
        Err(err) => {
            // Malformed/expired/bad-signature are logged distinctly but
            // surface as one opaque authentication failure.
            tracing::warn!(reason = "unauthenticated", error = %err, %path, %method, "credential rejected");
            return AuthRejection("invalid or expired credential").into_response();
        }
    };

    if !credential_accepted(&claims) {
        tracing::warn!(
            reason = "revoked",
            user_id = %claims.user_id,
            %path,
            %method,
            "credential not accepted for this call"
        );
        return AuthRejection("credential revoked").into_response();
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}

// =============================================================================
// Extractor
// =============================================================================

/// Extractor for the claims the gate attached to the request.
///
/// Only usable behind the gate on non-exempt routes; on exempt routes no
/// claims exist and extraction rejects with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentClaims(claims): CurrentClaims) -> impl IntoResponse {
///     format!("hello, user {}", claims.user_id)
/// }
/// ```
pub struct CurrentClaims(pub Claims);

impl<S> FromRequestParts<S> for CurrentClaims
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AuthRejection("authentication required").into_response())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cartwheel_core::UserId;

    fn rules() -> ExemptionRules {
        ExemptionRules::standard("/api/v1")
    }

    fn claims(is_admin: bool) -> Claims {
        Claims {
            user_id: UserId::new(1),
            is_admin,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn test_catalog_reads_are_exempt() {
        let rules = rules();
        assert!(rules.is_exempt("/api/v1/products", &Method::GET));
        assert!(rules.is_exempt("/api/v1/products/42", &Method::GET));
        assert!(rules.is_exempt("/api/v1/products/get/featured/5", &Method::OPTIONS));
        assert!(rules.is_exempt("/api/v1/categories", &Method::GET));
        assert!(rules.is_exempt("/api/v1/categories/7", &Method::OPTIONS));
    }

    #[test]
    fn test_catalog_writes_are_not_exempt() {
        let rules = rules();
        assert!(!rules.is_exempt("/api/v1/products", &Method::POST));
        assert!(!rules.is_exempt("/api/v1/products/42", &Method::PUT));
        assert!(!rules.is_exempt("/api/v1/categories/7", &Method::DELETE));
    }

    #[test]
    fn test_login_register_exact_only() {
        let rules = rules();
        assert!(rules.is_exempt("/api/v1/users/login", &Method::POST));
        assert!(rules.is_exempt("/api/v1/users/register", &Method::POST));
        // Exact paths: sub-paths and other methods stay guarded.
        assert!(!rules.is_exempt("/api/v1/users/login/extra", &Method::POST));
        assert!(!rules.is_exempt("/api/v1/users/login", &Method::GET));
        assert!(!rules.is_exempt("/api/v1/users", &Method::GET));
        assert!(!rules.is_exempt("/api/v1/users/3", &Method::GET));
    }

    #[test]
    fn test_static_uploads_exempt() {
        let rules = rules();
        assert!(rules.is_exempt("/public/uploads/shirt-123.png", &Method::GET));
        assert!(!rules.is_exempt("/public/uploads/shirt-123.png", &Method::POST));
    }

    #[test]
    fn test_orders_never_exempt() {
        let rules = rules();
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            assert!(!rules.is_exempt("/api/v1/orders", &method));
            assert!(!rules.is_exempt("/api/v1/orders/12", &method));
        }
        assert!(!rules.is_exempt("/api/v1/orders/get/totalsales", &Method::GET));
    }

    #[test]
    fn test_health_probes_exempt() {
        let rules = rules();
        assert!(rules.is_exempt("/health", &Method::GET));
        assert!(rules.is_exempt("/health/ready", &Method::GET));
        assert!(!rules.is_exempt("/health", &Method::POST));
    }

    #[test]
    fn test_admin_only_policy() {
        // Admin-only, regardless of anything else in the claims.
        assert!(credential_accepted(&claims(true)));
        assert!(!credential_accepted(&claims(false)));
    }

    #[test]
    fn test_revocation_predicate_accepts_all_claims() {
        // No revocation list exists; the predicate is constant today.
        assert!(!revoked(&claims(true)));
        assert!(!revoked(&claims(false)));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }
}
