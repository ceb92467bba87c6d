use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use services::services::identity::IdentityContext;
use utils::response::ApiResponse;

use crate::AppState;

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn unauthorized(req: &Request, reason: &'static str) -> Response {
    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        reason,
        "Unauthorized API request"
    );
    let response = ApiResponse::<()>::error("Unauthorized");
    (StatusCode::UNAUTHORIZED, Json(response)).into_response()
}

/// Verifies the bearer token and resolves the caller's identity (role and
/// external alias included) before any handler runs. Handlers read the
/// identity from request extensions and never trust client-supplied role
/// information.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
        .map(str::to_string)
    else {
        return unauthorized(&req, "missing_token");
    };

    let claims = match state.jwt().verify(&token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized(&req, "invalid_token"),
    };

    let identity = match IdentityContext::resolve(&state.db().conn, &claims.sub).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to resolve identity for verified token");
            return unauthorized(&req, "unknown_identity");
        }
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}
