//! Authentication and permission enforcement driven by the access table.

use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use gatehouse_auth::Decision;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_service::context::RequestContext;

use crate::access::{self, Access};
use crate::error::ApiError;
use crate::extractors::client_ip::client_ip;
use crate::state::AppState;

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))
}

/// Route layer that authenticates the caller and checks the permission the
/// matched route requires.
///
/// On success the [`RequestContext`] is placed in both the request and the
/// response extensions, so handlers and the operation log can see who acted.
/// Authentication failures end the request with 401. A disabled account or
/// a denied permission gets 403, and an engine error 500.
pub async fn authorize(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let access = match &matched {
        Some(path) => access::lookup(request.method().as_str(), path.as_str()),
        None => Access::Authenticated,
    };

    if access == Access::Public {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())?;
    let claims = state.jwt_decoder.verify(token)?;

    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let ctx = RequestContext::new(
        claims.user_id(),
        claims.username,
        client_ip(request.headers(), request.extensions()),
        user_agent,
    );

    if let Err(e) = state.auth_service.ensure_active(ctx.user_id).await {
        warn!(
            user_id = ctx.user_id,
            username = %ctx.username,
            error = %e,
            "Token of inactive account"
        );
        return Ok(refuse(e, ctx));
    }

    if let Access::Permission(code) = access {
        match state.engine.authorize(ctx.user_id, code).await? {
            Decision::Allow => {
                debug!(user_id = ctx.user_id, permission = code, "Permission granted");
            }
            Decision::Deny => {
                warn!(
                    user_id = ctx.user_id,
                    username = %ctx.username,
                    permission = code,
                    "Permission denied"
                );
                let denied = AppError::authorization(format!("Permission denied: {code} required"));
                return Ok(refuse(denied, ctx));
            }
        }
    }

    request.extensions_mut().insert(ctx.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    Ok(response)
}

/// Error response that still names the caller for the operation log.
fn refuse(err: AppError, ctx: RequestContext) -> Response {
    let mut response = ApiError(err).into_response();
    response.extensions_mut().insert(ctx);
    response
}
