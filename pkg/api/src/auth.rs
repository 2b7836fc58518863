use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::AppState;

/// Middleware: authenticates the request with a Bearer token.
///
/// The only accepted token is the one configured for the server. Who may
/// call which operation is decided by the authorization layer in front of
/// this API, not here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token != state.token {
        warn!("Invalid Bearer token provided");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}
