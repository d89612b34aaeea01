use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, error::AppError, utils::verify_token};

/// Validates the bearer JWT and makes the decoded claims available to
/// handlers through request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::Auth("Token inválido".to_string()))?;

    let claims = verify_token(bearer.token(), &state.config)
        .map_err(|_| AppError::Auth("Token inválido".to_string()))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
