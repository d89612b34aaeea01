use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    routes::usuario::model::Usuario,
    utils::{ApiResponse, generate_token, success_to_api_response, verify_password},
};

use super::model::{LoginRequest, TokenResponse};

/// Password login. An unverified account is reported as such before the
/// password is checked; an unknown email and a wrong password are
/// indistinguishable to the caller.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TokenResponse>>), AppError> {
    let usuario = match Usuario::find_active_by_email(&state.pool, &req.email).await? {
        Some(usuario) => usuario,
        None => {
            if Usuario::find_latest_pending_by_email(&state.pool, &req.email)
                .await?
                .is_some()
            {
                return Err(AppError::Forbidden(
                    "La cuenta no ha sido verificada".to_string(),
                ));
            }
            return Err(AppError::Auth("Credenciales incorrectas".to_string()));
        }
    };

    let hash = usuario
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::Auth("Credenciales incorrectas".to_string()))?;

    if !verify_password(&req.password, hash)? {
        return Err(AppError::Auth("Credenciales incorrectas".to_string()));
    }

    let access_token = generate_token(
        &usuario.id_usuario,
        &usuario.id_nvl_usuario.to_string(),
        &state.config,
    )?;

    Usuario::touch_last_login(&state.pool, &usuario.id_usuario).await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        }),
    ))
}
