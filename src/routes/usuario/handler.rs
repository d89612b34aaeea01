use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    routes::activacion::EmailToken,
    utils::{ApiResponse, Claims, hash_password, success_to_api_response},
};

use super::model::{ActualizarUsuarioRequest, CrearUsuarioRequest, MensajeResponse, Usuario};

/// A pending registration older than this is treated as abandoned and
/// replaced by a fresh one.
const PENDING_REGISTRATION_WINDOW_HOURS: i64 = 24;

/// Shape check only: one `@`, non-empty local part, dotted domain, no
/// whitespace. Real deliverability is proven by the activation email.
fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Registers a new account in pending state and emails the activation
/// link. The email send never blocks or fails the registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CrearUsuarioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MensajeResponse>>), AppError> {
    if !valid_email(&req.email) {
        return Err(AppError::Validation("Email inválido".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::Validation("La contraseña es obligatoria".to_string()));
    }

    if Usuario::find_active_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(AppError::Conflict(
            "El email ya está registrado y activado".to_string(),
        ));
    }

    if let Some(pendiente) = Usuario::find_latest_pending_by_email(&state.pool, &req.email).await? {
        let cutoff = Utc::now() - Duration::hours(PENDING_REGISTRATION_WINDOW_HOURS);
        if pendiente.fecha_creacion > cutoff {
            return Err(AppError::Conflict(
                "Ya existe un registro pendiente de activación. Revisa tu correo.".to_string(),
            ));
        }
        // stale pending registration, replace it
        Usuario::delete(&state.pool, &pendiente.id_usuario).await?;
    }

    let password_hash = hash_password(&req.password)?;
    let id_usuario = Uuid::new_v4().to_string();

    let mut tx = state.pool.begin().await?;
    let usuario = Usuario::create(&mut *tx, &id_usuario, &req, &password_hash).await?;
    let token = EmailToken::issue(
        &mut *tx,
        &usuario.id_usuario,
        state.config.activation_token_ttl(),
    )
    .await?;
    tx.commit().await?;

    state.mailer.dispatch_activation(
        usuario.email.clone(),
        usuario.nombre_completo.clone().unwrap_or_default(),
        token,
    );

    Ok((
        StatusCode::CREATED,
        success_to_api_response(MensajeResponse {
            message: "Usuario creado. Revisa tu correo para activar la cuenta.".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReenviarQuery {
    pub email: String,
}

/// Invalidates any outstanding tokens for the most recent pending
/// registration and emails a fresh one.
#[axum::debug_handler]
pub async fn resend_activation(
    State(state): State<AppState>,
    Query(query): Query<ReenviarQuery>,
) -> Result<(StatusCode, Json<ApiResponse<MensajeResponse>>), AppError> {
    let usuario = match Usuario::find_latest_pending_by_email(&state.pool, &query.email).await? {
        Some(usuario) => usuario,
        None => {
            return if Usuario::find_active_by_email(&state.pool, &query.email).await?.is_some() {
                Err(AppError::Conflict("La cuenta ya está activada".to_string()))
            } else {
                Err(AppError::NotFound(
                    "No hay solicitudes de registro pendientes para este email".to_string(),
                ))
            };
        }
    };

    let mut tx = state.pool.begin().await?;
    EmailToken::supersede(&mut *tx, &usuario.id_usuario).await?;
    let token = EmailToken::issue(
        &mut *tx,
        &usuario.id_usuario,
        state.config.activation_token_ttl(),
    )
    .await?;
    tx.commit().await?;

    state.mailer.dispatch_activation(
        usuario.email.clone(),
        usuario.nombre_completo.clone().unwrap_or_default(),
        token,
    );

    Ok((
        StatusCode::OK,
        success_to_api_response(MensajeResponse {
            message: "Correo de activación reenviado exitosamente".to_string(),
        }),
    ))
}

#[axum::debug_handler]
pub async fn me(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Usuario>>), AppError> {
    let usuario = Usuario::find_by_id(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    Ok((StatusCode::OK, success_to_api_response(usuario)))
}

#[axum::debug_handler]
pub async fn list_usuarios(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Usuario>>>), AppError> {
    let usuarios = Usuario::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(usuarios)))
}

#[axum::debug_handler]
pub async fn get_usuario(
    State(state): State<AppState>,
    Path(id_usuario): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<Usuario>>), AppError> {
    let usuario = Usuario::find_by_id(&state.pool, &id_usuario)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    Ok((StatusCode::OK, success_to_api_response(usuario)))
}

/// Updates the authenticated user's own record.
#[axum::debug_handler]
pub async fn update_usuario(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id_usuario): Path<String>,
    Json(req): Json<ActualizarUsuarioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Usuario>>), AppError> {
    if id_usuario != claims.sub {
        return Err(AppError::Forbidden(
            "No tienes permiso para modificar este usuario".to_string(),
        ));
    }
    if Usuario::find_by_id(&state.pool, &claims.sub).await?.is_none() {
        return Err(AppError::NotFound("Usuario no encontrado".to_string()));
    }

    let password_hash = match &req.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let usuario = Usuario::update(&state.pool, &claims.sub, &req, password_hash).await?;
    Ok((StatusCode::OK, success_to_api_response(usuario)))
}

#[axum::debug_handler]
pub async fn delete_usuario(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id_usuario): Path<String>,
) -> Result<StatusCode, AppError> {
    if id_usuario != claims.sub {
        return Err(AppError::Forbidden(
            "No tienes permiso para eliminar este usuario".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;
    EmailToken::delete_for_user(&mut *tx, &id_usuario).await?;
    let deleted = Usuario::delete(&mut *tx, &id_usuario).await?;
    tx.commit().await?;

    if deleted == 0 {
        return Err(AppError::NotFound("Usuario no encontrado".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, test_state};
    use axum::extract::{Json, State};
    use sqlx::PgPool;

    #[test]
    fn email_shape_is_checked() {
        assert!(valid_email("ana@negocios.mx"));
        assert!(valid_email("a.b+c@sub.dominio.com"));
        assert!(!valid_email("sin-arroba"));
        assert!(!valid_email("@dominio.com"));
        assert!(!valid_email("ana@dominio"));
        assert!(!valid_email("ana@.com"));
        assert!(!valid_email("ana @dominio.com"));
        assert!(!valid_email("ana@dos@arrobas.com"));
    }

    fn solicitud(nivel: i32, email: &str) -> CrearUsuarioRequest {
        CrearUsuarioRequest {
            id_nvl_usuario: nivel,
            email: email.to_string(),
            password: "secreta".to_string(),
            nombre_completo: "Cuenta de Prueba".to_string(),
            foto_perfil_url: None,
        }
    }

    #[sqlx::test]
    async fn second_registration_within_window_is_rejected(pool: PgPool) {
        let nivel: i32 = sqlx::query_scalar(
            "INSERT INTO nvl_usuario (rol_usuario) VALUES ('usuario') RETURNING id_nvl_usuario",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let state = test_state(pool.clone());

        register(State(state.clone()), Json(solicitud(nivel, "nueva@negocios.mx")))
            .await
            .expect("first registration");

        let err = register(State(state), Json(solicitud(nivel, "nueva@negocios.mx")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg.contains("pendiente")));
    }

    #[sqlx::test]
    async fn registration_against_active_email_is_rejected(pool: PgPool) {
        let nivel: i32 = sqlx::query_scalar(
            "INSERT INTO nvl_usuario (rol_usuario) VALUES ('usuario') RETURNING id_nvl_usuario",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        seed_user(&pool, "ocupada@negocios.mx", true).await;
        let state = test_state(pool);

        let err = register(State(state), Json(solicitud(nivel, "ocupada@negocios.mx")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg.contains("activado")));
    }
}
