use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::{AppState, error::AppError, routes::usuario::model::Usuario};

use super::model::EmailToken;

#[derive(Debug, Deserialize)]
pub struct ActivateQuery {
    pub token: String,
}

/// Consumes an activation token and flips the owning account to active.
/// Token claim, the conflicting-active re-check and the status mutation
/// all run in one transaction; on any failure the rollback leaves the
/// token unconsumed.
#[axum::debug_handler]
pub async fn activate_account(
    State(state): State<AppState>,
    Query(query): Query<ActivateQuery>,
) -> Result<Redirect, AppError> {
    let mut tx = state.pool.begin().await?;

    let claimed = EmailToken::claim(&mut tx, &query.token).await?;

    let usuario = Usuario::find_by_id(&mut *tx, &claimed.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    // Another registration with the same email may have activated while
    // this token was in flight. This attempt loses: its pending row and
    // tokens are removed.
    let conflict =
        Usuario::find_conflicting_active(&mut *tx, &usuario.email, &usuario.id_usuario).await?;

    if conflict.is_some() {
        Usuario::delete(&mut *tx, &usuario.id_usuario).await?;
        tx.commit().await?;
        return Err(AppError::Conflict(
            "Ya existe una cuenta activa con este email".to_string(),
        ));
    }

    Usuario::activate(&mut *tx, &usuario.id_usuario).await?;
    let purged =
        Usuario::purge_other_pending(&mut *tx, &usuario.email, &usuario.id_usuario).await?;

    tx.commit().await?;

    if purged > 0 {
        tracing::info!(
            "removed {} abandoned registrations for {}",
            purged,
            usuario.email
        );
    }
    tracing::info!("account {} activated", usuario.id_usuario);

    Ok(Redirect::to(&state.config.activation_redirect_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, test_state};
    use sqlx::PgPool;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(30 * 60);

    #[sqlx::test]
    async fn activation_flips_the_account_to_active(pool: PgPool) {
        let user = seed_user(&pool, "lista@negocios.mx", false).await;
        let token = EmailToken::issue(&pool, &user, TTL).await.unwrap();

        activate_account(State(test_state(pool.clone())), Query(ActivateQuery { token }))
            .await
            .expect("activation");

        let activo: bool = sqlx::query_scalar("SELECT estatus FROM usuario WHERE id_usuario = $1")
            .bind(&user)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(activo);
    }

    #[sqlx::test]
    async fn conflicting_active_account_wins_and_pending_row_is_purged(pool: PgPool) {
        let ganador = seed_user(&pool, "repetida@negocios.mx", true).await;
        let pendiente = seed_user(&pool, "repetida@negocios.mx", false).await;
        let token = EmailToken::issue(&pool, &pendiente, TTL).await.unwrap();

        let err = activate_account(State(test_state(pool.clone())), Query(ActivateQuery { token }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // the losing registration is gone, the winner untouched
        let restante: Option<String> =
            sqlx::query_scalar("SELECT id_usuario FROM usuario WHERE email = $1")
                .bind("repetida@negocios.mx")
                .fetch_optional(&pool)
                .await
                .unwrap();
        assert_eq!(restante.as_deref(), Some(ganador.as_str()));
    }
}
