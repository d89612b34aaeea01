use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgExecutor, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppError;

/// Single-use email-verification token. State machine per row:
/// issued (`used=false`) then consumed, expired or superseded.
#[derive(Debug, Serialize, FromRow)]
pub struct EmailToken {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

#[derive(Debug, FromRow)]
pub struct ClaimedToken {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl EmailToken {
    /// Creates a fresh token for the user and returns its opaque value.
    pub async fn issue<'e>(
        executor: impl PgExecutor<'e>,
        user_id: &str,
        ttl: std::time::Duration,
    ) -> Result<String, sqlx::Error> {
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::seconds(ttl.as_secs() as i64);

        sqlx::query(
            r#"
            INSERT INTO email_token (id, user_id, token, expires_at, used)
            VALUES ($1, $2, $3, $4, false)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&token)
        .bind(expires_at)
        .execute(executor)
        .await?;

        Ok(token)
    }

    /// Atomically consumes the token inside the caller's transaction.
    /// The single UPDATE is the claim: a concurrent activation with the
    /// same token finds `used=true` and gets `Token inválido`. An
    /// expired token fails after the claim and the rollback leaves it
    /// unconsumed.
    pub async fn claim(
        tx: &mut Transaction<'_, Postgres>,
        token: &str,
    ) -> Result<ClaimedToken, AppError> {
        let claimed = sqlx::query_as::<_, ClaimedToken>(
            r#"
            UPDATE email_token
            SET used = true
            WHERE token = $1 AND used = false
            RETURNING user_id, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::Validation("Token inválido o ya usado".to_string()))?;

        if claimed.expires_at < Utc::now() {
            return Err(AppError::Validation("Token expirado".to_string()));
        }

        Ok(claimed)
    }

    /// Marks every unconsumed token of the user as used. Called before
    /// issuing a replacement in the resend-activation flow.
    pub async fn supersede<'e>(
        executor: impl PgExecutor<'e>,
        user_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE email_token SET used = true WHERE user_id = $1 AND used = false")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM email_token WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seed_user;
    use sqlx::PgPool;
    use std::time::Duration as TokenTtl;

    const TTL: TokenTtl = TokenTtl::from_secs(30 * 60);

    #[sqlx::test]
    async fn consumed_token_is_rejected_on_reclaim(pool: PgPool) {
        let user = seed_user(&pool, "uno@negocios.mx", false).await;
        let token = EmailToken::issue(&pool, &user, TTL).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let claimed = EmailToken::claim(&mut tx, &token).await.unwrap();
        assert_eq!(claimed.user_id, user);
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let err = EmailToken::claim(&mut tx, &token).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("ya usado")));
    }

    #[sqlx::test]
    async fn expired_token_fails_and_rollback_leaves_it_unconsumed(pool: PgPool) {
        let user = seed_user(&pool, "dos@negocios.mx", false).await;
        let token = EmailToken::issue(&pool, &user, TTL).await.unwrap();
        sqlx::query(
            "UPDATE email_token SET expires_at = now() - interval '1 minute' WHERE token = $1",
        )
        .bind(&token)
        .execute(&pool)
        .await
        .unwrap();

        let mut tx = pool.begin().await.unwrap();
        let err = EmailToken::claim(&mut tx, &token).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("expirado")));
        tx.rollback().await.unwrap();

        let used: bool = sqlx::query_scalar("SELECT used FROM email_token WHERE token = $1")
            .bind(&token)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(!used, "rollback must leave the claim unconsumed");
    }

    #[sqlx::test]
    async fn superseded_token_cannot_be_claimed_but_replacement_can(pool: PgPool) {
        let user = seed_user(&pool, "tres@negocios.mx", false).await;
        let viejo = EmailToken::issue(&pool, &user, TTL).await.unwrap();
        EmailToken::supersede(&pool, &user).await.unwrap();
        let nuevo = EmailToken::issue(&pool, &user, TTL).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        assert!(EmailToken::claim(&mut tx, &viejo).await.is_err());
        tx.rollback().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        assert!(EmailToken::claim(&mut tx, &nuevo).await.is_ok());
        tx.commit().await.unwrap();
    }
}
