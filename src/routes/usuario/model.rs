use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id_usuario: String,
    pub id_nvl_usuario: i32,
    #[serde(skip_serializing)]
    pub google_id: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub nombre_completo: Option<String>,
    pub foto_perfil_url: Option<String>,
    pub provider: String,
    pub fecha_creacion: DateTime<Utc>,
    pub ultimo_logeo: Option<DateTime<Utc>>,
    pub estatus: bool,
}

#[derive(Debug, Deserialize)]
pub struct CrearUsuarioRequest {
    pub id_nvl_usuario: i32,
    pub email: String,
    pub password: String,
    pub nombre_completo: String,
    pub foto_perfil_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarUsuarioRequest {
    pub id_nvl_usuario: Option<i32>,
    pub nombre_completo: Option<String>,
    pub foto_perfil_url: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MensajeResponse {
    pub message: String,
}

const SELECT_COLS: &str = r#"
    id_usuario, id_nvl_usuario, google_id, email, password_hash,
    nombre_completo, foto_perfil_url, provider, fecha_creacion,
    ultimo_logeo, estatus
"#;

impl Usuario {
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {SELECT_COLS} FROM usuario ORDER BY fecha_creacion"
        ))
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_usuario: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {SELECT_COLS} FROM usuario WHERE id_usuario = $1"
        ))
        .bind(id_usuario)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_active_by_email<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {SELECT_COLS} FROM usuario WHERE email = $1 AND estatus = true"
        ))
        .bind(email)
        .fetch_optional(executor)
        .await
    }

    /// Most recently created pending registration for the email.
    pub async fn find_latest_pending_by_email<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Usuario>(&format!(
            r#"
            SELECT {SELECT_COLS} FROM usuario
            WHERE email = $1 AND estatus = false
            ORDER BY fecha_creacion DESC
            LIMIT 1
            "#
        ))
        .bind(email)
        .fetch_optional(executor)
        .await
    }

    /// An ACTIVE user with the same email but a different id, i.e. the
    /// winner of a concurrent-registration race.
    pub async fn find_conflicting_active<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
        id_usuario: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Usuario>(&format!(
            r#"
            SELECT {SELECT_COLS} FROM usuario
            WHERE email = $1 AND estatus = true AND id_usuario <> $2
            "#
        ))
        .bind(email)
        .bind(id_usuario)
        .fetch_optional(executor)
        .await
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_usuario: &str,
        req: &CrearUsuarioRequest,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Usuario>(&format!(
            r#"
            INSERT INTO usuario
                (id_usuario, id_nvl_usuario, email, password_hash, nombre_completo,
                 foto_perfil_url, provider, fecha_creacion, estatus)
            VALUES ($1, $2, $3, $4, $5, $6, 'local', now(), false)
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_usuario)
        .bind(req.id_nvl_usuario)
        .bind(&req.email)
        .bind(password_hash)
        .bind(&req.nombre_completo)
        .bind(&req.foto_perfil_url)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_usuario: &str,
        req: &ActualizarUsuarioRequest,
        password_hash: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Usuario>(&format!(
            r#"
            UPDATE usuario
            SET id_nvl_usuario = COALESCE($2, id_nvl_usuario),
                nombre_completo = COALESCE($3, nombre_completo),
                foto_perfil_url = COALESCE($4, foto_perfil_url),
                password_hash = COALESCE($5, password_hash)
            WHERE id_usuario = $1
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_usuario)
        .bind(req.id_nvl_usuario)
        .bind(&req.nombre_completo)
        .bind(&req.foto_perfil_url)
        .bind(password_hash)
        .fetch_one(executor)
        .await
    }

    /// Removes the user row; activation tokens go with it through the
    /// foreign-key cascade.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_usuario: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM usuario WHERE id_usuario = $1")
            .bind(id_usuario)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn activate<'e>(
        executor: impl PgExecutor<'e>,
        id_usuario: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE usuario SET estatus = true, ultimo_logeo = now() WHERE id_usuario = $1")
            .bind(id_usuario)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Deletes every OTHER inactive registration sharing the email.
    pub async fn purge_other_pending<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
        id_usuario: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM usuario WHERE email = $1 AND estatus = false AND id_usuario <> $2",
        )
        .bind(email)
        .bind(id_usuario)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn touch_last_login<'e>(
        executor: impl PgExecutor<'e>,
        id_usuario: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE usuario SET ultimo_logeo = now() WHERE id_usuario = $1")
            .bind(id_usuario)
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

    #[sqlx::test]
    async fn activation_race_leaves_a_single_active_account_per_email(pool: PgPool) {
        // two concurrent registrations with the same email, both pending
        let ganador = seed_user(&pool, "duplicado@negocios.mx", false).await;
        let perdedor = seed_user(&pool, "duplicado@negocios.mx", false).await;

        Usuario::activate(&pool, &ganador).await.unwrap();
        let purged = Usuario::purge_other_pending(&pool, "duplicado@negocios.mx", &ganador)
            .await
            .unwrap();
        assert_eq!(purged, 1);
        assert!(Usuario::find_by_id(&pool, &perdedor).await.unwrap().is_none());

        // the losing activation's re-check would have found the winner
        let conflicto =
            Usuario::find_conflicting_active(&pool, "duplicado@negocios.mx", &perdedor)
                .await
                .unwrap();
        assert_eq!(conflicto.unwrap().id_usuario, ganador);

        let activos: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM usuario WHERE email = $1 AND estatus = true",
        )
        .bind("duplicado@negocios.mx")
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(activos, 1);
    }

    #[sqlx::test]
    async fn pending_lookup_ignores_active_accounts(pool: PgPool) {
        seed_user(&pool, "activa@negocios.mx", true).await;
        let pendiente = seed_user(&pool, "pendiente@negocios.mx", false).await;

        assert!(
            Usuario::find_latest_pending_by_email(&pool, "activa@negocios.mx")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            Usuario::find_latest_pending_by_email(&pool, "pendiente@negocios.mx")
                .await
                .unwrap()
                .unwrap()
                .id_usuario,
            pendiente
        );
    }
}
