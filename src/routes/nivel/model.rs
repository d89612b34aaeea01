use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

/// Access level attached to every user account ("nvl_usuario").
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct NivelUsuario {
    pub id_nvl_usuario: i32,
    pub rol_usuario: String,
}

#[derive(Debug, Deserialize)]
pub struct CrearNivelRequest {
    pub rol_usuario: String,
}

impl NivelUsuario {
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id_nvl_usuario, rol_usuario FROM nvl_usuario ORDER BY id_nvl_usuario",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_nvl_usuario: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id_nvl_usuario, rol_usuario FROM nvl_usuario WHERE id_nvl_usuario = $1",
        )
        .bind(id_nvl_usuario)
        .fetch_optional(executor)
        .await
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        rol_usuario: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO nvl_usuario (rol_usuario)
            VALUES ($1)
            RETURNING id_nvl_usuario, rol_usuario
            "#,
        )
        .bind(rol_usuario)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_nvl_usuario: i32,
        rol_usuario: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE nvl_usuario
            SET rol_usuario = $2
            WHERE id_nvl_usuario = $1
            RETURNING id_nvl_usuario, rol_usuario
            "#,
        )
        .bind(id_nvl_usuario)
        .bind(rol_usuario)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_nvl_usuario: i32,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM nvl_usuario WHERE id_nvl_usuario = $1")
            .bind(id_nvl_usuario)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
