use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CategoriaComercio {
    pub id_categoria: i32,
    pub nombre_categoria: String,
    pub color_hex: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CrearCategoriaRequest {
    pub nombre_categoria: String,
    pub color_hex: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarCategoriaRequest {
    pub nombre_categoria: Option<String>,
    pub color_hex: Option<String>,
}

impl CategoriaComercio {
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id_categoria, nombre_categoria, color_hex FROM categorias_comercio ORDER BY id_categoria",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_categoria: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id_categoria, nombre_categoria, color_hex FROM categorias_comercio WHERE id_categoria = $1",
        )
        .bind(id_categoria)
        .fetch_optional(executor)
        .await
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        req: &CrearCategoriaRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO categorias_comercio (nombre_categoria, color_hex)
            VALUES ($1, $2)
            RETURNING id_categoria, nombre_categoria, color_hex
            "#,
        )
        .bind(&req.nombre_categoria)
        .bind(&req.color_hex)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_categoria: i32,
        req: &ActualizarCategoriaRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE categorias_comercio
            SET nombre_categoria = COALESCE($2, nombre_categoria),
                color_hex = COALESCE($3, color_hex)
            WHERE id_categoria = $1
            RETURNING id_categoria, nombre_categoria, color_hex
            "#,
        )
        .bind(id_categoria)
        .bind(&req.nombre_categoria)
        .bind(&req.color_hex)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_categoria: i32,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categorias_comercio WHERE id_categoria = $1")
            .bind(id_categoria)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
