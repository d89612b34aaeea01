use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::services::images::is_hosted_url;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct OpcionServicio {
    pub id_opcion_servicio: String,
    pub id_servicio: String,
    pub nombre_opcion: String,
    pub descripcion: Option<String>,
    pub precio: f64,
    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CrearOpcionRequest {
    pub id_servicio: String,
    pub nombre_opcion: String,
    pub descripcion: Option<String>,
    pub precio: f64,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarOpcionRequest {
    pub nombre_opcion: Option<String>,
    pub descripcion: Option<String>,
    pub precio: Option<f64>,
}

const SELECT_COLS: &str =
    "id_opcion_servicio, id_servicio, nombre_opcion, descripcion, precio, fecha_creacion";

impl OpcionServicio {
    pub async fn list_by_servicio<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLS} FROM opciones_servicio WHERE id_servicio = $1 ORDER BY fecha_creacion"
        ))
        .bind(id_servicio)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_opcion_servicio: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLS} FROM opciones_servicio WHERE id_opcion_servicio = $1"
        ))
        .bind(id_opcion_servicio)
        .fetch_optional(executor)
        .await
    }

    pub async fn name_taken<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio: &str,
        nombre_opcion: &str,
        exclude: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id_opcion_servicio FROM opciones_servicio
            WHERE id_servicio = $1 AND nombre_opcion = $2
              AND id_opcion_servicio <> COALESCE($3, '')
            LIMIT 1
            "#,
        )
        .bind(id_servicio)
        .bind(nombre_opcion)
        .bind(exclude)
        .fetch_optional(executor)
        .await?;

        Ok(existing.is_some())
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_opcion_servicio: &str,
        req: &CrearOpcionRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO opciones_servicio
                (id_opcion_servicio, id_servicio, nombre_opcion, descripcion, precio, fecha_creacion)
            VALUES ($1, $2, $3, $4, $5, now())
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_opcion_servicio)
        .bind(&req.id_servicio)
        .bind(&req.nombre_opcion)
        .bind(&req.descripcion)
        .bind(req.precio)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_opcion_servicio: &str,
        req: &ActualizarOpcionRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE opciones_servicio
            SET nombre_opcion = COALESCE($2, nombre_opcion),
                descripcion = COALESCE($3, descripcion),
                precio = COALESCE($4, precio)
            WHERE id_opcion_servicio = $1
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_opcion_servicio)
        .bind(&req.nombre_opcion)
        .bind(&req.descripcion)
        .bind(req.precio)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_opcion_servicio: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM opciones_servicio WHERE id_opcion_servicio = $1")
            .bind(id_opcion_servicio)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn collect_image_urls(&self, pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let urls: Vec<String> = sqlx::query_scalar(
            "SELECT imagen_url FROM imagenes_servicios WHERE id_opcion_servicio = $1",
        )
        .bind(&self.id_opcion_servicio)
        .fetch_all(pool)
        .await?;
        Ok(urls.into_iter().filter(|u| is_hosted_url(u)).collect())
    }
}
