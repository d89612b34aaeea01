use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::services::images::is_hosted_url;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ServicioComercio {
    pub id_servicio: String,
    pub id_comercio: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CrearServicioRequest {
    pub id_comercio: String,
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarServicioRequest {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
}

const SELECT_COLS: &str = "id_servicio, id_comercio, nombre, descripcion, fecha_creacion";

impl ServicioComercio {
    pub async fn list_by_comercio<'e>(
        executor: impl PgExecutor<'e>,
        id_comercio: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLS} FROM servicios_comercio WHERE id_comercio = $1 ORDER BY fecha_creacion"
        ))
        .bind(id_comercio)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLS} FROM servicios_comercio WHERE id_servicio = $1"
        ))
        .bind(id_servicio)
        .fetch_optional(executor)
        .await
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio: &str,
        req: &CrearServicioRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO servicios_comercio (id_servicio, id_comercio, nombre, descripcion, fecha_creacion)
            VALUES ($1, $2, $3, $4, now())
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_servicio)
        .bind(&req.id_comercio)
        .bind(&req.nombre)
        .bind(&req.descripcion)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio: &str,
        req: &ActualizarServicioRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE servicios_comercio
            SET nombre = COALESCE($2, nombre),
                descripcion = COALESCE($3, descripcion)
            WHERE id_servicio = $1
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_servicio)
        .bind(&req.nombre)
        .bind(&req.descripcion)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM servicios_comercio WHERE id_servicio = $1")
            .bind(id_servicio)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Hosted URLs owned by this servicio through its opciones.
    pub async fn collect_subtree_images(&self, pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let urls: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT i.imagen_url
            FROM imagenes_servicios i
            JOIN opciones_servicio o ON o.id_opcion_servicio = i.id_opcion_servicio
            WHERE o.id_servicio = $1
            "#,
        )
        .bind(&self.id_servicio)
        .fetch_all(pool)
        .await?;
        Ok(urls.into_iter().filter(|u| is_hosted_url(u)).collect())
    }
}
