use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::services::images::is_hosted_url;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ServicioComunidad {
    pub id_servicio_comunidad: String,
    pub titulo_servicio: String,
    pub descripcion: Option<String>,
    pub direccion: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub imagen_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub estatus: bool,
}

#[derive(Debug, Deserialize)]
pub struct CrearServicioComunidadRequest {
    pub titulo_servicio: String,
    pub descripcion: Option<String>,
    pub direccion: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub imagen_url: Option<String>,
    pub estatus: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarServicioComunidadRequest {
    pub titulo_servicio: Option<String>,
    pub descripcion: Option<String>,
    pub direccion: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub imagen_url: Option<String>,
    pub estatus: Option<bool>,
}

const SELECT_COLS: &str = r#"
    id_servicio_comunidad, titulo_servicio, descripcion, direccion,
    email, telefono, imagen_url, created_at, estatus
"#;

impl ServicioComunidad {
    pub async fn list<'e>(
        executor: impl PgExecutor<'e>,
        activos: Option<bool>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            SELECT {SELECT_COLS} FROM servicios_comunidad
            WHERE estatus = COALESCE($1, estatus)
            ORDER BY created_at
            OFFSET $2 LIMIT $3
            "#
        ))
        .bind(activos)
        .bind(skip)
        .bind(limit)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio_comunidad: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLS} FROM servicios_comunidad WHERE id_servicio_comunidad = $1"
        ))
        .bind(id_servicio_comunidad)
        .fetch_optional(executor)
        .await
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio_comunidad: &str,
        req: &CrearServicioComunidadRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO servicios_comunidad
                (id_servicio_comunidad, titulo_servicio, descripcion, direccion,
                 email, telefono, imagen_url, created_at, estatus)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now(), COALESCE($8, true))
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_servicio_comunidad)
        .bind(&req.titulo_servicio)
        .bind(&req.descripcion)
        .bind(&req.direccion)
        .bind(&req.email)
        .bind(&req.telefono)
        .bind(&req.imagen_url)
        .bind(req.estatus)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio_comunidad: &str,
        req: &ActualizarServicioComunidadRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE servicios_comunidad
            SET titulo_servicio = COALESCE($2, titulo_servicio),
                descripcion = COALESCE($3, descripcion),
                direccion = COALESCE($4, direccion),
                email = COALESCE($5, email),
                telefono = COALESCE($6, telefono),
                imagen_url = COALESCE($7, imagen_url),
                estatus = COALESCE($8, estatus)
            WHERE id_servicio_comunidad = $1
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_servicio_comunidad)
        .bind(&req.titulo_servicio)
        .bind(&req.descripcion)
        .bind(&req.direccion)
        .bind(&req.email)
        .bind(&req.telefono)
        .bind(&req.imagen_url)
        .bind(req.estatus)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_servicio_comunidad: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM servicios_comunidad WHERE id_servicio_comunidad = $1")
                .bind(id_servicio_comunidad)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }

    /// Cover plus gallery URLs hosted externally.
    pub async fn collect_image_urls(&self, pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let mut urls = Vec::new();

        if let Some(cover) = &self.imagen_url {
            if is_hosted_url(cover) {
                urls.push(cover.clone());
            }
        }

        let galeria: Vec<String> = sqlx::query_scalar(
            "SELECT imagen_url FROM imagenes_servicios_comunidad WHERE id_servicio_comunidad = $1",
        )
        .bind(&self.id_servicio_comunidad)
        .fetch_all(pool)
        .await?;
        urls.extend(galeria.into_iter().filter(|u| is_hosted_url(u)));

        Ok(urls)
    }
}
