use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

/// Gallery image attached to a business.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ImagenComercio {
    pub id_imagen: String,
    pub id_comercio: String,
    pub imagen_url: String,
    pub descripcion: Option<String>,
    pub estatus: String,
    pub public_id: String,
}

/// Gallery image attached to a service option.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ImagenServicio {
    pub id_imagen: String,
    pub id_opcion_servicio: String,
    pub imagen_url: String,
    pub created_at: DateTime<Utc>,
    pub public_id: String,
}

/// Free-standing image outside any listing (icons, banners).
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ImagenGeneral {
    pub id_imagen: String,
    pub imagen_url: String,
    pub created_at: DateTime<Utc>,
    pub public_id: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ImagenServicioComunidad {
    pub id_imagen: String,
    pub id_servicio_comunidad: String,
    pub imagen_url: String,
    pub descripcion: Option<String>,
    pub estatus: String,
    pub created_at: DateTime<Utc>,
    pub public_id: String,
}

/// Remote image whose deletion failed during a cascading cleanup. The
/// row delete never waits for the provider; leftovers are recorded here
/// so a later sweep can reconcile them.
#[derive(Debug, Serialize, FromRow)]
pub struct ImagenHuerfana {
    pub id: i32,
    pub imagen_url: String,
    pub motivo: String,
    pub failed_at: DateTime<Utc>,
}

impl ImagenComercio {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
        id_comercio: &str,
        imagen_url: &str,
        public_id: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO imagenes_comercio (id_imagen, id_comercio, imagen_url, estatus, public_id)
            VALUES ($1, $2, $3, 'publica', $4)
            RETURNING id_imagen, id_comercio, imagen_url, descripcion, estatus, public_id
            "#,
        )
        .bind(id_imagen)
        .bind(id_comercio)
        .bind(imagen_url)
        .bind(public_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id_imagen, id_comercio, imagen_url, descripcion, estatus, public_id
            FROM imagenes_comercio WHERE id_imagen = $1
            "#,
        )
        .bind(id_imagen)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM imagenes_comercio WHERE id_imagen = $1")
            .bind(id_imagen)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl ImagenServicio {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
        id_opcion_servicio: &str,
        imagen_url: &str,
        public_id: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO imagenes_servicios (id_imagen, id_opcion_servicio, imagen_url, created_at, public_id)
            VALUES ($1, $2, $3, now(), $4)
            RETURNING id_imagen, id_opcion_servicio, imagen_url, created_at, public_id
            "#,
        )
        .bind(id_imagen)
        .bind(id_opcion_servicio)
        .bind(imagen_url)
        .bind(public_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id_imagen, id_opcion_servicio, imagen_url, created_at, public_id
            FROM imagenes_servicios WHERE id_imagen = $1
            "#,
        )
        .bind(id_imagen)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM imagenes_servicios WHERE id_imagen = $1")
            .bind(id_imagen)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl ImagenGeneral {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
        imagen_url: &str,
        public_id: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO imagenes_general (id_imagen, imagen_url, created_at, public_id)
            VALUES ($1, $2, now(), $3)
            RETURNING id_imagen, imagen_url, created_at, public_id
            "#,
        )
        .bind(id_imagen)
        .bind(imagen_url)
        .bind(public_id)
        .fetch_one(executor)
        .await
    }
}

impl ImagenServicioComunidad {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
        id_servicio_comunidad: &str,
        imagen_url: &str,
        public_id: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO imagenes_servicios_comunidad
                (id_imagen, id_servicio_comunidad, imagen_url, estatus, created_at, public_id)
            VALUES ($1, $2, $3, 'publica', now(), $4)
            RETURNING id_imagen, id_servicio_comunidad, imagen_url, descripcion, estatus,
                      created_at, public_id
            "#,
        )
        .bind(id_imagen)
        .bind(id_servicio_comunidad)
        .bind(imagen_url)
        .bind(public_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id_imagen, id_servicio_comunidad, imagen_url, descripcion, estatus,
                   created_at, public_id
            FROM imagenes_servicios_comunidad WHERE id_imagen = $1
            "#,
        )
        .bind(id_imagen)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_imagen: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM imagenes_servicios_comunidad WHERE id_imagen = $1")
            .bind(id_imagen)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl ImagenHuerfana {
    /// Persists every URL the remote host failed to delete, tagged with
    /// the operation that stranded it. A no-op on an empty slice.
    pub async fn record_many<'e>(
        executor: impl PgExecutor<'e>,
        urls: &[String],
        motivo: &str,
    ) -> Result<(), sqlx::Error> {
        if urls.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO imagenes_huerfanas (imagen_url, motivo, failed_at)
            SELECT url, $2, now() FROM UNNEST($1::text[]) AS url
            "#,
        )
        .bind(urls)
        .bind(motivo)
        .execute(executor)
        .await?;

        tracing::warn!(
            "{} imagen(es) quedaron huérfanas tras {}; registradas para limpieza posterior",
            urls.len(),
            motivo,
        );
        Ok(())
    }
}
