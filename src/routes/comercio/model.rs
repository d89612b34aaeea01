use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};

use crate::services::images::is_hosted_url;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Comercio {
    pub id_comercio: String,
    pub id_categoria: i32,
    pub nombre_comercio: String,
    pub descripcion_comercio: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub imagen_url: String,
    pub created_at: DateTime<Utc>,
    pub id_usuario: String,
}

#[derive(Debug, Deserialize)]
pub struct CrearComercioRequest {
    pub id_categoria: i32,
    pub nombre_comercio: String,
    pub descripcion_comercio: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub imagen_url: String,
    pub id_usuario: String,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarComercioRequest {
    pub id_categoria: Option<i32>,
    pub nombre_comercio: Option<String>,
    pub descripcion_comercio: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub imagen_url: Option<String>,
}

/// Every externally hosted image URL owned transitively by a comercio,
/// plus subtree counts for the deletion log.
#[derive(Debug, Default)]
pub struct SubtreeImages {
    pub urls: Vec<String>,
    pub servicios: usize,
    pub opciones: usize,
}

const SELECT_COLS: &str = r#"
    id_comercio, id_categoria, nombre_comercio, descripcion_comercio,
    telefono, email, direccion, imagen_url, created_at, id_usuario
"#;

impl Comercio {
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLS} FROM comercios ORDER BY created_at"
        ))
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_comercio: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLS} FROM comercios WHERE id_comercio = $1"
        ))
        .bind(id_comercio)
        .fetch_optional(executor)
        .await
    }

    pub async fn list_by_owner<'e>(
        executor: impl PgExecutor<'e>,
        id_usuario: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLS} FROM comercios WHERE id_usuario = $1 ORDER BY created_at"
        ))
        .bind(id_usuario)
        .fetch_all(executor)
        .await
    }

    /// Name uniqueness is per owner; `exclude` skips the row being
    /// updated.
    pub async fn name_taken<'e>(
        executor: impl PgExecutor<'e>,
        id_usuario: &str,
        nombre_comercio: &str,
        exclude: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id_comercio FROM comercios
            WHERE id_usuario = $1 AND nombre_comercio = $2 AND id_comercio <> COALESCE($3, '')
            LIMIT 1
            "#,
        )
        .bind(id_usuario)
        .bind(nombre_comercio)
        .bind(exclude)
        .fetch_optional(executor)
        .await?;

        Ok(existing.is_some())
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_comercio: &str,
        req: &CrearComercioRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO comercios
                (id_comercio, id_categoria, nombre_comercio, descripcion_comercio,
                 telefono, email, direccion, imagen_url, created_at, id_usuario)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), $9)
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_comercio)
        .bind(req.id_categoria)
        .bind(&req.nombre_comercio)
        .bind(&req.descripcion_comercio)
        .bind(&req.telefono)
        .bind(&req.email)
        .bind(&req.direccion)
        .bind(&req.imagen_url)
        .bind(&req.id_usuario)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_comercio: &str,
        req: &ActualizarComercioRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE comercios
            SET id_categoria = COALESCE($2, id_categoria),
                nombre_comercio = COALESCE($3, nombre_comercio),
                descripcion_comercio = COALESCE($4, descripcion_comercio),
                telefono = COALESCE($5, telefono),
                email = COALESCE($6, email),
                direccion = COALESCE($7, direccion),
                imagen_url = COALESCE($8, imagen_url)
            WHERE id_comercio = $1
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(id_comercio)
        .bind(req.id_categoria)
        .bind(&req.nombre_comercio)
        .bind(&req.descripcion_comercio)
        .bind(&req.telefono)
        .bind(&req.email)
        .bind(&req.direccion)
        .bind(&req.imagen_url)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_comercio: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comercios WHERE id_comercio = $1")
            .bind(id_comercio)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_cover_url<'e>(
        executor: impl PgExecutor<'e>,
        id_comercio: &str,
        imagen_url: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE comercios SET imagen_url = $2 WHERE id_comercio = $1")
            .bind(id_comercio)
            .bind(imagen_url)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Walks the ownership tree (cover, gallery, servicio -> opcion ->
    /// imagenes) collecting every hosted URL. Runs before the row
    /// delete so the external cleanup has the full list. URLs outside
    /// the image host never enter the list: there is nothing remote to
    /// delete, and they must not end up in `imagenes_huerfanas`.
    pub async fn collect_subtree_images(&self, pool: &PgPool) -> Result<SubtreeImages, sqlx::Error> {
        let mut subtree = SubtreeImages::default();

        if is_hosted_url(&self.imagen_url) {
            subtree.urls.push(self.imagen_url.clone());
        }

        let galeria: Vec<String> =
            sqlx::query_scalar("SELECT imagen_url FROM imagenes_comercio WHERE id_comercio = $1")
                .bind(&self.id_comercio)
                .fetch_all(pool)
                .await?;
        subtree.urls.extend(galeria.into_iter().filter(|u| is_hosted_url(u)));

        let servicios: Vec<String> =
            sqlx::query_scalar("SELECT id_servicio FROM servicios_comercio WHERE id_comercio = $1")
                .bind(&self.id_comercio)
                .fetch_all(pool)
                .await?;
        subtree.servicios = servicios.len();

        for id_servicio in &servicios {
            let opciones: Vec<String> = sqlx::query_scalar(
                "SELECT id_opcion_servicio FROM opciones_servicio WHERE id_servicio = $1",
            )
            .bind(id_servicio)
            .fetch_all(pool)
            .await?;
            subtree.opciones += opciones.len();

            for id_opcion in &opciones {
                let imagenes: Vec<String> = sqlx::query_scalar(
                    "SELECT imagen_url FROM imagenes_servicios WHERE id_opcion_servicio = $1",
                )
                .bind(id_opcion)
                .fetch_all(pool)
                .await?;
                subtree.urls.extend(imagenes.into_iter().filter(|u| is_hosted_url(u)));
            }
        }

        Ok(subtree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seed_user;
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    async fn subtree_collection_skips_urls_outside_the_image_host(pool: PgPool) {
        let owner = seed_user(&pool, "duenio@negocios.mx", true).await;
        let categoria: i32 = sqlx::query_scalar(
            "INSERT INTO categorias_comercio (nombre_categoria) VALUES ('Comida') RETURNING id_categoria",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let id_comercio = Uuid::new_v4().to_string();
        let comercio = Comercio::create(
            &pool,
            &id_comercio,
            &CrearComercioRequest {
                id_categoria: categoria,
                nombre_comercio: "Tacos La Esquina".into(),
                descripcion_comercio: "Tacos".into(),
                telefono: None,
                email: None,
                direccion: None,
                // a placeholder cover has nothing remote to delete
                imagen_url: "https://cdn.example.com/placeholder.png".into(),
                id_usuario: owner,
            },
        )
        .await
        .unwrap();

        let hosted = "https://res.cloudinary.com/demo/image/upload/comercios/a.jpg";
        for (id, url) in [("img-1", hosted), ("img-2", "https://imgur.com/externa.jpg")] {
            sqlx::query(
                "INSERT INTO imagenes_comercio (id_imagen, id_comercio, imagen_url, estatus, public_id)
                 VALUES ($1, $2, $3, 'publica', 'pid')",
            )
            .bind(id)
            .bind(&id_comercio)
            .bind(url)
            .execute(&pool)
            .await
            .unwrap();
        }

        let subtree = comercio.collect_subtree_images(&pool).await.unwrap();
        assert_eq!(subtree.urls, vec![hosted.to_string()]);
    }
}
