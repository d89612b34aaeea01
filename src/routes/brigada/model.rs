use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

// Social-service personnel behind the directory: advisors, careers and
// the student brigade members assigned to them.

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AsesorSs {
    pub id_asesor: String,
    pub nombre_asesor: String,
    pub puesto: String,
    pub descripcion: Option<String>,
    pub imagen_url: Option<String>,
    pub estatus: bool,
}

#[derive(Debug, Deserialize)]
pub struct CrearAsesorRequest {
    pub nombre_asesor: String,
    pub puesto: String,
    pub descripcion: Option<String>,
    pub imagen_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarAsesorRequest {
    pub nombre_asesor: Option<String>,
    pub puesto: Option<String>,
    pub descripcion: Option<String>,
    pub imagen_url: Option<String>,
    pub estatus: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Carrera {
    pub id_carrera: i32,
    pub nombre: String,
    pub url_icon: Option<String>,
    pub color_hex: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CrearCarreraRequest {
    pub nombre: String,
    pub url_icon: Option<String>,
    pub color_hex: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarCarreraRequest {
    pub nombre: Option<String>,
    pub url_icon: Option<String>,
    pub color_hex: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Brigadista {
    pub id_brigadista: String,
    pub nombre_completo: String,
    pub telefono: String,
    pub fecha_nacimiento: NaiveDate,
    pub imagen_url: Option<String>,
    pub periodo: Option<String>,
    pub id_carrera: i32,
}

#[derive(Debug, Deserialize)]
pub struct CrearBrigadistaRequest {
    pub nombre_completo: String,
    pub telefono: String,
    pub fecha_nacimiento: NaiveDate,
    pub imagen_url: Option<String>,
    pub periodo: Option<String>,
    pub id_carrera: i32,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarBrigadistaRequest {
    pub nombre_completo: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub imagen_url: Option<String>,
    pub periodo: Option<String>,
    pub id_carrera: Option<i32>,
}

const ASESOR_COLS: &str =
    "id_asesor, nombre_asesor, puesto, descripcion, imagen_url, estatus";
const CARRERA_COLS: &str = "id_carrera, nombre, url_icon, color_hex";
const BRIGADISTA_COLS: &str = r#"
    id_brigadista, nombre_completo, telefono, fecha_nacimiento,
    imagen_url, periodo, id_carrera
"#;

impl AsesorSs {
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ASESOR_COLS} FROM asesor_ss ORDER BY nombre_asesor"
        ))
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_asesor: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ASESOR_COLS} FROM asesor_ss WHERE id_asesor = $1"
        ))
        .bind(id_asesor)
        .fetch_optional(executor)
        .await
    }

    pub async fn name_taken<'e>(
        executor: impl PgExecutor<'e>,
        nombre_asesor: &str,
        exclude: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id_asesor FROM asesor_ss WHERE nombre_asesor = $1 AND id_asesor <> COALESCE($2, '') LIMIT 1",
        )
        .bind(nombre_asesor)
        .bind(exclude)
        .fetch_optional(executor)
        .await?;
        Ok(existing.is_some())
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_asesor: &str,
        req: &CrearAsesorRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO asesor_ss (id_asesor, nombre_asesor, puesto, descripcion, imagen_url, estatus)
            VALUES ($1, $2, $3, $4, $5, true)
            RETURNING {ASESOR_COLS}
            "#
        ))
        .bind(id_asesor)
        .bind(&req.nombre_asesor)
        .bind(&req.puesto)
        .bind(&req.descripcion)
        .bind(&req.imagen_url)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_asesor: &str,
        req: &ActualizarAsesorRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE asesor_ss
            SET nombre_asesor = COALESCE($2, nombre_asesor),
                puesto = COALESCE($3, puesto),
                descripcion = COALESCE($4, descripcion),
                imagen_url = COALESCE($5, imagen_url),
                estatus = COALESCE($6, estatus)
            WHERE id_asesor = $1
            RETURNING {ASESOR_COLS}
            "#
        ))
        .bind(id_asesor)
        .bind(&req.nombre_asesor)
        .bind(&req.puesto)
        .bind(&req.descripcion)
        .bind(&req.imagen_url)
        .bind(req.estatus)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_asesor: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM asesor_ss WHERE id_asesor = $1")
            .bind(id_asesor)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl Carrera {
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {CARRERA_COLS} FROM carrera ORDER BY nombre"))
            .fetch_all(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_carrera: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {CARRERA_COLS} FROM carrera WHERE id_carrera = $1"
        ))
        .bind(id_carrera)
        .fetch_optional(executor)
        .await
    }

    pub async fn name_taken<'e>(
        executor: impl PgExecutor<'e>,
        nombre: &str,
        exclude: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT id_carrera FROM carrera WHERE nombre = $1 AND id_carrera <> COALESCE($2, -1) LIMIT 1",
        )
        .bind(nombre)
        .bind(exclude)
        .fetch_optional(executor)
        .await?;
        Ok(existing.is_some())
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        req: &CrearCarreraRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO carrera (nombre, url_icon, color_hex)
            VALUES ($1, $2, $3)
            RETURNING {CARRERA_COLS}
            "#
        ))
        .bind(&req.nombre)
        .bind(&req.url_icon)
        .bind(&req.color_hex)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_carrera: i32,
        req: &ActualizarCarreraRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE carrera
            SET nombre = COALESCE($2, nombre),
                url_icon = COALESCE($3, url_icon),
                color_hex = COALESCE($4, color_hex)
            WHERE id_carrera = $1
            RETURNING {CARRERA_COLS}
            "#
        ))
        .bind(id_carrera)
        .bind(&req.nombre)
        .bind(&req.url_icon)
        .bind(&req.color_hex)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_carrera: i32,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM carrera WHERE id_carrera = $1")
            .bind(id_carrera)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl Brigadista {
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {BRIGADISTA_COLS} FROM brigadista ORDER BY nombre_completo"
        ))
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id_brigadista: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {BRIGADISTA_COLS} FROM brigadista WHERE id_brigadista = $1"
        ))
        .bind(id_brigadista)
        .fetch_optional(executor)
        .await
    }

    pub async fn phone_taken<'e>(
        executor: impl PgExecutor<'e>,
        telefono: &str,
        exclude: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id_brigadista FROM brigadista WHERE telefono = $1 AND id_brigadista <> COALESCE($2, '') LIMIT 1",
        )
        .bind(telefono)
        .bind(exclude)
        .fetch_optional(executor)
        .await?;
        Ok(existing.is_some())
    }

    pub async fn name_taken<'e>(
        executor: impl PgExecutor<'e>,
        nombre_completo: &str,
        exclude: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id_brigadista FROM brigadista WHERE nombre_completo = $1 AND id_brigadista <> COALESCE($2, '') LIMIT 1",
        )
        .bind(nombre_completo)
        .bind(exclude)
        .fetch_optional(executor)
        .await?;
        Ok(existing.is_some())
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        id_brigadista: &str,
        req: &CrearBrigadistaRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO brigadista
                (id_brigadista, nombre_completo, telefono, fecha_nacimiento,
                 imagen_url, periodo, id_carrera)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BRIGADISTA_COLS}
            "#
        ))
        .bind(id_brigadista)
        .bind(&req.nombre_completo)
        .bind(&req.telefono)
        .bind(req.fecha_nacimiento)
        .bind(&req.imagen_url)
        .bind(&req.periodo)
        .bind(req.id_carrera)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id_brigadista: &str,
        req: &ActualizarBrigadistaRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE brigadista
            SET nombre_completo = COALESCE($2, nombre_completo),
                telefono = COALESCE($3, telefono),
                fecha_nacimiento = COALESCE($4, fecha_nacimiento),
                imagen_url = COALESCE($5, imagen_url),
                periodo = COALESCE($6, periodo),
                id_carrera = COALESCE($7, id_carrera)
            WHERE id_brigadista = $1
            RETURNING {BRIGADISTA_COLS}
            "#
        ))
        .bind(id_brigadista)
        .bind(&req.nombre_completo)
        .bind(&req.telefono)
        .bind(req.fecha_nacimiento)
        .bind(&req.imagen_url)
        .bind(&req.periodo)
        .bind(req.id_carrera)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id_brigadista: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM brigadista WHERE id_brigadista = $1")
            .bind(id_brigadista)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
