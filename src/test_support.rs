//! Shared fixtures for the database-backed tests.

use sqlx::PgPool;

use crate::{
    AppState,
    config::Config,
    services::{images::ImageStorage, mailer::Mailer},
};

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".into(),
        jwt_secret: "clave-de-prueba".into(),
        jwt_expiration_secs: 8 * 3600,
        activation_token_ttl_secs: 30 * 60,
        server_host: "127.0.0.1".into(),
        server_port: 8000,
        cors_origins: vec!["*".into()],
        activation_base_url: "http://localhost:8000".into(),
        activation_redirect_url: "http://localhost:4200/".into(),
        brevo_api_key: "sin-clave".into(),
        sender_email: "pruebas@example.com".into(),
        sender_name: "Pruebas".into(),
        cloudinary_cloud_name: "demo".into(),
        cloudinary_api_key: "key".into(),
        cloudinary_api_secret: "secret".into(),
    }
}

/// App state over the given pool; the outbound clients point at dummy
/// credentials, so anything they send simply fails and gets logged.
pub fn test_state(pool: PgPool) -> AppState {
    let config = test_config();
    AppState {
        images: ImageStorage::new(&config).expect("image client"),
        mailer: Mailer::new(&config).expect("mailer client"),
        pool,
        config,
    }
}

/// Inserts a user level and a user row, returning the user id.
pub async fn seed_user(pool: &PgPool, email: &str, activo: bool) -> String {
    let nivel: i32 = sqlx::query_scalar(
        "INSERT INTO nvl_usuario (rol_usuario) VALUES ('usuario') RETURNING id_nvl_usuario",
    )
    .fetch_one(pool)
    .await
    .expect("seed nivel");

    let id_usuario = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO usuario
            (id_usuario, id_nvl_usuario, email, password_hash, nombre_completo,
             provider, fecha_creacion, estatus)
        VALUES ($1, $2, $3, 'hash', 'Cuenta de Prueba', 'local', now(), $4)
        "#,
    )
    .bind(&id_usuario)
    .bind(nivel)
    .bind(email)
    .bind(activo)
    .execute(pool)
    .await
    .expect("seed usuario");

    id_usuario
}
