use config::Config;
use services::{images::ImageStorage, mailer::Mailer};
use sqlx::PgPool;

pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod utils;

pub mod routes;

#[cfg(test)]
pub mod test_support;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub images: ImageStorage,
    pub mailer: Mailer,
}
