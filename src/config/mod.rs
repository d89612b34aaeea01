use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub activation_token_ttl_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub activation_base_url: String,
    pub activation_redirect_url: String,
    pub brevo_api_key: String,
    pub sender_email: String,
    pub sender_name: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .unwrap_or_else(|_| "8h".into())
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(8);
        let activation_ttl = env::var("ACTIVATION_TOKEN_TTL")
            .unwrap_or_else(|_| "30m".into())
            .trim_end_matches('m')
            .parse::<u64>()
            .unwrap_or(30);
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(8000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            activation_token_ttl_secs: activation_ttl * 60,
            cors_origins,
            activation_base_url: env::var("ACTIVATION_BASE_URL")?,
            activation_redirect_url: env::var("ACTIVATION_REDIRECT_URL")?,
            brevo_api_key: env::var("BREVO_APIKEY")?,
            sender_email: env::var("SENDER_EMAIL")?,
            sender_name: env::var("SENDER_NAME")?,
            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME")?,
            cloudinary_api_key: env::var("CLOUDINARY_API_KEY")?,
            cloudinary_api_secret: env::var("CLOUDINARY_API_SECRET")?,
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn activation_token_ttl(&self) -> Duration {
        Duration::from_secs(self.activation_token_ttl_secs)
    }

    pub fn allow_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
