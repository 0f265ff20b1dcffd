use std::path::PathBuf;

use anyhow::Context;

/// Server configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid PORT value: {raw}"))?,
            Err(_) => 3001,
        };
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://freelancebox.db".to_string());
        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        let cors_origin = std::env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty());

        Ok(Self {
            host,
            port,
            database_url,
            upload_dir,
            cors_origin,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
