use crate::env_var;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub metrics_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_var("SERVER_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            database_max_connections: env_var("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            metrics_enabled: env_var("METRICS_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(raw.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
