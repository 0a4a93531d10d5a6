use crate::env_var;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env_var("JWT_SECRET")
                .unwrap_or_else(|| "change-me-in-production".to_string()),
            access_token_expiry: env_var("JWT_ACCESS_EXPIRY")
                .and_then(|s| s.parse().ok())
                .filter(|secs: &i64| *secs > 0)
                .unwrap_or(3600), // 1 hour
        }
    }
}
