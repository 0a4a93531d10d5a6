use sqlx::PgPool;
use tracing::{info, instrument, warn};
use warehouse_auth::create_access_token;
use warehouse_config::JwtConfig;
use warehouse_core::{AppError, verify_password};
use warehouse_models::{LoginRequest, LoginResponse, ProfileResponse};

use crate::metrics::{track_user_login_failure, track_user_login_success};
use crate::modules::users::service as users_service;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(username = %dto.username))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let account: Option<(i32, String, bool)> =
            sqlx::query_as("SELECT id, password, is_active FROM users WHERE username = $1")
                .bind(&dto.username)
                .fetch_optional(db)
                .await?;

        let Some((user_id, password_hash, is_active)) = account else {
            warn!("login failed: unknown user");
            track_user_login_failure("unknown_user");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &password_hash)? {
            warn!(user_id, "login failed: wrong password");
            track_user_login_failure("invalid_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !is_active {
            warn!(user_id, "login failed: account disabled");
            track_user_login_failure("inactive");
            return Err(AppError::unauthorized("Account is disabled"));
        }

        let user = users_service::get_user(db, user_id).await?;
        let access_token = create_access_token(user.id, &user.username, user.role_id, jwt_config)?;

        info!(user_id, role_id = ?user.role_id, "user logged in");
        track_user_login_success();

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
        })
    }

    /// The account as currently stored, with the permission names of its role.
    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, user_id: i32) -> Result<ProfileResponse, AppError> {
        let user = users_service::get_user(db, user_id).await?;

        let permissions: Vec<String> = match user.role_id {
            Some(role_id) => {
                sqlx::query_scalar(
                    "SELECT p.name FROM permissions p \
                     JOIN role_permissions rp ON rp.permission_id = p.id \
                     WHERE rp.role_id = $1 ORDER BY p.id",
                )
                .bind(role_id)
                .fetch_all(db)
                .await?
            }
            None => Vec::new(),
        };

        Ok(ProfileResponse { user, permissions })
    }
}
