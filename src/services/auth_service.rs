use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    dto::auth::{Claims, LoginRequest, LoginResponse},
    entity::users::{Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    services::mapping::user_from_entity,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Email ou mot de passe invalide";
const LOGIN_REDIRECT: &str = "/dashboard";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let Some(user) = user else {
        tracing::warn!(email = %email, "login with unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "login with wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let user = user_from_entity(user)?;
    let resp = issue_token(state, user)?;
    tracing::info!(user_id = %resp.user.id, role = %resp.user.role, "user logged in");

    Ok(ApiResponse::success("Connexion réussie", resp, Some(Meta::empty())))
}

/// Issue a fresh token for a caller whose current token is still valid.
pub async fn refresh_token(
    state: &AppState,
    auth: &AuthUser,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = current_user(state, auth).await?;
    let resp = issue_token(state, user)?;
    Ok(ApiResponse::success("Session prolongée", resp, Some(Meta::empty())))
}

pub async fn me(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user = current_user(state, auth).await?;
    Ok(ApiResponse::success("Utilisateur", user, None))
}

async fn current_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    let user = Users::find_by_id(auth.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Utilisateur introuvable".into()))?;
    user_from_entity(user)
}

fn issue_token(state: &AppState, user: User) -> AppResult<LoginResponse> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(Duration::hours(state.config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.as_str().to_string(),
        name: user.name.clone(),
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(LoginResponse {
        token,
        token_type: "Bearer".into(),
        expires_at,
        user,
        redirect_to: LOGIN_REDIRECT.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_hash_verifies_only_the_original_password() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("secret124", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("x", "plaintext"),
            Err(AppError::Internal(_))
        ));
    }
}
