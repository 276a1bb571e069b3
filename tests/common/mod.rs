#![allow(dead_code)]

use pos_backoffice::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    domain::Role,
    middleware::auth::AuthUser,
    services::auth_service::hash_password,
    state::AppState,
};
use uuid::Uuid;

/// Connects to the test database, or `None` when none is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    run_migrations(&pool).await?;
    sqlx::query(
        "TRUNCATE TABLE cash_closings, payments, order_items, orders, sale_cart_items, vouchers, products, users CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(Some(AppState::new(pool, AppConfig::for_database(database_url))?))
}

pub async fn create_user(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(hash_password(password)?)
    .bind(role.as_str())
    .execute(&state.pool)
    .await?;

    Ok(AuthUser {
        user_id: id,
        role,
        name: name.to_string(),
    })
}
