use pos_backoffice::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    domain::Role,
    services::auth_service::hash_password,
    telemetry::init_tracing,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&pool).await?;

    let accounts = [
        ("Administrateur", "admin@example.com", "admin123", Role::Admin),
        ("Caissier", "caissier@example.com", "caisse123", Role::Caissier),
        ("Facturier", "facturier@example.com", "facture123", Role::Facturier),
        ("Gestionnaire des bons", "bons@example.com", "bons123", Role::GestionnaireBon),
    ];
    for (name, email, password, role) in accounts {
        let id = ensure_user(&pool, name, email, password, role).await?;
        tracing::info!(%id, email, role = %role, "account ready");
    }

    seed_products(&pool).await?;
    tracing::info!("seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    // (name, purchase price, selling price, stock), amounts in centimes.
    let products = [
        ("Riz parfumé 25 kg", 1_800_000, 2_150_000, 40),
        ("Huile végétale 5 L", 550_000, 675_000, 60),
        ("Sucre en morceaux 1 kg", 70_000, 90_000, 120),
        ("Savon de Marseille", 25_000, 35_000, 200),
        ("Lait en poudre 400 g", 180_000, 225_000, 8),
    ];

    for (name, purchase_price, selling_price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, purchase_price, selling_price, stock)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(purchase_price as i64)
        .bind(selling_price as i64)
        .bind(stock as i32)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = products.len(), "products seeded");
    Ok(())
}
