mod common;

use pos_backoffice::{
    domain::Role,
    dto::{
        auth::LoginRequest,
        products::CreateProductRequest,
        users::{CreateUserRequest, UpdateUserRequest},
    },
    error::AppError,
    middleware::auth::decode_token,
    services::{auth_service, product_service, user_service},
};

// Login, token claims, admin-only user management and product validation.
#[tokio::test]
async fn login_and_admin_guards() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin =
        common::create_user(&state, "Admin", "admin@test.local", "admin123", Role::Admin).await?;

    let session = auth_service::login_user(
        &state,
        LoginRequest {
            email: "  ADMIN@test.local ".into(),
            password: "admin123".into(),
        },
    )
    .await?
    .data
    .expect("session");
    assert_eq!(session.user.id, admin.user_id);
    assert_eq!(session.redirect_to, "/dashboard");
    let claims = decode_token(&session.token, &state.config.jwt_secret)?;
    assert_eq!(claims.sub, admin.user_id.to_string());
    assert_eq!(claims.role, "admin");

    let wrong = auth_service::login_user(
        &state,
        LoginRequest {
            email: "admin@test.local".into(),
            password: "nope-nope".into(),
        },
    )
    .await;
    let unknown = auth_service::login_user(
        &state,
        LoginRequest {
            email: "ghost@test.local".into(),
            password: "admin123".into(),
        },
    )
    .await;
    match (wrong, unknown) {
        (Err(AppError::Unauthorized(a)), Err(AppError::Unauthorized(b))) => assert_eq!(a, b),
        other => panic!("expected two identical 401s, got {other:?}"),
    }

    let cashier = user_service::create_user(
        &state,
        &admin,
        CreateUserRequest {
            name: "Caissier".into(),
            email: "Caissier@Test.local".into(),
            password: "caisse123".into(),
            role: Role::Caissier,
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(cashier.email, "caissier@test.local");
    assert_eq!(cashier.role, Role::Caissier);

    let duplicate = user_service::create_user(
        &state,
        &admin,
        CreateUserRequest {
            name: "Doublon".into(),
            email: "caissier@test.local".into(),
            password: "caisse123".into(),
            role: Role::Caissier,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let promoted = user_service::update_user(
        &state,
        &admin,
        cashier.id,
        UpdateUserRequest {
            role: Some(Role::Facturier),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(promoted.role, Role::Facturier);

    let self_delete = user_service::delete_user(&state, &admin, admin.user_id).await;
    assert!(matches!(self_delete, Err(AppError::BadRequest(_))));

    let seller = common::create_user(
        &state,
        "Facturier",
        "facturier@test.local",
        "facture123",
        Role::Facturier,
    )
    .await?;
    let not_admin = user_service::delete_user(&state, &seller, cashier.id).await;
    assert!(matches!(not_admin, Err(AppError::Forbidden)));

    let request = |purchase_price, selling_price| CreateProductRequest {
        name: "Sucre en morceaux".into(),
        purchase_price,
        selling_price,
        stock: 12,
    };
    let underpriced = product_service::create_product(&state, &admin, request(80_000, 80_000)).await;
    assert!(matches!(underpriced, Err(AppError::BadRequest(_))));

    let by_seller = product_service::create_product(&state, &seller, request(80_000, 95_000)).await;
    assert!(matches!(by_seller, Err(AppError::Forbidden)));

    product_service::create_product(&state, &admin, request(80_000, 95_000)).await?;
    let same_name = product_service::create_product(&state, &admin, request(70_000, 90_000)).await;
    assert!(matches!(same_name, Err(AppError::Conflict(_))));

    user_service::delete_user(&state, &admin, cashier.id).await?;
    Ok(())
}
