mod common;

use pos_backoffice::{
    domain::Role,
    dto::{products::CreateProductRequest, sales::AddCartItemRequest, users::UpdateUserRequest},
    services::{product_service, sale_service, user_service},
    state::AppState,
};
use uuid::Uuid;

async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    Ok(product_service::get_product(state, product_id)
        .await?
        .data
        .expect("product")
        .stock)
}

// Removing a seller, or taking away their right to sell, gives their cart back to stock.
#[tokio::test]
async fn reserved_stock_returns_when_a_seller_goes_away() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin =
        common::create_user(&state, "Admin", "admin@test.local", "admin123", Role::Admin).await?;
    let leaving = common::create_user(
        &state,
        "Facturier A",
        "facturier.a@test.local",
        "facture123",
        Role::Facturier,
    )
    .await?;
    let demoted = common::create_user(
        &state,
        "Facturier B",
        "facturier.b@test.local",
        "facture123",
        Role::Facturier,
    )
    .await?;

    let product = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Lait concentré".into(),
            purchase_price: 40_000,
            selling_price: 60_000,
            stock: 10,
        },
    )
    .await?
    .data
    .expect("product");

    for (seller, quantity) in [(&leaving, 3), (&demoted, 4)] {
        sale_service::add_item(
            &state,
            seller,
            AddCartItemRequest {
                product_id: product.id,
                quantity,
                discount: 0,
            },
        )
        .await?;
    }
    assert_eq!(stock_of(&state, product.id).await?, 3);

    user_service::delete_user(&state, &admin, leaving.user_id).await?;
    assert_eq!(stock_of(&state, product.id).await?, 6);

    // Renaming keeps the cart; losing the seller role releases it.
    user_service::update_user(
        &state,
        &admin,
        demoted.user_id,
        UpdateUserRequest {
            name: Some("Facturier B2".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(stock_of(&state, product.id).await?, 6);

    user_service::update_user(
        &state,
        &admin,
        demoted.user_id,
        UpdateUserRequest {
            role: Some(Role::Caissier),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(stock_of(&state, product.id).await?, 10);

    let (lines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sale_cart_items")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(lines, 0);

    Ok(())
}
