//! Server half of the stock ledger: every cart line holds stock that was
//! already taken off the product, and giving a line back returns it.

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    domain::{
        Amount, Role, line_total,
        money::order_total,
        validation::{insufficient_stock, validate_discount, validate_quantity},
    },
    dto::sales::{AddCartItemRequest, CartCleared, CartMovement, CartView},
    entity::{
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sale_cart_items::{ActiveModel as LineActive, Column as LineCol, Entity as SaleCartItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_any_role},
    models::CartLine,
    response::{ApiResponse, Meta},
    services::{
        mapping::{cart_line_from_entity, product_from_entity},
        product_service::PRODUCT_NOT_FOUND,
    },
    state::AppState,
};

pub const SALE_ROLES: &[Role] = &[Role::Admin, Role::Facturier];

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    ensure_any_role(user, SALE_ROLES)?;
    let items: Vec<CartLine> = SaleCartItems::find()
        .filter(LineCol::UserId.eq(user.user_id))
        .order_by_asc(LineCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(cart_line_from_entity)
        .collect();
    let total: Amount = order_total(items.iter().map(|line| line.total));
    Ok(ApiResponse::success("Panier", CartView { items, total }, None))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartMovement>> {
    ensure_any_role(user, SALE_ROLES)?;
    let AddCartItemRequest {
        product_id,
        quantity,
        discount,
    } = payload;
    validate_quantity(quantity)?;
    validate_discount(discount)?;

    let txn = state.orm.begin().await?;

    // Conditional decrement: never reads stock and writes it back.
    let reserved = Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(quantity))
        .col_expr(ProdCol::UpdatedAt, Expr::current_timestamp().into())
        .filter(ProdCol::Id.eq(product_id))
        .filter(ProdCol::Stock.gte(quantity))
        .exec(&txn)
        .await?;

    if reserved.rows_affected == 0 {
        return match Products::find_by_id(product_id).one(&txn).await? {
            None => Err(AppError::not_found(PRODUCT_NOT_FOUND)),
            Some(product) => {
                tracing::warn!(
                    product_id = %product_id,
                    requested = quantity,
                    available = product.stock,
                    "stock reservation refused"
                );
                Err(insufficient_stock(product.stock).into())
            }
        };
    }

    let product = find_product(&txn, product_id).await?;
    let total = line_total(product.selling_price, quantity, discount)?;
    let line = LineActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product.id),
        product_name: Set(product.name.clone()),
        quantity: Set(quantity),
        unit_price: Set(product.selling_price),
        discount: Set(discount),
        total: Set(total),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::debug!(product_id = %product.id, quantity, stock = product.stock, "stock reserved");
    Ok(ApiResponse::success(
        "Produit ajouté",
        CartMovement {
            line: cart_line_from_entity(line),
            product: product_from_entity(product),
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<CartMovement>> {
    ensure_any_role(user, SALE_ROLES)?;
    let txn = state.orm.begin().await?;

    let line = SaleCartItems::find_by_id(line_id)
        .filter(LineCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Ligne de vente introuvable"))?;

    restore_stock(&txn, line.product_id, line.quantity).await?;
    let product = find_product(&txn, line.product_id).await?;
    let removed = cart_line_from_entity(line.clone());
    line.delete(&txn).await?;

    txn.commit().await?;

    tracing::debug!(product_id = %product.id, quantity = removed.quantity, stock = product.stock, "stock restored");
    Ok(ApiResponse::success(
        "Produit retiré",
        CartMovement {
            line: removed,
            product: product_from_entity(product),
        },
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartCleared>> {
    ensure_any_role(user, SALE_ROLES)?;
    let txn = state.orm.begin().await?;
    let restored_lines = release_cart(&txn, user.user_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Panier vidé",
        CartCleared { restored_lines },
        Some(Meta::empty()),
    ))
}

/// Gives every line reserved by `user_id` back to stock and drops the lines.
///
/// Runs inside the caller's transaction so that removing a seller and
/// releasing what they held commit together.
pub async fn release_cart(txn: &DatabaseTransaction, user_id: Uuid) -> AppResult<usize> {
    let lines = SaleCartItems::find()
        .filter(LineCol::UserId.eq(user_id))
        .lock(LockType::Update)
        .all(txn)
        .await?;

    for line in &lines {
        restore_stock(txn, line.product_id, line.quantity).await?;
    }
    SaleCartItems::delete_many()
        .filter(LineCol::UserId.eq(user_id))
        .exec(txn)
        .await?;

    if !lines.is_empty() {
        tracing::debug!(%user_id, lines = lines.len(), "reserved stock released");
    }
    Ok(lines.len())
}

async fn restore_stock(txn: &DatabaseTransaction, product_id: Uuid, quantity: i32) -> AppResult<()> {
    Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(quantity))
        .col_expr(ProdCol::UpdatedAt, Expr::current_timestamp().into())
        .filter(ProdCol::Id.eq(product_id))
        .exec(txn)
        .await?;
    Ok(())
}

async fn find_product(txn: &DatabaseTransaction, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::not_found(PRODUCT_NOT_FOUND))
}
