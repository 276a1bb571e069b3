use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    domain::{OrderStatus, Role, money::order_total, numbering::INVOICE_PREFIX},
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        sale_cart_items::{Column as LineCol, Entity as SaleCartItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_any_role},
    models::OrderItem,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder, normalize_page},
    services::{
        mapping::{order_from_entity, order_item_from_entity},
        sale_service::SALE_ROLES,
        sequence::{NumberedDocument, next_document_number},
    },
    state::AppState,
};

pub const EMPTY_SALE: &str = "Veuillez ajouter au moins un produit";

/// Turns the caller's reserved cart lines into a pending invoice.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_any_role(user, SALE_ROLES)?;
    let txn = state.orm.begin().await?;

    let lines = SaleCartItems::find()
        .filter(LineCol::UserId.eq(user.user_id))
        .order_by_asc(LineCol::CreatedAt)
        .order_by_asc(LineCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if lines.is_empty() {
        return Err(AppError::BadRequest(EMPTY_SALE.into()));
    }

    let product_ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    let purchase_prices: HashMap<Uuid, i64> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product.purchase_price))
        .collect();

    let invoice_number =
        next_document_number(&txn, NumberedDocument::Invoice, INVOICE_PREFIX, state.today()).await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        invoice_number: Set(invoice_number),
        total: Set(order_total(lines.iter().map(|line| line.total))),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        printed: Set(false),
        paid_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(Some(line.product_id)),
            product_name: Set(line.product_name.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            purchase_price: Set(purchase_prices.get(&line.product_id).copied().unwrap_or(0)),
            discount: Set(line.discount),
            total: Set(line.total),
            position: Set(position as i32),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    // Stock was taken when the lines were added; consuming them must not give it back.
    SaleCartItems::delete_many()
        .filter(LineCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        invoice_number = %order.invoice_number,
        total = order.total,
        lines = items.len(),
        draft = payload.save_as_draft,
        "order created"
    );

    let message = if payload.save_as_draft {
        "Facture enregistrée"
    } else {
        "Facture créée"
    };
    Ok(ApiResponse::success(
        message,
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Admins see every order; other sellers only their own.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_any_role(user, SALE_ROLES)?;
    let (page, limit, offset) = normalize_page(query.page, query.per_page);

    let mut condition = Condition::all();
    if user.role != Role::Admin {
        condition = condition.add(OrderCol::UserId.eq(user.user_id));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Commandes",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn order_items(
    conn: &impl sea_orm::ConnectionTrait,
    order_id: Uuid,
) -> AppResult<Vec<OrderItem>> {
    Ok(OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Position)
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect())
}
