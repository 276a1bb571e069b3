//! Entity rows to API models.
//!
//! Status and role columns are constrained by CHECKs in the schema, so a value
//! that fails to parse means the database was edited by hand.

use std::str::FromStr;

use chrono::Utc;

use crate::{
    domain::DomainError,
    entity::{
        cash_closings, order_items, orders, payments, products, sale_cart_items, users, vouchers,
    },
    error::{AppError, AppResult},
    models::{CartLine, CashClosing, Order, OrderItem, Payment, Product, User, Voucher},
};

fn parse_column<T>(column: &str, raw: &str) -> AppResult<T>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(|err| {
        AppError::Internal(anyhow::anyhow!("corrupt {column} column: {err}"))
    })
}

pub fn user_from_entity(model: users::Model) -> AppResult<User> {
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        role: parse_column("users.role", &model.role)?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub fn product_from_entity(model: products::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        purchase_price: model.purchase_price,
        selling_price: model.selling_price,
        stock: model.stock,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn cart_line_from_entity(model: sale_cart_items::Model) -> CartLine {
    CartLine {
        id: model.id,
        product_id: model.product_id,
        product_name: model.product_name,
        quantity: model.quantity,
        unit_price: model.unit_price,
        discount: model.discount,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn order_from_entity(model: orders::Model) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        invoice_number: model.invoice_number,
        total: model.total,
        status: parse_column("orders.status", &model.status)?,
        printed: model.printed,
        paid_at: model.paid_at.map(|at| at.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub fn order_item_from_entity(model: order_items::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        product_name: model.product_name,
        quantity: model.quantity,
        unit_price: model.unit_price,
        discount: model.discount,
        total: model.total,
    }
}

pub fn payment_from_entity(model: payments::Model) -> Payment {
    Payment {
        id: model.id,
        order_id: model.order_id,
        amount: model.amount,
        payment_method: model.payment_method,
        received_by: model.received_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn voucher_from_entity(model: vouchers::Model) -> AppResult<Voucher> {
    Ok(Voucher {
        id: model.id,
        voucher_number: model.voucher_number,
        voucher_type: parse_column("vouchers.voucher_type", &model.voucher_type)?,
        amount: model.amount,
        description: model.description,
        status: parse_column("vouchers.status", &model.status)?,
        printed: model.printed,
        created_by: model.created_by,
        processed_by: model.processed_by,
        processed_at: model.processed_at.map(|at| at.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub fn cash_closing_from_entity(model: cash_closings::Model) -> CashClosing {
    CashClosing {
        id: model.id,
        business_date: model.business_date,
        closing_cash: model.closing_cash,
        closed_by: model.closed_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
