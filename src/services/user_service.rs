use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    domain::validation::{validate_email, validate_password},
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::users::{ActiveModel, Column, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        auth_service::hash_password,
        mapping::user_from_entity,
        sale_service::{SALE_ROLES, release_cart},
    },
    state::AppState,
};

const USER_NOT_FOUND: &str = "Utilisateur introuvable";

pub async fn list_users(
    state: &AppState,
    auth: &AuthUser,
    query: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(auth)?;
    let (page, limit, offset) = query.normalize();

    let finder = Users::find().order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Utilisateurs",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user(state: &AppState, auth: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    ensure_admin(auth)?;
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;
    Ok(ApiResponse::success("Utilisateur", user_from_entity(user)?, None))
}

pub async fn create_user(
    state: &AppState,
    auth: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(auth)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Le nom est requis".into()));
    }
    let email = payload.email.trim().to_lowercase();
    validate_email(&email)?;
    validate_password(&payload.password)?;
    ensure_email_free(state, &email, None).await?;

    let user = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        role: Set(payload.role.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.id, role = %user.role, created_by = %auth.user_id, "user created");
    Ok(ApiResponse::success(
        "Utilisateur créé",
        user_from_entity(user)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(auth)?;
    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Le nom est requis".into()));
        }
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        validate_email(&email)?;
        ensure_email_free(state, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        validate_password(&password)?;
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(role) = payload.role {
        active.role = Set(role.as_str().to_string());
    }

    // A user who can no longer sell gives back whatever their cart still holds.
    let txn = state.orm.begin().await?;
    if payload.role.is_some_and(|role| !SALE_ROLES.contains(&role)) {
        release_cart(&txn, id).await?;
    }
    let user = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Utilisateur mis à jour",
        user_from_entity(user)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(auth)?;
    if id == auth.user_id {
        return Err(AppError::BadRequest(
            "Vous ne pouvez pas supprimer votre propre compte".into(),
        ));
    }

    let (referenced,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (SELECT 1 FROM orders WHERE user_id = $1)
            OR EXISTS (SELECT 1 FROM payments WHERE received_by = $1)
            OR EXISTS (SELECT 1 FROM vouchers WHERE created_by = $1 OR processed_by = $1)
            OR EXISTS (SELECT 1 FROM cash_closings WHERE closed_by = $1)
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;
    if referenced {
        return Err(AppError::Conflict(
            "Cet utilisateur a déjà enregistré des opérations".into(),
        ));
    }

    // Cart lines cascade with the user; their stock has to go back first.
    let txn = state.orm.begin().await?;
    let released = release_cart(&txn, id).await?;
    let result = Users::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found(USER_NOT_FOUND));
    }
    txn.commit().await?;

    tracing::info!(user_id = %id, deleted_by = %auth.user_id, released, "user deleted");
    Ok(ApiResponse::success(
        "Utilisateur supprimé",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Users::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict("Cet email est déjà utilisé".into()));
    }
    Ok(())
}
