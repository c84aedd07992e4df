//! # User Operations
//!
//! Customer profiles. Deleting a user deletes their orders.

use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use orchard_core::validation::{validate_new_user, validate_user_update};
use orchard_core::{NewUser, User, UserUpdate};

/// Registers a user. Emails are unique, compared lowercase.
pub async fn create_user(state: &AppState, request: &NewUser) -> ApiResult<User> {
    let user = validate_new_user(request)?;
    let created = state.db.users().create(&user).await?;

    info!(user_id = %created.id, "create_user complete");
    Ok(created)
}

/// Gets a user with their purchase history and current order.
pub async fn get_user(state: &AppState, id: &str) -> ApiResult<User> {
    debug!(id = %id, "get_user");

    state
        .db
        .users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))
}

/// Changes profile fields. Order pointers and history are not editable.
pub async fn update_user(state: &AppState, id: &str, request: &UserUpdate) -> ApiResult<User> {
    let update = validate_user_update(request)?;
    let user = state.db.users().update_profile(id, &update).await?;

    info!(user_id = %id, "update_user complete");
    Ok(user)
}

/// Deletes a user and every order they placed.
pub async fn delete_user(state: &AppState, id: &str) -> ApiResult<()> {
    state.db.users().delete(id).await?;

    info!(user_id = %id, "delete_user complete");
    Ok(())
}
