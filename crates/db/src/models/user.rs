//! User entity model and DTOs.

use loanhub_core::types::{RecordId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- never hand this to a response type directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: RecordId,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// `"user"` or `"admin"`, see [`loanhub_core::roles`].
    pub role: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new user. The username is stored exactly as given;
/// callers trim it first.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}
