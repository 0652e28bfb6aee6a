//! Row types that never leave the db/api boundary as-is.

use chrono::NaiveDateTime;
use trial_types::models::{User, UserId};
use trial_types::status::Role;

/// A `users` row including the password hash.
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub name: String,
    pub contact: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            contact: row.contact,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Fields for inserting a `users` row.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub contact: &'a str,
    pub role: Role,
}
