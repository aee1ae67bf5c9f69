//! # Authentication Data Transfer Objects
//!
//! Request and response structures for the authentication and user
//! administration endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/auth/signup` - [`SignupRequest`] -> [`AuthResponse`]
//! - `POST /api/auth/login` - [`LoginRequest`] -> [`AuthResponse`]
//! - `POST /api/users` (admin) - [`CreateUserRequest`] -> [`UserInfo`]
//! - `PUT /api/users/{id}` (admin) - [`UpdateUserRequest`] -> [`UserInfo`]
//!
//! ## Wire Format
//!
//! All DTOs use **snake_case** field names in JSON (default serde behavior).
//! Optional fields are omitted when `None`.
//!
//! ```text
//! POST /api/auth/login
//! Content-Type: application/json
//!
//! {
//!   "email": "alice@example.com",
//!   "password": "MyPassword123!"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::model::store::models::User;
use crate::model::Role;

/// Login request with email and password.
///
/// Password is sent in plaintext over HTTPS and only ever compared against
/// the stored Argon2 hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup request for new user registration.
///
/// # Validation Rules (Server-Side)
///
/// - Name must not be empty
/// - Email must be valid format and not already registered
/// - Password must be at least 8 characters
/// - `admin` cannot be chosen at signup; admins are created by other admins or the CLI
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Alice",
///   "email": "alice@example.com",
///   "password": "SecurePassword123!",
///   "role": "supplier"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Manufacturer
}

/// Authentication response returned on successful login or signup.
///
/// The `token` field should be included in subsequent API requests as:
/// ```text
/// Authorization: Bearer <token>
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
    pub message: String,
}

/// User information (public, safe to send to client).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_admin: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_admin: user.is_admin,
            is_active: user.is_active,
            wallet_address: user.wallet_address.clone(),
            last_login: user.last_login.map(lib_utils::format_time),
            created_at: lib_utils::format_time(user.created_at),
        }
    }
}

/// Admin request to create a user directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

/// Admin request to change a user. Omitted fields stay as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
    pub wallet_address: Option<String>,
}

/// Standard error response for all API endpoints.
///
/// Produced by `AppError`'s `IntoResponse`:
///
/// ```json
/// {
///   "error": "Invalid email or password",
///   "code": "Unauthorized"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
