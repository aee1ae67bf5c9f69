//! # Auth Handler Tests
//!
//! Signup, login and logout through the full router.

mod login;
mod signup;

use lib_core::dto::SignupRequest;
use lib_core::model::Role;
use serde_json::{json, Value};

pub use crate::handlers::tests::TestApp;

pub fn signup_body(name: &str, email: &str, password: &str, role: Role) -> Value {
    serde_json::to_value(SignupRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
    })
    .unwrap()
}

pub fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}
