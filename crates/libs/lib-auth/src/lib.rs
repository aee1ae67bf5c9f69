//! # Authentication Library
//!
//! Password hashing and JWT session tokens for AutoTrace users.

pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use pwd::{hash_password, verify_password, generate_temporary_password};
pub use token::{Claims, encode_jwt, decode_jwt};
