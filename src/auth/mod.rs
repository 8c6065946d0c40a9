//! Authentication for the garden tracker
//!
//! Provides:
//! - JWT access/refresh token generation and validation
//! - Password hashing with Argon2

pub mod jwt;
pub mod password;

pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenKind};
pub use password::{hash_password, verify_password};
