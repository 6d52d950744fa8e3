//! Password hashing and password policy.
//!
//! Affiliate and admin passwords are stored as Argon2id PHC strings; the
//! spreadsheet never holds plaintext.

mod password;

pub use password::{
    MIN_PASSWORD_LEN, PasswordError, check_password_policy, hash_password, verify_password,
};
