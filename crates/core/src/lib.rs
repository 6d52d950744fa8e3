//! Core business logic for Leadboard.
//!
//! This crate contains pure business logic with ZERO web or store dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `auth` - Password hashing and policy
//! - `affiliate` - Registration and credential records, sign-up validation
//! - `earnings` - Lead report aggregation and payout math
//! - `withdrawal` - Withdrawal requests, bank details, status transitions

pub mod affiliate;
pub mod auth;
pub mod earnings;
pub mod withdrawal;
