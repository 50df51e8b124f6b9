//! Shared helpers: rule set validation, hashing and time formatting.

pub mod policy_validator;
pub mod security;
pub mod time;
