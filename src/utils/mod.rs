//! Utility functions for code generation, password hashing and URL checks.
//!
//! - [`code_generator`] - Short code generation with an injectable random source
//! - [`password`] - Argon2id password hashing
//! - [`target_url`] - Validation of URLs submitted for shortening

pub mod code_generator;
pub mod password;
pub mod target_url;
