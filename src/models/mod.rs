//! Core data models for the artwork gallery service.
//!
//! These entities represent the documents held in each collection. They map
//! to database rows via `sqlx::FromRow` and serialize as camelCase JSON via
//! `serde`, which is the shape clients see.

pub mod artwork;
pub mod favorite;
pub mod principal;
