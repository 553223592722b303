//! # Gamerteca Core
//!
//! Runtime-agnostic logic for Gamerteca: the catalog record model, the
//! remote query grammar, response mapping, the cache and document store
//! abstractions, and the personal library rules.
//!
//! This crate contains no tokio, sqlx, HTTP, or filesystem dependencies.
//! The native crate (`gamerteca`) supplies the SQLite stores, the HTTP
//! catalog client, and the repository that reconciles them.

pub mod documents;
pub mod error;
pub mod library;
pub mod mapping;
pub mod models;
pub mod query;
pub mod store;
