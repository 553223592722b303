//! # Gamerteca
//!
//! A game catalog backed by a remote HTTP catalog service and a local SQLite
//! cache, plus a personal library of statuses, favorites, ratings and lists.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────┐   ┌──────────────┐
//! │ IgdbClient   │──▶│ CatalogRepository   │──▶│ SqliteCache  │
//! │ (reqwest)    │◀──│ RemoteFirst /       │◀──│ Store        │
//! └──────────────┘   │ CacheFirst          │   └──────────────┘
//!                    └─────────┬───────────┘
//!                              ▼
//!                      ┌──────────────┐   ┌──────────────────┐
//!                      │   CLI        │──▶│ LibraryRepository│──▶ SqliteDocumentStore
//!                      │ (gamerteca)  │   └──────────────────┘
//!                      └──────────────┘
//! ```
//!
//! Runtime-agnostic pieces (records, query grammar, DTO mapping, store
//! traits, the library repository) live in the `gamerteca-core` crate.
//!
//! ## Quick Start
//!
//! ```bash
//! gamerteca init
//! gamerteca popular --refresh
//! gamerteca browse genre "Role-playing (RPG)"
//! gamerteca library status 1942 playing
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`logging`] | Tracing subscriber setup |
//! | [`source`] | Remote catalog trait |
//! | [`catalog`] | HTTP catalog client |
//! | [`sqlite_store`] | SQLite catalog cache |
//! | [`sqlite_documents`] | SQLite document store for the library |
//! | [`repository`] | Remote/cache reconciliation |
//! | [`app`] | Composition root |
//! | [`commands`] | CLI command handlers |

pub mod app;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod migrate;
pub mod repository;
pub mod source;
pub mod sqlite_documents;
pub mod sqlite_store;
