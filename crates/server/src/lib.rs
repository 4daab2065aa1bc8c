//! StoreRate server library.
//!
//! This crate provides the rating platform as a library, allowing the HTTP
//! surface to be tested and reused.
//!
//! # Architecture
//!
//! - Axum web framework serving a JSON API
//! - `PostgreSQL` via sqlx behind the [`db::Storage`] query interface
//! - Argon2id password hashing, HS256 bearer tokens
//! - Role-based access control evaluated once per request
//!
//! Aggregates (store averages, dashboard counts) are recomputed from the
//! rating ledger on every read; there is no caching layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
