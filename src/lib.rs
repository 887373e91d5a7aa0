//! Fern reporter server library.
//!
//! Stores test runs with their suite and spec runs, and serves them over
//! REST, GraphQL and rendered HTML reports.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
