//! Core types and lifecycle rules for the FieldOps intervention console.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! persistence backend and the notification channel are reached only through
//! the traits in [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assignment;
pub mod audit;
pub mod builder;
pub mod console;
pub mod demo;
pub mod display;
pub mod entity_store;
pub mod error;
pub mod event;
pub mod ids;
pub mod intervention;
pub mod lifecycle;
pub mod manager;
pub mod query;
pub mod report;
pub mod site;
pub mod store;
pub mod technician;

pub use entity_store::EntityStore;
pub use error::{Error, Result};
