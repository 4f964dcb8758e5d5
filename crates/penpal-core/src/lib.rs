//! Core types and trait definitions for the PenPal letter exchange.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The storage backends, the API and the CLI all depend on it.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// trait methods themselves.
#![allow(async_fn_in_trait)]

pub mod disclosure;
pub mod error;
pub mod evaluation;
pub mod exchange;
pub mod letter;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, Result};
