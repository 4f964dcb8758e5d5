//! JSON REST API for the PenPal letter exchange.
//!
//! Exposes an axum [`Router`] backed by any [`penpal_core::store::PenPalStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", penpal_api::api_router(Exchange::new(store.clone())))
//! ```

pub mod error;
pub mod evaluations;
pub mod extract;
pub mod letters;
pub mod stream;
pub mod users;

use axum::{
  Router,
  routing::{get, post, put},
};
use penpal_core::{exchange::Exchange, store::PenPalStore};

pub use error::ApiError;

/// Build a fully-materialised API router over `exchange`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(exchange: Exchange<S>) -> Router<()>
where
  S: PenPalStore + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::search::<S>).post(users::register::<S>))
    .route("/users/stream", get(users::subscribe::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    .route("/users/{id}/profile", get(users::profile::<S>))
    .route("/interactions", get(users::interactions::<S>))
    // Letters
    .route("/letters", get(letters::list::<S>).post(letters::send::<S>))
    .route("/letters/stream", get(letters::subscribe::<S>))
    .route("/letters/{id}", get(letters::get_one::<S>))
    .route("/letters/{id}/read", post(letters::mark_read::<S>))
    .route("/letters/{id}/comments", post(letters::comment::<S>))
    .route("/letters/{id}/translation", put(letters::translate::<S>))
    // Evaluations
    .route(
      "/evaluations",
      get(evaluations::list::<S>).post(evaluations::submit::<S>),
    )
    .with_state(exchange)
}

#[cfg(test)]
mod tests;
