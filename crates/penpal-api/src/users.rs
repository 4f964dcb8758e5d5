//! Handlers for `/users` and `/interactions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users` | Optional `?language`, `?interest`, `?exclude` |
//! | `POST` | `/users` | Body: [`NewUser`]; returns 201 + the full record |
//! | `GET`  | `/users/stream` | SSE; public profiles of every user |
//! | `GET`  | `/users/:id` | Public profile; 404 if not found |
//! | `GET`  | `/users/:id/profile` | `?viewer_id` required; disclosure applied |
//! | `GET`  | `/interactions` | `?viewer_id` and `?subject_id` required |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use penpal_core::{
  disclosure::ProfileView,
  exchange::Exchange,
  store::PenPalStore,
  user::{NewUser, PublicProfile, User, UserQuery},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
  stream,
};

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub language: Option<String>,
  pub interest: Option<String>,
  /// Usually the searcher's own id.
  pub exclude:  Option<Uuid>,
}

/// `GET /users[?language=...][&interest=...][&exclude=<id>]`
pub async fn search<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PublicProfile>>, ApiError> {
  let query = UserQuery {
    language: params.language,
    interest: params.interest,
    exclude:  params.exclude,
  };
  let users = exchange.search(&query).await?;
  Ok(Json(users.iter().map(User::public).collect()))
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /users`; returns 201 + the stored [`User`], including the fields
/// only its owner sees.
pub async fn register<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
  let user = exchange.register(body).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PublicProfile>, ApiError> {
  let user = exchange
    .get_user(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user.public()))
}

// ─── Profile view ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ViewerParams {
  pub viewer_id: Uuid,
}

/// `GET /users/:id/profile?viewer_id=<id>`
pub async fn profile<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ViewerParams>,
) -> Result<Json<ProfileView>, ApiError> {
  let view = exchange
    .view_profile(params.viewer_id, id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(view))
}

// ─── Stream ───────────────────────────────────────────────────────────────────

/// `GET /users/stream`
pub async fn subscribe<S: PenPalStore>(State(exchange): State<Exchange<S>>) -> impl IntoResponse {
  stream::snapshots(exchange.store().subscribe_users(), |users: &[User]| {
    users.iter().map(User::public).collect::<Vec<_>>()
  })
}

// ─── Interactions ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct InteractionParams {
  pub viewer_id:  Uuid,
  pub subject_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct InteractionCount {
  pub viewer_id:  Uuid,
  pub subject_id: Uuid,
  pub count:      u32,
}

/// `GET /interactions?viewer_id=<id>&subject_id=<id>`
pub async fn interactions<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Query(params): Query<InteractionParams>,
) -> Result<Json<InteractionCount>, ApiError> {
  let count = exchange
    .interaction_count(params.viewer_id, params.subject_id)
    .await?;
  Ok(Json(InteractionCount {
    viewer_id: params.viewer_id,
    subject_id: params.subject_id,
    count,
  }))
}
