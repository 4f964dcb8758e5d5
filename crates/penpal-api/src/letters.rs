//! Handlers for `/letters` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/letters` | Body: [`NewLetter`]; returns 201 + the letter |
//! | `GET`  | `/letters` | `?recipient_id` (inbox) or `?sender_id` (outbox) |
//! | `GET`  | `/letters/stream` | SSE; `?recipient_id` required |
//! | `GET`  | `/letters/:id` | 404 if not found |
//! | `POST` | `/letters/:id/read` | Body: `{"reader_id":"..."}` |
//! | `POST` | `/letters/:id/comments` | Body: [`NewComment`]; returns 201 |
//! | `PUT`  | `/letters/:id/translation` | Body: [`TranslationBody`] |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use penpal_core::{
  exchange::Exchange,
  letter::{self, Language, Letter, NewComment, NewLetter, Translation},
  store::PenPalStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
  stream,
};

// ─── Send ─────────────────────────────────────────────────────────────────────

/// `POST /letters`
pub async fn send<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Json(body): Json<NewLetter>,
) -> Result<impl IntoResponse, ApiError> {
  let letter = exchange.send_letter(body).await?;
  Ok((StatusCode::CREATED, Json(letter)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub recipient_id: Option<Uuid>,
  pub sender_id:    Option<Uuid>,
}

/// `GET /letters?recipient_id=<id>` or `GET /letters?sender_id=<id>`
pub async fn list<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Letter>>, ApiError> {
  let letters = match (params.recipient_id, params.sender_id) {
    (Some(recipient), None) => exchange.inbox(recipient).await?,
    (None, Some(sender)) => exchange.outbox(sender).await?,
    _ => {
      return Err(ApiError::BadRequest(
        "exactly one of recipient_id or sender_id is required".into(),
      ));
    }
  };
  Ok(Json(letters))
}

// ─── Stream ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StreamParams {
  pub recipient_id: Uuid,
}

/// `GET /letters/stream?recipient_id=<id>`: the recipient's inbox, re-sent
/// on every change to any letter.
pub async fn subscribe<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Query(params): Query<StreamParams>,
) -> impl IntoResponse {
  let recipient = params.recipient_id;
  stream::snapshots(exchange.store().subscribe_letters(), move |letters: &[Letter]| {
    letter::inbox(letters, recipient)
  })
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /letters/:id`
pub async fn get_one<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Letter>, ApiError> {
  let letter = exchange
    .get_letter(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("letter {id} not found")))?;
  Ok(Json(letter))
}

// ─── Mark read ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReadBody {
  pub reader_id: Uuid,
}

/// `POST /letters/:id/read`
pub async fn mark_read<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ReadBody>,
) -> Result<Json<Letter>, ApiError> {
  Ok(Json(exchange.mark_read(id, body.reader_id).await?))
}

// ─── Comments ─────────────────────────────────────────────────────────────────

/// `POST /letters/:id/comments`
pub async fn comment<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewComment>,
) -> Result<impl IntoResponse, ApiError> {
  let comment = exchange.add_comment(id, body).await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Translation ──────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /letters/:id/translation`. `language` is an
/// ISO 639-1 code.
#[derive(Debug, Deserialize)]
pub struct TranslationBody {
  pub requester_id: Uuid,
  pub text:         String,
  pub language:     String,
}

/// `PUT /letters/:id/translation`
pub async fn translate<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TranslationBody>,
) -> Result<Json<Letter>, ApiError> {
  let translation = Translation::new(body.text, Language::parse(&body.language)?)?;
  let letter = exchange
    .attach_translation(id, body.requester_id, translation)
    .await?;
  Ok(Json(letter))
}
