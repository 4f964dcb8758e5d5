//! Handlers for `/evaluations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/evaluations` | Body: [`EvaluationBody`]; returns 201 |
//! | `GET`  | `/evaluations` | `?receiver_id` (about a user) or `?sender_id` (by a user) |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use penpal_core::{
  evaluation::{Evaluation, NewEvaluation, Rating},
  exchange::Exchange,
  store::PenPalStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Query},
};

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /evaluations`. Ratings are 1–5 and default to
/// 3 when omitted.
#[derive(Debug, Deserialize)]
pub struct EvaluationBody {
  pub letter_id:    Uuid,
  pub evaluator_id: Uuid,
  pub intimacy:     Option<u8>,
  pub naturalness:  Option<u8>,
  pub grammar:      Option<u8>,
  #[serde(default)]
  pub corrections:  String,
  #[serde(default)]
  pub comments:     String,
}

fn rating(value: Option<u8>) -> Result<Rating, ApiError> {
  value
    .map(Rating::try_from)
    .transpose()
    .map(Option::unwrap_or_default)
    .map_err(ApiError::from)
}

impl TryFrom<EvaluationBody> for NewEvaluation {
  type Error = ApiError;

  fn try_from(b: EvaluationBody) -> Result<Self, Self::Error> {
    Ok(NewEvaluation {
      letter_id:    b.letter_id,
      evaluator_id: b.evaluator_id,
      intimacy:     rating(b.intimacy)?,
      naturalness:  rating(b.naturalness)?,
      grammar:      rating(b.grammar)?,
      corrections:  b.corrections,
      comments:     b.comments,
    })
  }
}

/// `POST /evaluations`
pub async fn submit<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Json(body): Json<EvaluationBody>,
) -> Result<impl IntoResponse, ApiError> {
  let evaluation = exchange
    .submit_evaluation(NewEvaluation::try_from(body)?)
    .await?;
  Ok((StatusCode::CREATED, Json(evaluation)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub receiver_id: Option<Uuid>,
  pub sender_id:   Option<Uuid>,
}

/// `GET /evaluations?receiver_id=<id>` or `GET /evaluations?sender_id=<id>`
pub async fn list<S: PenPalStore>(
  State(exchange): State<Exchange<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Evaluation>>, ApiError> {
  let evaluations = match (params.receiver_id, params.sender_id) {
    (Some(receiver), None) => exchange.evaluations_received(receiver).await?,
    (None, Some(sender)) => exchange.evaluations_given(sender).await?,
    _ => {
      return Err(ApiError::BadRequest(
        "exactly one of receiver_id or sender_id is required".into(),
      ));
    }
  };
  Ok(Json(evaluations))
}
