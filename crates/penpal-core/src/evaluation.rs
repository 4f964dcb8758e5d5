//! Structured feedback about a received letter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Rating ──────────────────────────────────────────────────────────────────

/// A score on the 1..=5 scale. Defaults to the midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  pub fn get(self) -> u8 { self.0 }
}

impl Default for Rating {
  fn default() -> Self { Self(3) }
}

impl TryFrom<u8> for Rating {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> {
    if (Self::MIN..=Self::MAX).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::InvalidRating(value))
    }
  }
}

impl From<Rating> for u8 {
  fn from(r: Rating) -> Self { r.0 }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// Feedback from a letter's recipient (`sender_id`) about its writer
/// (`receiver_id`). Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
  pub evaluation_id: Uuid,
  pub letter_id:     Uuid,
  /// The evaluator.
  pub sender_id:     Uuid,
  /// The user being evaluated.
  pub receiver_id:   Uuid,
  /// How close the evaluator feels to the writer.
  pub intimacy:      Rating,
  /// How natural the writer's use of the language is.
  pub naturalness:   Rating,
  pub grammar:       Rating,
  /// Mistakes pointed out, with fixes.
  pub corrections:   String,
  pub comments:      String,
  pub sent_at:       DateTime<Utc>,
}

/// Input for [`crate::exchange::Exchange::submit_evaluation`]. The evaluated
/// user is taken from the letter, not from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvaluation {
  pub letter_id:    Uuid,
  pub evaluator_id: Uuid,
  #[serde(default)]
  pub intimacy:     Rating,
  #[serde(default)]
  pub naturalness:  Rating,
  #[serde(default)]
  pub grammar:      Rating,
  #[serde(default)]
  pub corrections:  String,
  #[serde(default)]
  pub comments:     String,
}

impl NewEvaluation {
  pub fn into_evaluation(
    self,
    evaluation_id: Uuid,
    receiver_id: Uuid,
    sent_at: DateTime<Utc>,
  ) -> Evaluation {
    Evaluation {
      evaluation_id,
      letter_id: self.letter_id,
      sender_id: self.evaluator_id,
      receiver_id,
      intimacy: self.intimacy,
      naturalness: self.naturalness,
      grammar: self.grammar,
      corrections: self.corrections.trim().to_owned(),
      comments: self.comments.trim().to_owned(),
      sent_at,
    }
  }
}

/// Evaluations about `user_id`, newest first.
pub fn received_by(evaluations: &[Evaluation], user_id: Uuid) -> Vec<Evaluation> {
  let mut out: Vec<Evaluation> = evaluations
    .iter()
    .filter(|e| e.receiver_id == user_id)
    .cloned()
    .collect();
  out.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
  out
}

/// Evaluations written by `user_id`, newest first.
pub fn given_by(evaluations: &[Evaluation], user_id: Uuid) -> Vec<Evaluation> {
  let mut out: Vec<Evaluation> = evaluations
    .iter()
    .filter(|e| e.sender_id == user_id)
    .cloned()
    .collect();
  out.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rating_bounds() {
    assert!(Rating::try_from(0).is_err());
    assert_eq!(Rating::try_from(1).unwrap().get(), 1);
    assert_eq!(Rating::try_from(5).unwrap().get(), 5);
    assert!(matches!(Rating::try_from(6), Err(Error::InvalidRating(6))));
  }

  #[test]
  fn rating_defaults_to_three() {
    assert_eq!(Rating::default().get(), 3);
  }

  #[test]
  fn out_of_range_rating_fails_to_deserialise() {
    let body = serde_json::json!({
      "letter_id":    Uuid::new_v4(),
      "evaluator_id": Uuid::new_v4(),
      "grammar":      9,
    });
    assert!(serde_json::from_value::<NewEvaluation>(body).is_err());
  }

  #[test]
  fn missing_ratings_take_the_default() {
    let body = serde_json::json!({
      "letter_id":    Uuid::new_v4(),
      "evaluator_id": Uuid::new_v4(),
      "naturalness":  5,
    });
    let e: NewEvaluation = serde_json::from_value(body).unwrap();
    assert_eq!(e.intimacy.get(), 3);
    assert_eq!(e.naturalness.get(), 5);
    assert!(e.corrections.is_empty());
  }

  #[test]
  fn filters_split_by_direction() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let e = NewEvaluation {
      letter_id:    Uuid::new_v4(),
      evaluator_id: a,
      intimacy:     Rating::default(),
      naturalness:  Rating::default(),
      grammar:      Rating::default(),
      corrections:  String::new(),
      comments:     " great letter ".into(),
    }
    .into_evaluation(Uuid::new_v4(), b, Utc::now());

    assert_eq!(e.comments, "great letter");
    let all = vec![e];
    assert_eq!(received_by(&all, b).len(), 1);
    assert_eq!(received_by(&all, a).len(), 0);
    assert_eq!(given_by(&all, a).len(), 1);
  }
}
