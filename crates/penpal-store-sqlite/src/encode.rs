//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Interest sets and
//! translations are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use penpal_core::{
  evaluation::{Evaluation, Rating},
  letter::{Comment, CommentKind, Letter, Translation},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Interests ────────────────────────────────────────────────────────────────

pub fn encode_interests(interests: &BTreeSet<String>) -> Result<String> {
  Ok(serde_json::to_string(interests)?)
}

pub fn decode_interests(s: &str) -> Result<BTreeSet<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Translation ──────────────────────────────────────────────────────────────

pub fn encode_translation(t: &Translation) -> Result<String> {
  Ok(serde_json::to_string(t)?)
}

pub fn decode_translation(s: &str) -> Result<Translation> {
  Ok(serde_json::from_str(s)?)
}

// ─── CommentKind ──────────────────────────────────────────────────────────────

pub fn decode_comment_kind(s: &str) -> Result<CommentKind> {
  s.parse()
    .map_err(|_| Error::Malformed(format!("unknown comment kind: {s:?}")))
}

// ─── Rating ───────────────────────────────────────────────────────────────────

fn decode_rating(n: i64) -> Result<Rating> {
  let byte = u8::try_from(n).map_err(|_| Error::Malformed(format!("rating out of range: {n}")))?;
  Ok(Rating::try_from(byte)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "user_id, name, gender, photo, language, country, interests, allow_details, created_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub name:          String,
  pub gender:        Option<String>,
  pub photo:         Option<String>,
  pub language:      String,
  pub country:       Option<String>,
  pub interests:     String,
  pub allow_details: bool,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      name:          row.get(1)?,
      gender:        row.get(2)?,
      photo:         row.get(3)?,
      language:      row.get(4)?,
      country:       row.get(5)?,
      interests:     row.get(6)?,
      allow_details: row.get(7)?,
      created_at:    row.get(8)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      name:          self.name,
      gender:        self.gender,
      photo:         self.photo,
      language:      self.language,
      country:       self.country,
      interests:     decode_interests(&self.interests)?,
      allow_details: self.allow_details,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const LETTER_COLUMNS: &str =
  "letter_id, sender_id, receiver_id, content, sent_at, is_read, translation";

/// Raw values read directly from a `letters` row.
pub struct RawLetter {
  pub letter_id:   String,
  pub sender_id:   String,
  pub receiver_id: String,
  pub content:     String,
  pub sent_at:     String,
  pub is_read:     bool,
  pub translation: Option<String>,
}

impl RawLetter {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      letter_id:   row.get(0)?,
      sender_id:   row.get(1)?,
      receiver_id: row.get(2)?,
      content:     row.get(3)?,
      sent_at:     row.get(4)?,
      is_read:     row.get(5)?,
      translation: row.get(6)?,
    })
  }

  /// Decode the row; comments are attached by the caller.
  pub fn into_letter(self) -> Result<Letter> {
    Ok(Letter {
      letter_id:   decode_uuid(&self.letter_id)?,
      sender_id:   decode_uuid(&self.sender_id)?,
      receiver_id: decode_uuid(&self.receiver_id)?,
      content:     self.content,
      sent_at:     decode_dt(&self.sent_at)?,
      is_read:     self.is_read,
      translation: self
        .translation
        .as_deref()
        .map(decode_translation)
        .transpose()?,
      comments:    Vec::new(),
    })
  }
}

pub const COMMENT_COLUMNS: &str = "comment_id, letter_id, author_id, content, kind, created_at";

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub letter_id:  String,
  pub author_id:  String,
  pub content:    String,
  pub kind:       String,
  pub created_at: String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      letter_id:  row.get(1)?,
      author_id:  row.get(2)?,
      content:    row.get(3)?,
      kind:       row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      letter_id:  decode_uuid(&self.letter_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      content:    self.content,
      kind:       decode_comment_kind(&self.kind)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const EVALUATION_COLUMNS: &str = "evaluation_id, letter_id, sender_id, receiver_id, \
                                      intimacy, naturalness, grammar, corrections, comments, \
                                      sent_at";

/// Raw values read directly from an `evaluations` row.
pub struct RawEvaluation {
  pub evaluation_id: String,
  pub letter_id:     String,
  pub sender_id:     String,
  pub receiver_id:   String,
  pub intimacy:      i64,
  pub naturalness:   i64,
  pub grammar:       i64,
  pub corrections:   String,
  pub comments:      String,
  pub sent_at:       String,
}

impl RawEvaluation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      evaluation_id: row.get(0)?,
      letter_id:     row.get(1)?,
      sender_id:     row.get(2)?,
      receiver_id:   row.get(3)?,
      intimacy:      row.get(4)?,
      naturalness:   row.get(5)?,
      grammar:       row.get(6)?,
      corrections:   row.get(7)?,
      comments:      row.get(8)?,
      sent_at:       row.get(9)?,
    })
  }

  pub fn into_evaluation(self) -> Result<Evaluation> {
    Ok(Evaluation {
      evaluation_id: decode_uuid(&self.evaluation_id)?,
      letter_id:     decode_uuid(&self.letter_id)?,
      sender_id:     decode_uuid(&self.sender_id)?,
      receiver_id:   decode_uuid(&self.receiver_id)?,
      intimacy:      decode_rating(self.intimacy)?,
      naturalness:   decode_rating(self.naturalness)?,
      grammar:       decode_rating(self.grammar)?,
      corrections:   self.corrections,
      comments:      self.comments,
      sent_at:       decode_dt(&self.sent_at)?,
    })
  }
}

/// Decode every raw record, dropping (and logging) the ones that fail.
pub fn decode_all<R, T>(
  raws: Vec<R>,
  kind: &'static str,
  decode: impl Fn(R) -> Result<T>,
) -> Vec<T> {
  raws
    .into_iter()
    .filter_map(|raw| match decode(raw) {
      Ok(value) => Some(value),
      Err(e) => {
        tracing::warn!(error = %e, record = kind, "skipping malformed record");
        None
      }
    })
    .collect()
}
