//! Letters and their annotations (translations and comments).
//!
//! The body of a letter never changes once sent. What may change afterwards:
//! `is_read` (false → true only), the attached translation (latest wins),
//! and the comment list (append-only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Languages ───────────────────────────────────────────────────────────────

/// Target languages a letter can be translated into.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
  En,
  Ja,
  Ko,
  Zh,
  Es,
  Fr,
  De,
}

impl Language {
  /// Parse an ISO 639-1 code, e.g. `"ja"`.
  pub fn parse(code: &str) -> Result<Self> {
    code
      .trim()
      .parse()
      .map_err(|_| Error::UnsupportedLanguage(code.to_owned()))
  }

  /// The language's name in that language.
  pub fn native_name(self) -> &'static str {
    match self {
      Self::En => "English",
      Self::Ja => "日本語",
      Self::Ko => "한국어",
      Self::Zh => "中文",
      Self::Es => "Español",
      Self::Fr => "Français",
      Self::De => "Deutsch",
    }
  }
}

/// A translation of a letter's content, supplied by the reader or writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
  pub text:     String,
  pub language: Language,
}

impl Translation {
  pub fn new(text: impl Into<String>, language: Language) -> Result<Self> {
    let text = text.into().trim().to_owned();
    if text.is_empty() {
      return Err(Error::EmptyTranslation);
    }
    Ok(Self { text, language })
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommentKind {
  Correction,
  Suggestion,
  #[default]
  Comment,
}

/// A note left on a letter by one of its two participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub letter_id:  Uuid,
  pub author_id:  Uuid,
  pub content:    String,
  pub kind:       CommentKind,
  pub created_at: DateTime<Utc>,
}

/// Input for [`crate::exchange::Exchange::add_comment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
  pub author_id: Uuid,
  pub content:   String,
  #[serde(default)]
  pub kind:      CommentKind,
}

impl NewComment {
  pub fn into_comment(
    self,
    comment_id: Uuid,
    letter_id: Uuid,
    created_at: DateTime<Utc>,
  ) -> Result<Comment> {
    let content = self.content.trim().to_owned();
    if content.is_empty() {
      return Err(Error::EmptyComment);
    }
    Ok(Comment {
      comment_id,
      letter_id,
      author_id: self.author_id,
      content,
      kind: self.kind,
      created_at,
    })
  }
}

// ─── Letter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
  pub letter_id:   Uuid,
  pub sender_id:   Uuid,
  pub receiver_id: Uuid,
  pub content:     String,
  pub sent_at:     DateTime<Utc>,
  pub is_read:     bool,
  pub translation: Option<Translation>,
  /// Oldest first.
  #[serde(default)]
  pub comments:    Vec<Comment>,
}

impl Letter {
  /// Whether `user_id` wrote or received this letter.
  pub fn involves(&self, user_id: Uuid) -> bool {
    self.sender_id == user_id || self.receiver_id == user_id
  }
}

/// Input for [`crate::exchange::Exchange::send_letter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLetter {
  pub sender_id:   Uuid,
  pub receiver_id: Uuid,
  pub content:     String,
}

impl NewLetter {
  pub fn into_letter(self, letter_id: Uuid, sent_at: DateTime<Utc>) -> Result<Letter> {
    if self.sender_id == self.receiver_id {
      return Err(Error::SelfAddressed);
    }
    // Keep the author's formatting; only reject letters with nothing in them.
    if self.content.trim().is_empty() {
      return Err(Error::EmptyLetter);
    }
    Ok(Letter {
      letter_id,
      sender_id: self.sender_id,
      receiver_id: self.receiver_id,
      content: self.content,
      sent_at,
      is_read: false,
      translation: None,
      comments: Vec::new(),
    })
  }
}

// ─── Client-side filters ─────────────────────────────────────────────────────

/// Letters addressed to `user_id`, newest first.
pub fn inbox(letters: &[Letter], user_id: Uuid) -> Vec<Letter> {
  newest_first(letters.iter().filter(|l| l.receiver_id == user_id))
}

/// Letters written by `user_id`, newest first.
pub fn outbox(letters: &[Letter], user_id: Uuid) -> Vec<Letter> {
  newest_first(letters.iter().filter(|l| l.sender_id == user_id))
}

pub fn unread_count(letters: &[Letter], user_id: Uuid) -> usize {
  letters
    .iter()
    .filter(|l| l.receiver_id == user_id && !l.is_read)
    .count()
}

fn newest_first<'a>(letters: impl Iterator<Item = &'a Letter>) -> Vec<Letter> {
  let mut out: Vec<Letter> = letters.cloned().collect();
  out.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
  out
}
