//! Error types for `penpal-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("letter not found: {0}")]
  LetterNotFound(Uuid),

  #[error("name must not be empty")]
  EmptyName,

  #[error("language must not be empty")]
  EmptyLanguage,

  #[error("letter content must not be empty")]
  EmptyLetter,

  #[error("comment must not be empty")]
  EmptyComment,

  #[error("translation text must not be empty")]
  EmptyTranslation,

  #[error("cannot send a letter to yourself")]
  SelfAddressed,

  #[error("user {user} is not a participant in letter {letter}")]
  NotParticipant { user: Uuid, letter: Uuid },

  #[error("only the recipient of letter {0} may do this")]
  NotRecipient(Uuid),

  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(u8),

  #[error("unsupported language: {0:?}")]
  UnsupportedLanguage(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// `true` for errors caused by caller input rather than the store.
  pub fn is_invalid_input(&self) -> bool {
    matches!(
      self,
      Self::EmptyName
        | Self::EmptyLanguage
        | Self::EmptyLetter
        | Self::EmptyComment
        | Self::EmptyTranslation
        | Self::SelfAddressed
        | Self::InvalidRating(_)
        | Self::UnsupportedLanguage(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
