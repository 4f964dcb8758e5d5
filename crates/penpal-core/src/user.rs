//! Users: registered pen pals and the search filter over them.
//!
//! A [`User`] always carries its optional `gender` and `photo` once they were
//! given at registration. Other users only ever see a [`PublicProfile`], plus
//! whatever the disclosure policy in [`crate::disclosure`] lets through.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── User ────────────────────────────────────────────────────────────────────

/// A registered user, as persisted in the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub name:          String,
  pub gender:        Option<String>,
  /// URL of a profile photo.
  pub photo:         Option<String>,
  /// The language this user writes in.
  pub language:      String,
  pub country:       Option<String>,
  pub interests:     BTreeSet<String>,
  /// Opt-in for progressive disclosure of `gender` and `photo`.
  pub allow_details: bool,
  pub created_at:    DateTime<Utc>,
}

impl User {
  /// The view of this user that is safe to show to anyone.
  pub fn public(&self) -> PublicProfile {
    PublicProfile {
      user_id:       self.user_id,
      name:          self.name.clone(),
      language:      self.language.clone(),
      country:       self.country.clone(),
      interests:     self.interests.clone(),
      allow_details: self.allow_details,
      created_at:    self.created_at,
    }
  }
}

/// A user without the fields gated by the disclosure policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
  pub user_id:       Uuid,
  pub name:          String,
  pub language:      String,
  pub country:       Option<String>,
  pub interests:     BTreeSet<String>,
  pub allow_details: bool,
  pub created_at:    DateTime<Utc>,
}

// ─── NewUser ─────────────────────────────────────────────────────────────────

/// Registration input. The id and `created_at` are assigned on registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
  pub name:          String,
  #[serde(default)]
  pub gender:        Option<String>,
  #[serde(default)]
  pub photo:         Option<String>,
  pub language:      String,
  #[serde(default)]
  pub country:       Option<String>,
  #[serde(default)]
  pub interests:     Vec<String>,
  #[serde(default)]
  pub allow_details: bool,
}

impl NewUser {
  /// Convenience constructor with all optional fields unset.
  pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      language: language.into(),
      ..Self::default()
    }
  }

  /// Validate and normalise into a persisted [`User`].
  ///
  /// Text fields are trimmed; blank optional fields become `None`; blank
  /// interests are dropped and duplicates collapse.
  pub fn into_user(self, user_id: Uuid, created_at: DateTime<Utc>) -> Result<User> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }
    let language = self.language.trim().to_owned();
    if language.is_empty() {
      return Err(Error::EmptyLanguage);
    }

    let interests = self
      .interests
      .iter()
      .map(|i| i.trim())
      .filter(|i| !i.is_empty())
      .map(str::to_owned)
      .collect();

    Ok(User {
      user_id,
      name,
      gender: non_blank(self.gender),
      photo: non_blank(self.photo),
      language,
      country: non_blank(self.country),
      interests,
      allow_details: self.allow_details,
      created_at,
    })
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

// ─── UserQuery ───────────────────────────────────────────────────────────────

/// Pen-pal search filter. Blank filters match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
  /// Case-insensitive substring of [`User::language`].
  pub language: Option<String>,
  /// Case-insensitive substring of any of [`User::interests`].
  pub interest: Option<String>,
  /// Leave this user out of the results (usually the searcher).
  pub exclude:  Option<Uuid>,
}

impl UserQuery {
  pub fn matches(&self, user: &User) -> bool {
    if self.exclude == Some(user.user_id) {
      return false;
    }

    if let Some(language) = needle(&self.language)
      && !user.language.to_lowercase().contains(&language)
    {
      return false;
    }

    if let Some(interest) = needle(&self.interest)
      && !user
        .interests
        .iter()
        .any(|i| i.to_lowercase().contains(&interest))
    {
      return false;
    }

    true
  }
}

fn needle(filter: &Option<String>) -> Option<String> {
  filter
    .as_deref()
    .map(str::trim)
    .filter(|f| !f.is_empty())
    .map(str::to_lowercase)
}
