//! Progressive profile disclosure.
//!
//! A user who opts in with `allow_details` reveals their gender to a viewer
//! once that viewer has sent them [`GENDER_THRESHOLD`] letters, and their
//! photo at [`PHOTO_THRESHOLD`]. The policy only decides visibility; the
//! underlying [`User`] is never modified.

use serde::{Deserialize, Serialize};

use crate::user::{PublicProfile, User};

/// Letters a viewer must have sent before the subject's gender is shown.
pub const GENDER_THRESHOLD: u32 = 3;

/// Letters a viewer must have sent before the subject's photo is shown.
pub const PHOTO_THRESHOLD: u32 = 5;

/// The optional profile fields visible to one particular viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gender: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo:  Option<String>,
}

impl Disclosure {
  /// Everything the user has set; what the owner sees of their own profile.
  pub fn full(user: &User) -> Self {
    Self {
      gender: user.gender.clone(),
      photo:  user.photo.clone(),
    }
  }

  pub fn is_empty(&self) -> bool { self.gender.is_none() && self.photo.is_none() }
}

/// Which optional fields of `subject` a viewer with `interaction_count`
/// letters sent to them may see. Thresholds are inclusive.
pub fn visible_fields(subject: &User, interaction_count: u32) -> Disclosure {
  if !subject.allow_details {
    return Disclosure::default();
  }

  Disclosure {
    gender: subject
      .gender
      .clone()
      .filter(|_| interaction_count >= GENDER_THRESHOLD),
    photo:  subject
      .photo
      .clone()
      .filter(|_| interaction_count >= PHOTO_THRESHOLD),
  }
}

/// A subject's profile as rendered for a specific viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
  #[serde(flatten)]
  pub profile:           PublicProfile,
  /// Letters the viewer has sent to the subject so far.
  pub interaction_count: u32,
  pub disclosed:         Disclosure,
}

impl ProfileView {
  pub fn for_viewer(subject: &User, interaction_count: u32) -> Self {
    Self {
      profile: subject.public(),
      interaction_count,
      disclosed: visible_fields(subject, interaction_count),
    }
  }

  pub fn for_owner(user: &User, interaction_count: u32) -> Self {
    Self {
      profile: user.public(),
      interaction_count,
      disclosed: Disclosure::full(user),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::user::NewUser;

  const PHOTO: &str = "https://example.com/photo.jpg";

  fn subject(allow_details: bool) -> User {
    let mut input = NewUser::new("Camille", "French");
    input.gender = Some("female".into());
    input.photo = Some(PHOTO.into());
    input.allow_details = allow_details;
    input.into_user(Uuid::new_v4(), Utc::now()).unwrap()
  }

  #[test]
  fn opted_out_user_never_discloses() {
    let s = subject(false);
    for count in 0..=50 {
      assert!(visible_fields(&s, count).is_empty(), "count {count}");
    }
    assert!(visible_fields(&s, u32::MAX).is_empty());
  }

  #[test]
  fn opted_in_user_discloses_by_threshold() {
    let s = subject(true);
    for count in 0..=2 {
      assert_eq!(visible_fields(&s, count), Disclosure::default());
    }
    for count in 3..=4 {
      assert_eq!(visible_fields(&s, count), Disclosure {
        gender: Some("female".into()),
        photo:  None,
      });
    }
    for count in [5, 6, 10, 1_000] {
      assert_eq!(visible_fields(&s, count), Disclosure {
        gender: Some("female".into()),
        photo:  Some(PHOTO.into()),
      });
    }
  }

  #[test]
  fn unset_fields_stay_hidden_past_threshold() {
    let mut s = subject(true);
    s.gender = None;
    let d = visible_fields(&s, 10);
    assert_eq!(d.gender, None);
    assert_eq!(d.photo.as_deref(), Some(PHOTO));
  }

  #[test]
  fn policy_does_not_touch_the_subject() {
    let s = subject(true);
    let before = s.clone();
    let _ = visible_fields(&s, 0);
    let _ = visible_fields(&s, 7);
    assert_eq!(s, before);
  }

  #[test]
  fn same_inputs_same_output() {
    let s = subject(true);
    assert_eq!(visible_fields(&s, 4), visible_fields(&s, 4));
  }

  #[test]
  fn empty_disclosure_serialises_as_empty_object() {
    let json = serde_json::to_value(Disclosure::default()).unwrap();
    assert_eq!(json, serde_json::json!({}));
  }

  #[test]
  fn profile_view_flattens_public_fields() {
    let s = subject(true);
    let json = serde_json::to_value(ProfileView::for_viewer(&s, 3)).unwrap();
    assert_eq!(json["name"], "Camille");
    assert_eq!(json["interaction_count"], 3);
    assert_eq!(json["disclosed"]["gender"], "female");
    assert!(json["disclosed"].get("photo").is_none());
    assert!(json.get("gender").is_none());
  }

  #[test]
  fn owner_sees_everything() {
    let s = subject(false);
    let view = ProfileView::for_owner(&s, 0);
    assert_eq!(view.disclosed, Disclosure::full(&s));
  }
}
