//! Client session state and its reducer.
//!
//! [`Session`] is plain data; every change goes through [`Session::reduce`],
//! which consumes the old state and returns the new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
  Received,
  Sent,
  Read,
  Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub id:        u64,
  pub kind:      NotificationKind,
  pub message:   String,
  pub timestamp: DateTime<Utc>,
}

/// Something that happened on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  LoggedIn(Uuid),
  LoggedOut,
  RecipientSelected(Uuid),
  RecipientCleared,
  LetterSent { to: Uuid },
  LetterReceived { from: Uuid },
  LetterOpened { was_unread: bool },
  CommentReceived { letter_id: Uuid },
  NotificationDismissed(u64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub current_user:       Option<Uuid>,
  /// Addressee of the letter being written.
  pub selected_recipient: Option<Uuid>,
  /// Oldest first.
  pub notifications:      Vec<Notification>,
  next_notification_id:   u64,
}

impl Session {
  pub fn is_logged_in(&self) -> bool { self.current_user.is_some() }

  pub fn reduce(mut self, action: Action, at: DateTime<Utc>) -> Self {
    match action {
      Action::LoggedIn(user_id) => {
        self.current_user = Some(user_id);
      }
      Action::LoggedOut => return Self::default(),
      Action::RecipientSelected(user_id) => {
        self.selected_recipient = Some(user_id);
      }
      Action::RecipientCleared => {
        self.selected_recipient = None;
      }
      Action::LetterSent { .. } => {
        self.selected_recipient = None;
        self.notify(NotificationKind::Sent, "Letter sent successfully", at);
      }
      Action::LetterReceived { .. } => {
        self.notify(NotificationKind::Received, "You have received a new letter!", at);
      }
      Action::LetterOpened { was_unread } => {
        if was_unread {
          self.notify(NotificationKind::Read, "Letter marked as read", at);
        }
      }
      Action::CommentReceived { .. } => {
        self.notify(NotificationKind::Comment, "New comment on your letter", at);
      }
      Action::NotificationDismissed(id) => {
        self.notifications.retain(|n| n.id != id);
      }
    }
    self
  }

  fn notify(&mut self, kind: NotificationKind, message: &str, at: DateTime<Utc>) {
    self.next_notification_id += 1;
    self.notifications.push(Notification {
      id: self.next_notification_id,
      kind,
      message: message.to_owned(),
      timestamp: at,
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn logged_in() -> (Session, Uuid) {
    let me = Uuid::new_v4();
    (Session::default().reduce(Action::LoggedIn(me), Utc::now()), me)
  }

  #[test]
  fn login_and_logout() {
    let (s, me) = logged_in();
    assert!(s.is_logged_in());
    assert_eq!(s.current_user, Some(me));

    let s = s
      .reduce(Action::RecipientSelected(Uuid::new_v4()), Utc::now())
      .reduce(Action::LetterReceived { from: Uuid::new_v4() }, Utc::now())
      .reduce(Action::LoggedOut, Utc::now());
    assert_eq!(s, Session::default());
    assert!(!s.is_logged_in());
  }

  #[test]
  fn sending_clears_recipient_and_notifies() {
    let (s, _) = logged_in();
    let to = Uuid::new_v4();
    let s = s
      .reduce(Action::RecipientSelected(to), Utc::now())
      .reduce(Action::LetterSent { to }, Utc::now());

    assert_eq!(s.selected_recipient, None);
    assert_eq!(s.notifications.len(), 1);
    assert_eq!(s.notifications[0].kind, NotificationKind::Sent);
    assert_eq!(s.notifications[0].message, "Letter sent successfully");
  }

  #[test]
  fn opening_a_read_letter_is_silent() {
    let (s, _) = logged_in();
    let s = s
      .reduce(Action::LetterOpened { was_unread: false }, Utc::now())
      .reduce(Action::LetterOpened { was_unread: true }, Utc::now());
    assert_eq!(s.notifications.len(), 1);
    assert_eq!(s.notifications[0].kind, NotificationKind::Read);
  }

  #[test]
  fn notification_ids_are_unique_and_dismissable() {
    let (s, _) = logged_in();
    let s = s
      .reduce(Action::LetterReceived { from: Uuid::new_v4() }, Utc::now())
      .reduce(Action::CommentReceived { letter_id: Uuid::new_v4() }, Utc::now());
    let ids: Vec<u64> = s.notifications.iter().map(|n| n.id).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    let s = s.reduce(Action::NotificationDismissed(ids[0]), Utc::now());
    assert_eq!(s.notifications.len(), 1);
    assert_eq!(s.notifications[0].id, ids[1]);
  }

  #[test]
  fn reduce_is_deterministic() {
    let at = Utc::now();
    let me = Uuid::new_v4();
    let a = Session::default()
      .reduce(Action::LoggedIn(me), at)
      .reduce(Action::LetterSent { to: Uuid::nil() }, at);
    let b = Session::default()
      .reduce(Action::LoggedIn(me), at)
      .reduce(Action::LetterSent { to: Uuid::nil() }, at);
    assert_eq!(a, b);
  }
}
