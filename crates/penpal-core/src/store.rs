//! The `PenPalStore` trait.
//!
//! A document-store abstraction: point reads, whole-record writes, and live
//! subscriptions that deliver the complete collection on every change.
//! Storage backends (e.g. `penpal-store-sqlite`) implement it; the
//! [`Exchange`](crate::exchange::Exchange) service and the API only see the
//! trait.

use std::future::Future;

use tokio::sync::watch;
use uuid::Uuid;

use crate::{
  evaluation::Evaluation,
  letter::{Comment, Letter},
  user::User,
};

/// A live view of a whole collection. The receiver always holds the latest
/// complete snapshot; `changed().await` wakes on every write.
pub type Snapshot<T> = watch::Receiver<Vec<T>>;

/// Abstraction over a PenPal store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PenPalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert or replace the user with `user.user_id`.
  fn put_user(
    &self,
    user: User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Every readable user record. Malformed records are skipped.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn subscribe_users(&self) -> Snapshot<User>;

  // ── Letters ───────────────────────────────────────────────────────────

  /// Insert a letter, or update the mutable parts (`is_read`, translation)
  /// of an existing one. The letter body and the comment list are never
  /// written through this method.
  fn put_letter(
    &self,
    letter: Letter,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a letter, with its comments, by id.
  fn get_letter(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Letter>, Self::Error>> + Send + '_;

  /// Every readable letter, with comments. Malformed records are skipped.
  fn list_letters(
    &self,
  ) -> impl Future<Output = Result<Vec<Letter>, Self::Error>> + Send + '_;

  /// Append a comment to its letter.
  fn add_comment(
    &self,
    comment: Comment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn subscribe_letters(&self) -> Snapshot<Letter>;

  // ── Evaluations ───────────────────────────────────────────────────────

  fn put_evaluation(
    &self,
    evaluation: Evaluation,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_evaluations(
    &self,
  ) -> impl Future<Output = Result<Vec<Evaluation>, Self::Error>> + Send + '_;

  fn subscribe_evaluations(&self) -> Snapshot<Evaluation>;

  // ── Interaction counters ──────────────────────────────────────────────

  /// Letters sent from `viewer_id` to `subject_id`; 0 if never written.
  fn get_interaction_count(
    &self,
    viewer_id: Uuid,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Overwrite the counter for the pair.
  fn put_interaction_count(
    &self,
    viewer_id: Uuid,
    subject_id: Uuid,
    count: u32,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
