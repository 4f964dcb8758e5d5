//! [`Exchange`]: the letter-exchange operations over any [`PenPalStore`].
//!
//! Every store failure is logged here and surfaced as [`Error::Store`];
//! nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  disclosure::ProfileView,
  evaluation::{self, Evaluation, NewEvaluation},
  letter::{self, Comment, Letter, NewComment, NewLetter, Translation},
  store::PenPalStore,
  user::{NewUser, User, UserQuery},
};

fn store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  tracing::error!(error = %e, "store operation did not complete");
  Error::Store(Box::new(e))
}

/// Application service shared by the API handlers.
///
/// Cloning is cheap; the store is reference-counted.
pub struct Exchange<S> {
  store: Arc<S>,
}

impl<S> Clone for Exchange<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

impl<S: PenPalStore> Exchange<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// The underlying store, for subscriptions.
  pub fn store(&self) -> &S { &self.store }

  // ── Users ─────────────────────────────────────────────────────────────

  pub async fn register(&self, input: NewUser) -> Result<User> {
    let user = input.into_user(Uuid::new_v4(), Utc::now())?;
    self.store.put_user(user.clone()).await.map_err(store_err)?;
    tracing::info!(user_id = %user.user_id, "registered user");
    Ok(user)
  }

  pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.store.get_user(id).await.map_err(store_err)
  }

  async fn require_user(&self, id: Uuid) -> Result<User> {
    self.get_user(id).await?.ok_or(Error::UserNotFound(id))
  }

  /// Users matching `query`, in store order.
  pub async fn search(&self, query: &UserQuery) -> Result<Vec<User>> {
    let mut users = self.store.list_users().await.map_err(store_err)?;
    users.retain(|u| query.matches(u));
    Ok(users)
  }

  /// Render `subject_id`'s profile for `viewer_id`, using the persisted
  /// interaction count. Returns `None` if the subject does not exist.
  pub async fn view_profile(
    &self,
    viewer_id: Uuid,
    subject_id: Uuid,
  ) -> Result<Option<ProfileView>> {
    let Some(subject) = self.get_user(subject_id).await? else {
      return Ok(None);
    };

    if viewer_id == subject_id {
      return Ok(Some(ProfileView::for_owner(&subject, 0)));
    }

    let count = self.interaction_count(viewer_id, subject_id).await?;
    Ok(Some(ProfileView::for_viewer(&subject, count)))
  }

  pub async fn interaction_count(&self, viewer_id: Uuid, subject_id: Uuid) -> Result<u32> {
    self
      .store
      .get_interaction_count(viewer_id, subject_id)
      .await
      .map_err(store_err)
  }

  /// Read-then-write increment. Two concurrent sends for the same pair can
  /// both read `n` and both write `n + 1`; the last writer wins.
  async fn bump_interaction(&self, viewer_id: Uuid, subject_id: Uuid) -> Result<u32> {
    let next = self
      .interaction_count(viewer_id, subject_id)
      .await?
      .saturating_add(1);
    self
      .store
      .put_interaction_count(viewer_id, subject_id, next)
      .await
      .map_err(store_err)?;
    Ok(next)
  }

  // ── Letters ───────────────────────────────────────────────────────────

  pub async fn send_letter(&self, input: NewLetter) -> Result<Letter> {
    let letter = input.into_letter(Uuid::new_v4(), Utc::now())?;
    self.require_user(letter.sender_id).await?;
    self.require_user(letter.receiver_id).await?;

    self.store.put_letter(letter.clone()).await.map_err(store_err)?;
    let count = self
      .bump_interaction(letter.sender_id, letter.receiver_id)
      .await?;

    tracing::info!(
      letter_id = %letter.letter_id,
      sender_id = %letter.sender_id,
      receiver_id = %letter.receiver_id,
      interaction_count = count,
      "letter sent"
    );
    Ok(letter)
  }

  pub async fn get_letter(&self, id: Uuid) -> Result<Option<Letter>> {
    self.store.get_letter(id).await.map_err(store_err)
  }

  async fn require_letter(&self, id: Uuid) -> Result<Letter> {
    self.get_letter(id).await?.ok_or(Error::LetterNotFound(id))
  }

  pub async fn inbox(&self, user_id: Uuid) -> Result<Vec<Letter>> {
    let letters = self.store.list_letters().await.map_err(store_err)?;
    Ok(letter::inbox(&letters, user_id))
  }

  pub async fn outbox(&self, user_id: Uuid) -> Result<Vec<Letter>> {
    let letters = self.store.list_letters().await.map_err(store_err)?;
    Ok(letter::outbox(&letters, user_id))
  }

  /// Only the recipient may mark a letter read. Marking twice is a no-op.
  pub async fn mark_read(&self, letter_id: Uuid, reader_id: Uuid) -> Result<Letter> {
    let mut letter = self.require_letter(letter_id).await?;
    if letter.receiver_id != reader_id {
      return Err(Error::NotRecipient(letter_id));
    }
    if letter.is_read {
      return Ok(letter);
    }

    letter.is_read = true;
    self.store.put_letter(letter.clone()).await.map_err(store_err)?;
    tracing::debug!(%letter_id, "letter marked read");
    Ok(letter)
  }

  pub async fn add_comment(&self, letter_id: Uuid, input: NewComment) -> Result<Comment> {
    let letter = self.require_letter(letter_id).await?;
    if !letter.involves(input.author_id) {
      return Err(Error::NotParticipant {
        user:   input.author_id,
        letter: letter_id,
      });
    }

    let comment = input.into_comment(Uuid::new_v4(), letter_id, Utc::now())?;
    self.store.add_comment(comment.clone()).await.map_err(store_err)?;
    tracing::debug!(%letter_id, comment_id = %comment.comment_id, kind = %comment.kind, "comment added");
    Ok(comment)
  }

  /// Attach (or replace) the translation shown with a letter.
  pub async fn attach_translation(
    &self,
    letter_id: Uuid,
    requester_id: Uuid,
    translation: Translation,
  ) -> Result<Letter> {
    let mut letter = self.require_letter(letter_id).await?;
    if !letter.involves(requester_id) {
      return Err(Error::NotParticipant {
        user:   requester_id,
        letter: letter_id,
      });
    }

    letter.translation = Some(translation);
    self.store.put_letter(letter.clone()).await.map_err(store_err)?;
    Ok(letter)
  }

  // ── Evaluations ───────────────────────────────────────────────────────

  /// Submit feedback on a received letter. The evaluator must be the
  /// letter's recipient; the evaluated user is the letter's writer.
  pub async fn submit_evaluation(&self, input: NewEvaluation) -> Result<Evaluation> {
    let letter = self.require_letter(input.letter_id).await?;
    if letter.receiver_id != input.evaluator_id {
      return Err(Error::NotRecipient(letter.letter_id));
    }

    let evaluation = input.into_evaluation(Uuid::new_v4(), letter.sender_id, Utc::now());
    self
      .store
      .put_evaluation(evaluation.clone())
      .await
      .map_err(store_err)?;
    tracing::info!(
      evaluation_id = %evaluation.evaluation_id,
      letter_id = %evaluation.letter_id,
      "evaluation submitted"
    );
    Ok(evaluation)
  }

  pub async fn evaluations_received(&self, user_id: Uuid) -> Result<Vec<Evaluation>> {
    let all = self.store.list_evaluations().await.map_err(store_err)?;
    Ok(evaluation::received_by(&all, user_id))
  }

  pub async fn evaluations_given(&self, user_id: Uuid) -> Result<Vec<Evaluation>> {
    let all = self.store.list_evaluations().await.map_err(store_err)?;
    Ok(evaluation::given_by(&all, user_id))
  }
}
