//! Command execution over the API client, with outcomes folded into a
//! [`Session`].

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use penpal_core::{
  evaluation::{NewEvaluation, Rating},
  letter::{self, CommentKind, Letter, NewComment, NewLetter},
  session::{Action, Notification, Session},
  user::NewUser,
};
use uuid::Uuid;

use crate::{client::ApiClient, render};

// ─── Session folding ──────────────────────────────────────────────────────────

/// One `LetterReceived` per unread letter addressed to `me`.
pub fn inbox_actions(letters: &[Letter], me: Uuid) -> Vec<Action> {
  letters
    .iter()
    .filter(|l| l.receiver_id == me && !l.is_read)
    .map(|l| Action::LetterReceived { from: l.sender_id })
    .collect()
}

/// One `CommentReceived` per comment someone else left on a letter `me`
/// wrote.
pub fn outbox_actions(letters: &[Letter], me: Uuid) -> Vec<Action> {
  letters
    .iter()
    .filter(|l| l.sender_id == me)
    .flat_map(|l| {
      l.comments
        .iter()
        .filter(|c| c.author_id != me)
        .map(|c| Action::CommentReceived {
          letter_id: c.letter_id,
        })
    })
    .collect()
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Ratings given on the command line; absent ones use the default.
#[derive(Debug, Default)]
pub struct Ratings {
  pub intimacy:    Option<u8>,
  pub naturalness: Option<u8>,
  pub grammar:     Option<u8>,
}

fn rating(value: Option<u8>) -> Result<Rating> {
  match value {
    Some(v) => Ok(Rating::try_from(v)?),
    None => Ok(Rating::default()),
  }
}

pub struct App {
  client:  ApiClient,
  session: Session,
}

impl App {
  /// Start a session, logged in as `acting_as` when given.
  pub fn new(client: ApiClient, acting_as: Option<Uuid>) -> Self {
    let mut app = Self {
      client,
      session: Session::default(),
    };
    if let Some(me) = acting_as {
      app.apply(Action::LoggedIn(me));
    }
    app
  }

  fn apply(&mut self, action: Action) {
    self.session = std::mem::take(&mut self.session).reduce(action, Utc::now());
  }

  fn me(&self) -> Result<Uuid> {
    self
      .session
      .current_user
      .ok_or_else(|| anyhow!("no acting user; pass --as <USER_ID> or set PENPAL_USER"))
  }

  pub fn notifications(&self) -> &[Notification] { &self.session.notifications }

  // ── Users ─────────────────────────────────────────────────────────────────

  pub async fn register(&mut self, new_user: NewUser) -> Result<String> {
    let user = self.client.register(&new_user).await?;
    tracing::debug!(user_id = %user.user_id, "registered");
    self.apply(Action::LoggedIn(user.user_id));
    Ok(render::user(&user))
  }

  pub async fn search(
    &mut self,
    language: Option<&str>,
    interest: Option<&str>,
  ) -> Result<String> {
    let exclude = self.session.current_user;
    let found = self.client.search(language, interest, exclude).await?;
    Ok(render::profiles(&found))
  }

  pub async fn profile(&mut self, subject_id: Uuid) -> Result<String> {
    let view = self.client.profile(subject_id, self.me()?).await?;
    Ok(render::profile_view(&view))
  }

  // ── Letters ───────────────────────────────────────────────────────────────

  pub async fn send(&mut self, to: Uuid, content: String) -> Result<String> {
    let sender_id = self.me()?;
    self.apply(Action::RecipientSelected(to));
    let letter = self
      .client
      .send(&NewLetter {
        sender_id,
        receiver_id: to,
        content,
      })
      .await?;
    self.apply(Action::LetterSent { to });
    Ok(format!("{}\n", letter.letter_id))
  }

  pub async fn inbox(&mut self) -> Result<String> {
    let me = self.me()?;
    let letters = self.client.inbox(me).await?;
    for action in inbox_actions(&letters, me) {
      self.apply(action);
    }
    let header = render::unread(letter::unread_count(&letters, me));
    Ok(header + &render::letter_list(&letters))
  }

  pub async fn outbox(&mut self) -> Result<String> {
    let me = self.me()?;
    let letters = self.client.outbox(me).await?;
    for action in outbox_actions(&letters, me) {
      self.apply(action);
    }
    Ok(render::letter_list(&letters))
  }

  /// Show a letter, marking it read when the acting user is its recipient.
  pub async fn read(&mut self, letter_id: Uuid) -> Result<String> {
    let me = self.me()?;
    let letter = self.client.get_letter(letter_id).await?;
    if letter.receiver_id != me {
      return Ok(render::letter(&letter));
    }

    let was_unread = !letter.is_read;
    let letter = self
      .client
      .mark_read(letter_id, me)
      .await
      .context("marking letter read")?;
    self.apply(Action::LetterOpened { was_unread });
    Ok(render::letter(&letter))
  }

  pub async fn comment(
    &mut self,
    letter_id: Uuid,
    content: String,
    kind: CommentKind,
  ) -> Result<String> {
    let author_id = self.me()?;
    let comment = self
      .client
      .comment(letter_id, &NewComment {
        author_id,
        content,
        kind,
      })
      .await?;
    Ok(format!("{}\n", comment.comment_id))
  }

  pub async fn translate(&mut self, letter_id: Uuid, text: &str, language: &str) -> Result<String> {
    let letter = self
      .client
      .translate(letter_id, self.me()?, text, language)
      .await?;
    Ok(render::letter(&letter))
  }

  // ── Evaluations ───────────────────────────────────────────────────────────

  pub async fn evaluate(
    &mut self,
    letter_id: Uuid,
    ratings: Ratings,
    corrections: String,
    comments: String,
  ) -> Result<String> {
    let evaluation = NewEvaluation {
      letter_id,
      evaluator_id: self.me()?,
      intimacy: rating(ratings.intimacy)?,
      naturalness: rating(ratings.naturalness)?,
      grammar: rating(ratings.grammar)?,
      corrections,
      comments,
    };
    let evaluation = self.client.evaluate(&evaluation).await?;
    Ok(format!("{}\n", evaluation.evaluation_id))
  }

  pub async fn evaluations(&mut self, given: bool) -> Result<String> {
    let list = self.client.evaluations(self.me()?, given).await?;
    Ok(render::evaluations(&list))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn letter(from: Uuid, to: Uuid) -> Letter {
    NewLetter {
      sender_id:   from,
      receiver_id: to,
      content:     "hi".into(),
    }
    .into_letter(Uuid::new_v4(), Utc::now())
    .unwrap()
  }

  #[test]
  fn only_unread_inbox_letters_notify() {
    let me = Uuid::new_v4();
    let pal = Uuid::new_v4();
    let mut read = letter(pal, me);
    read.is_read = true;
    let letters = vec![letter(pal, me), read, letter(me, pal)];

    assert_eq!(inbox_actions(&letters, me), vec![Action::LetterReceived {
      from: pal
    }]);
  }

  #[test]
  fn own_comments_do_not_notify() {
    let me = Uuid::new_v4();
    let pal = Uuid::new_v4();
    let mut sent = letter(me, pal);
    for author in [me, pal] {
      let c = NewComment {
        author_id: author,
        content:   "note".into(),
        kind:      CommentKind::Suggestion,
      }
      .into_comment(Uuid::new_v4(), sent.letter_id, Utc::now())
      .unwrap();
      sent.comments.push(c);
    }

    assert_eq!(outbox_actions(&[sent.clone()], me), vec![
      Action::CommentReceived {
        letter_id: sent.letter_id
      }
    ]);
  }

  #[test]
  fn missing_rating_uses_default() {
    assert_eq!(rating(None).unwrap(), Rating::default());
    assert_eq!(rating(Some(5)).unwrap().get(), 5);
    assert!(rating(Some(0)).is_err());
  }
}
