//! [`SqliteStore`]: the SQLite implementation of [`PenPalStore`].

use std::{collections::HashMap, path::Path, sync::Arc};

use rusqlite::OptionalExtension as _;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use penpal_core::{
  evaluation::Evaluation,
  letter::{Comment, Letter},
  store::{PenPalStore, Snapshot},
  user::User,
};

use crate::{
  encode::{
    COMMENT_COLUMNS, EVALUATION_COLUMNS, LETTER_COLUMNS, RawComment, RawEvaluation,
    RawLetter, RawUser, USER_COLUMNS, decode_all, encode_dt, encode_interests,
    encode_translation, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Snapshot feeds ──────────────────────────────────────────────────────────

/// A subscribable collection.
///
/// `refresh` is held from the re-read through `send_replace`, so snapshots are
/// published in the order they were read and a slow writer can never replace
/// a newer snapshot with an older one.
struct Feed<T> {
  tx:      watch::Sender<Vec<T>>,
  refresh: Mutex<()>,
}

impl<T> Feed<T> {
  fn new() -> Self {
    Self {
      tx:      watch::Sender::new(Vec::new()),
      refresh: Mutex::new(()),
    }
  }
}

struct Feeds {
  users:       Feed<User>,
  letters:     Feed<Letter>,
  evaluations: Feed<Evaluation>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A PenPal store backed by a single SQLite file.
///
/// Cloning is cheap; the connection and the snapshot feeds are
/// reference-counted, so every clone publishes to the same subscribers.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  feeds:           Arc<Feeds>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    let store = Self {
      conn,
      feeds: Arc::new(Feeds {
        users:       Feed::new(),
        letters:     Feed::new(),
        evaluations: Feed::new(),
      }),
    };

    store.publish_users().await;
    store.publish_letters().await;
    store.publish_evaluations().await;
    Ok(store)
  }

  // ── Publishing ────────────────────────────────────────────────────────────

  // A failed refresh leaves subscribers on the previous snapshot; the write
  // that triggered it has already succeeded.

  async fn publish_users(&self) {
    let _refresh = self.feeds.users.refresh.lock().await;
    match self.read_users().await {
      Ok(users) => {
        self.feeds.users.tx.send_replace(users);
      }
      Err(e) => tracing::warn!(error = %e, "failed to refresh user snapshot"),
    }
  }

  async fn publish_letters(&self) {
    let _refresh = self.feeds.letters.refresh.lock().await;
    match self.read_letters().await {
      Ok(letters) => {
        self.feeds.letters.tx.send_replace(letters);
      }
      Err(e) => tracing::warn!(error = %e, "failed to refresh letter snapshot"),
    }
  }

  async fn publish_evaluations(&self) {
    let _refresh = self.feeds.evaluations.refresh.lock().await;
    match self.read_evaluations().await {
      Ok(evaluations) => {
        self.feeds.evaluations.tx.send_replace(evaluations);
      }
      Err(e) => tracing::warn!(error = %e, "failed to refresh evaluation snapshot"),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn read_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, user_id"
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(decode_all(raws, "user", RawUser::into_user))
  }

  /// All comments grouped by letter, oldest first within each letter.
  async fn read_comments(&self, letter_id: Option<Uuid>) -> Result<HashMap<Uuid, Vec<Comment>>> {
    let letter_id_str = letter_id.map(encode_uuid);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE ?1 IS NULL OR letter_id = ?1
           ORDER BY created_at, comment_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![letter_id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut grouped: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for comment in decode_all(raws, "comment", RawComment::into_comment) {
      grouped.entry(comment.letter_id).or_default().push(comment);
    }
    Ok(grouped)
  }

  async fn read_letters(&self) -> Result<Vec<Letter>> {
    let raws: Vec<RawLetter> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LETTER_COLUMNS} FROM letters ORDER BY sent_at, letter_id"
        ))?;
        let rows = stmt
          .query_map([], RawLetter::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut comments = self.read_comments(None).await?;
    let mut letters = decode_all(raws, "letter", RawLetter::into_letter);
    for letter in &mut letters {
      letter.comments = comments.remove(&letter.letter_id).unwrap_or_default();
    }
    Ok(letters)
  }

  async fn read_evaluations(&self) -> Result<Vec<Evaluation>> {
    let raws: Vec<RawEvaluation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVALUATION_COLUMNS} FROM evaluations ORDER BY sent_at, evaluation_id"
        ))?;
        let rows = stmt
          .query_map([], RawEvaluation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(decode_all(raws, "evaluation", RawEvaluation::into_evaluation))
  }
}

// ─── PenPalStore impl ────────────────────────────────────────────────────────

impl PenPalStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn put_user(&self, user: User) -> Result<()> {
    let id_str        = encode_uuid(user.user_id);
    let interests_str = encode_interests(&user.interests)?;
    let created_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, name, gender, photo, language, country,
             interests, allow_details, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
           ON CONFLICT (user_id) DO UPDATE SET
             name          = excluded.name,
             gender        = excluded.gender,
             photo         = excluded.photo,
             language      = excluded.language,
             country       = excluded.country,
             interests     = excluded.interests,
             allow_details = excluded.allow_details",
          rusqlite::params![
            id_str,
            user.name,
            user.gender,
            user.photo,
            user.language,
            user.country,
            interests_str,
            user.allow_details,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.publish_users().await;
    Ok(())
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            rusqlite::params![id_str],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(raw.and_then(|r| decode_all(vec![r], "user", RawUser::into_user).pop()))
  }

  async fn list_users(&self) -> Result<Vec<User>> { self.read_users().await }

  fn subscribe_users(&self) -> Snapshot<User> { self.feeds.users.tx.subscribe() }

  // ── Letters ───────────────────────────────────────────────────────────────

  async fn put_letter(&self, letter: Letter) -> Result<()> {
    let id_str          = encode_uuid(letter.letter_id);
    let sender_str      = encode_uuid(letter.sender_id);
    let receiver_str    = encode_uuid(letter.receiver_id);
    let sent_str        = encode_dt(letter.sent_at);
    let translation_str = letter
      .translation
      .as_ref()
      .map(encode_translation)
      .transpose()?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO letters (
             letter_id, sender_id, receiver_id, content, sent_at, is_read, translation
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (letter_id) DO UPDATE SET
             is_read     = MAX(letters.is_read, excluded.is_read),
             translation = COALESCE(excluded.translation, letters.translation)",
          rusqlite::params![
            id_str,
            sender_str,
            receiver_str,
            letter.content,
            sent_str,
            letter.is_read,
            translation_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.publish_letters().await;
    Ok(())
  }

  async fn get_letter(&self, id: Uuid) -> Result<Option<Letter>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawLetter> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {LETTER_COLUMNS} FROM letters WHERE letter_id = ?1"),
            rusqlite::params![id_str],
            RawLetter::from_row,
          )
          .optional()?)
      })
      .await?;

    let Some(mut letter) =
      raw.and_then(|r| decode_all(vec![r], "letter", RawLetter::into_letter).pop())
    else {
      return Ok(None);
    };

    letter.comments = self
      .read_comments(Some(id))
      .await?
      .remove(&id)
      .unwrap_or_default();
    Ok(Some(letter))
  }

  async fn list_letters(&self) -> Result<Vec<Letter>> { self.read_letters().await }

  async fn add_comment(&self, comment: Comment) -> Result<()> {
    let id_str      = encode_uuid(comment.comment_id);
    let letter_str  = encode_uuid(comment.letter_id);
    let author_str  = encode_uuid(comment.author_id);
    let kind_str    = comment.kind.as_ref().to_owned();
    let created_str = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, letter_id, author_id, content, kind, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            letter_str,
            author_str,
            comment.content,
            kind_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.publish_letters().await;
    Ok(())
  }

  fn subscribe_letters(&self) -> Snapshot<Letter> { self.feeds.letters.tx.subscribe() }

  // ── Evaluations ───────────────────────────────────────────────────────────

  async fn put_evaluation(&self, evaluation: Evaluation) -> Result<()> {
    let id_str       = encode_uuid(evaluation.evaluation_id);
    let letter_str   = encode_uuid(evaluation.letter_id);
    let sender_str   = encode_uuid(evaluation.sender_id);
    let receiver_str = encode_uuid(evaluation.receiver_id);
    let sent_str     = encode_dt(evaluation.sent_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO evaluations (
             evaluation_id, letter_id, sender_id, receiver_id,
             intimacy, naturalness, grammar, corrections, comments, sent_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            letter_str,
            sender_str,
            receiver_str,
            evaluation.intimacy.get(),
            evaluation.naturalness.get(),
            evaluation.grammar.get(),
            evaluation.corrections,
            evaluation.comments,
            sent_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.publish_evaluations().await;
    Ok(())
  }

  async fn list_evaluations(&self) -> Result<Vec<Evaluation>> { self.read_evaluations().await }

  fn subscribe_evaluations(&self) -> Snapshot<Evaluation> {
    self.feeds.evaluations.tx.subscribe()
  }

  // ── Interaction counters ──────────────────────────────────────────────────

  async fn get_interaction_count(&self, viewer_id: Uuid, subject_id: Uuid) -> Result<u32> {
    let viewer_str  = encode_uuid(viewer_id);
    let subject_str = encode_uuid(subject_id);

    let count: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT count FROM interactions WHERE viewer_id = ?1 AND subject_id = ?2",
            rusqlite::params![viewer_str, subject_str],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    match count {
      None => Ok(0),
      Some(n) => u32::try_from(n)
        .map_err(|_| Error::Malformed(format!("interaction count out of range: {n}"))),
    }
  }

  async fn put_interaction_count(
    &self,
    viewer_id:  Uuid,
    subject_id: Uuid,
    count:      u32,
  ) -> Result<()> {
    let viewer_str  = encode_uuid(viewer_id);
    let subject_str = encode_uuid(subject_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO interactions (viewer_id, subject_id, count) VALUES (?1, ?2, ?3)
           ON CONFLICT (viewer_id, subject_id) DO UPDATE SET count = excluded.count",
          rusqlite::params![viewer_str, subject_str, count],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
