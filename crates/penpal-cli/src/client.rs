//! Async HTTP client wrapping the PenPal JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use penpal_core::{
  disclosure::ProfileView,
  evaluation::{Evaluation, NewEvaluation},
  letter::{Comment, Letter, NewComment, NewLetter},
  user::{NewUser, PublicProfile, User},
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;

/// Connection settings for the PenPal API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the PenPal JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub(crate) fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// Send `req` and decode the JSON body, turning a non-2xx status into an
  /// error carrying the server's message.
  async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = req
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let resp = check(resp, what).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {what} response"))
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `POST /api/users`
  pub async fn register(&self, user: &NewUser) -> Result<User> {
    self
      .fetch(self.client.post(self.url("/users")).json(user), "POST /users")
      .await
  }

  /// `GET /api/users[?language=..][&interest=..][&exclude=..]`
  pub async fn search(
    &self,
    language: Option<&str>,
    interest: Option<&str>,
    exclude: Option<Uuid>,
  ) -> Result<Vec<PublicProfile>> {
    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(language) = language {
      query.push(("language", language.to_string()));
    }
    if let Some(interest) = interest {
      query.push(("interest", interest.to_string()));
    }
    if let Some(exclude) = exclude {
      query.push(("exclude", exclude.to_string()));
    }
    self
      .fetch(self.client.get(self.url("/users")).query(&query), "GET /users")
      .await
  }

  /// `GET /api/users/<id>/profile?viewer_id=<viewer>`
  pub async fn profile(&self, subject_id: Uuid, viewer_id: Uuid) -> Result<ProfileView> {
    self
      .fetch(
        self
          .client
          .get(self.url(&format!("/users/{subject_id}/profile")))
          .query(&[("viewer_id", viewer_id.to_string())]),
        "GET /users/{id}/profile",
      )
      .await
  }

  // ── Letters ───────────────────────────────────────────────────────────────

  /// `POST /api/letters`
  pub async fn send(&self, letter: &NewLetter) -> Result<Letter> {
    self
      .fetch(self.client.post(self.url("/letters")).json(letter), "POST /letters")
      .await
  }

  /// `GET /api/letters?recipient_id=<id>`
  pub async fn inbox(&self, user_id: Uuid) -> Result<Vec<Letter>> {
    self
      .fetch(
        self
          .client
          .get(self.url("/letters"))
          .query(&[("recipient_id", user_id.to_string())]),
        "GET /letters (inbox)",
      )
      .await
  }

  /// `GET /api/letters?sender_id=<id>`
  pub async fn outbox(&self, user_id: Uuid) -> Result<Vec<Letter>> {
    self
      .fetch(
        self
          .client
          .get(self.url("/letters"))
          .query(&[("sender_id", user_id.to_string())]),
        "GET /letters (outbox)",
      )
      .await
  }

  /// `GET /api/letters/<id>`
  pub async fn get_letter(&self, letter_id: Uuid) -> Result<Letter> {
    self
      .fetch(
        self.client.get(self.url(&format!("/letters/{letter_id}"))),
        "GET /letters/{id}",
      )
      .await
  }

  /// `POST /api/letters/<id>/read`
  pub async fn mark_read(&self, letter_id: Uuid, reader_id: Uuid) -> Result<Letter> {
    self
      .fetch(
        self
          .client
          .post(self.url(&format!("/letters/{letter_id}/read")))
          .json(&json!({ "reader_id": reader_id })),
        "POST /letters/{id}/read",
      )
      .await
  }

  /// `POST /api/letters/<id>/comments`
  pub async fn comment(&self, letter_id: Uuid, comment: &NewComment) -> Result<Comment> {
    self
      .fetch(
        self
          .client
          .post(self.url(&format!("/letters/{letter_id}/comments")))
          .json(comment),
        "POST /letters/{id}/comments",
      )
      .await
  }

  /// `PUT /api/letters/<id>/translation`
  pub async fn translate(
    &self,
    letter_id: Uuid,
    requester_id: Uuid,
    text: &str,
    language: &str,
  ) -> Result<Letter> {
    self
      .fetch(
        self
          .client
          .put(self.url(&format!("/letters/{letter_id}/translation")))
          .json(&json!({
            "requester_id": requester_id,
            "text": text,
            "language": language,
          })),
        "PUT /letters/{id}/translation",
      )
      .await
  }

  // ── Evaluations ───────────────────────────────────────────────────────────

  /// `POST /api/evaluations`
  pub async fn evaluate(&self, evaluation: &NewEvaluation) -> Result<Evaluation> {
    self
      .fetch(
        self.client.post(self.url("/evaluations")).json(evaluation),
        "POST /evaluations",
      )
      .await
  }

  /// `GET /api/evaluations?receiver_id=<id>` or `?sender_id=<id>`
  pub async fn evaluations(&self, user_id: Uuid, given: bool) -> Result<Vec<Evaluation>> {
    let key = if given { "sender_id" } else { "receiver_id" };
    self
      .fetch(
        self
          .client
          .get(self.url("/evaluations"))
          .query(&[(key, user_id.to_string())]),
        "GET /evaluations",
      )
      .await
  }
}

async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<Value>()
    .await
    .ok()
    .and_then(|body| body["error"].as_str().map(str::to_owned));
  match message {
    Some(message) => Err(anyhow!("{what} → {status}: {message}")),
    None => Err(anyhow!("{what} → {status}")),
  }
}
