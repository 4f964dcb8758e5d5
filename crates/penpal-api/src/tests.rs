//! Router tests against an in-memory SQLite store.

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  body::{Body, BodyDataStream},
  http::{Request, StatusCode, header},
};
use penpal_core::exchange::Exchange;
use penpal_store_sqlite::SqliteStore;
use futures_util::StreamExt as _;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Exchange::new(Arc::new(store)))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn register(app: &Router, name: &str, gender: &str, allow_details: bool) -> String {
  let (status, body) = call(
    app,
    "POST",
    "/users",
    Some(json!({
      "name": name,
      "gender": gender,
      "photo": format!("https://example.org/{name}.png"),
      "language": "Japanese",
      "interests": ["music", "travel"],
      "allow_details": allow_details,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["user_id"].as_str().unwrap().to_owned()
}

async fn send(app: &Router, from: &str, to: &str, content: &str) -> (StatusCode, Value) {
  call(
    app,
    "POST",
    "/letters",
    Some(json!({ "sender_id": from, "receiver_id": to, "content": content })),
  )
  .await
}

/// An open SSE response, read one `snapshot` event at a time.
struct Events {
  content_type: String,
  body:         BodyDataStream,
  buf:          String,
}

impl Events {
  async fn open(app: &Router, uri: &str) -> Self {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[header::CONTENT_TYPE]
      .to_str()
      .unwrap()
      .to_owned();
    Self {
      content_type,
      body: resp.into_body().into_data_stream(),
      buf: String::new(),
    }
  }

  /// Payload of the next `snapshot` event, skipping keep-alives.
  async fn next_snapshot(&mut self) -> Value {
    loop {
      if let Some(end) = self.buf.find("\n\n") {
        let raw: String = self.buf.drain(..end + 2).collect();
        let mut name = None;
        let mut data = String::new();
        for line in raw.lines() {
          if let Some(v) = line.strip_prefix("event:") {
            name = Some(v.trim().to_owned());
          } else if let Some(v) = line.strip_prefix("data:") {
            data.push_str(v.trim_start());
          }
        }
        if name.as_deref() == Some("snapshot") {
          return serde_json::from_str(&data).unwrap();
        }
        continue;
      }

      let chunk = tokio::time::timeout(Duration::from_secs(5), self.body.next())
        .await
        .expect("no event within 5s")
        .expect("stream ended")
        .unwrap();
      self.buf.push_str(std::str::from_utf8(&chunk).unwrap());
    }
  }
}

// ── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_returns_full_record_but_lookup_is_public() {
  let app = app().await;
  let id = register(&app, "Aiko", "female", true).await;

  let (status, body) = call(&app, "GET", &format!("/users/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "Aiko");
  assert!(body.get("gender").is_none());
  assert!(body.get("photo").is_none());
}

#[tokio::test]
async fn register_blank_name_is_bad_request() {
  let app = app().await;
  let (status, body) = call(
    &app,
    "POST",
    "/users",
    Some(json!({ "name": "  ", "language": "English" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_user_is_not_found() {
  let app = app().await;
  let id = uuid::Uuid::new_v4();
  let (status, _) = call(&app, "GET", &format!("/users/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_filters_and_excludes() {
  let app = app().await;
  let me = register(&app, "Aiko", "female", true).await;
  register(&app, "Ben", "male", true).await;

  let (status, body) = call(
    &app,
    "GET",
    &format!("/users?language=japan&interest=MUSIC&exclude={me}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<&str> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|u| u["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["Ben"]);
}

#[tokio::test]
async fn profile_discloses_after_enough_letters() {
  let app = app().await;
  let aiko = register(&app, "Aiko", "female", true).await;
  let ben = register(&app, "Ben", "male", true).await;

  for i in 0..3 {
    let (status, _) = send(&app, &ben, &aiko, &format!("letter {i}")).await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let uri = format!("/users/{aiko}/profile?viewer_id={ben}");
  let (status, body) = call(&app, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["interaction_count"], 3);
  assert_eq!(body["disclosed"]["gender"], "female");
  assert!(body["disclosed"].get("photo").is_none());

  let uri = format!("/interactions?viewer_id={ben}&subject_id={aiko}");
  let (_, body) = call(&app, "GET", &uri, None).await;
  assert_eq!(body["count"], 3);

  // The other direction has no history.
  let uri = format!("/interactions?viewer_id={aiko}&subject_id={ben}");
  let (_, body) = call(&app, "GET", &uri, None).await;
  assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn profile_requires_viewer() {
  let app = app().await;
  let aiko = register(&app, "Aiko", "female", true).await;
  let (status, body) = call(&app, "GET", &format!("/users/{aiko}/profile"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("viewer_id"));
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
  let app = app().await;

  let (status, body) = call(&app, "GET", "/users/not-a-uuid", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) = call(&app, "POST", "/users", Some(json!({ "language": "English" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) = call(&app, "GET", "/letters/stream", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

// ── Letters ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_and_list_letters() {
  let app = app().await;
  let aiko = register(&app, "Aiko", "female", true).await;
  let ben = register(&app, "Ben", "male", true).await;

  let (status, letter) = send(&app, &ben, &aiko, "Hello from Ben").await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(letter["is_read"], false);

  let (status, inbox) = call(&app, "GET", &format!("/letters?recipient_id={aiko}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(inbox.as_array().unwrap().len(), 1);

  let (_, outbox) = call(&app, "GET", &format!("/letters?sender_id={aiko}"), None).await;
  assert!(outbox.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_letters_needs_exactly_one_filter() {
  let app = app().await;
  let (status, _) = call(&app, "GET", "/letters", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let a = uuid::Uuid::new_v4();
  let uri = format!("/letters?recipient_id={a}&sender_id={a}");
  let (status, _) = call(&app, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_rejects_empty_and_unknown_recipient() {
  let app = app().await;
  let ben = register(&app, "Ben", "male", true).await;
  let aiko = register(&app, "Aiko", "female", true).await;

  let (status, _) = send(&app, &ben, &aiko, "   ").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let ghost = uuid::Uuid::new_v4().to_string();
  let (status, _) = send(&app, &ben, &ghost, "hi").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_recipient_marks_read() {
  let app = app().await;
  let aiko = register(&app, "Aiko", "female", true).await;
  let ben = register(&app, "Ben", "male", true).await;
  let (_, letter) = send(&app, &ben, &aiko, "Hello").await;
  let id = letter["letter_id"].as_str().unwrap();

  let uri = format!("/letters/{id}/read");
  let (status, _) = call(&app, "POST", &uri, Some(json!({ "reader_id": ben }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = call(&app, "POST", &uri, Some(json!({ "reader_id": aiko }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["is_read"], true);

  let (_, fetched) = call(&app, "GET", &format!("/letters/{id}"), None).await;
  assert_eq!(fetched["is_read"], true);
}

#[tokio::test]
async fn comments_and_translation() {
  let app = app().await;
  let aiko = register(&app, "Aiko", "female", true).await;
  let ben = register(&app, "Ben", "male", true).await;
  let outsider = register(&app, "Chen", "male", true).await;
  let (_, letter) = send(&app, &ben, &aiko, "I am go to school").await;
  let id = letter["letter_id"].as_str().unwrap();

  let uri = format!("/letters/{id}/comments");
  let (status, comment) = call(
    &app,
    "POST",
    &uri,
    Some(json!({ "author_id": aiko, "content": "I am going", "kind": "correction" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(comment["kind"], "correction");

  let (status, _) = call(
    &app,
    "POST",
    &uri,
    Some(json!({ "author_id": outsider, "content": "hi" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let uri = format!("/letters/{id}/translation");
  let (status, body) = call(
    &app,
    "PUT",
    &uri,
    Some(json!({ "requester_id": aiko, "text": "学校に行きます", "language": "JA" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["translation"]["language"], "ja");
  assert_eq!(body["comments"].as_array().unwrap().len(), 1);

  let (status, _) = call(
    &app,
    "PUT",
    &uri,
    Some(json!({ "requester_id": aiko, "text": "hola", "language": "xx" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn letter_stream_sends_only_the_recipients_inbox() {
  let app = app().await;
  let aiko = register(&app, "Aiko", "female", true).await;
  let ben = register(&app, "Ben", "male", true).await;
  let chen = register(&app, "Chen", "male", true).await;
  send(&app, &ben, &chen, "for Chen").await;

  let mut events = Events::open(&app, &format!("/letters/stream?recipient_id={aiko}")).await;
  assert_eq!(events.content_type, "text/event-stream");
  assert_eq!(events.next_snapshot().await, json!([]));

  send(&app, &ben, &aiko, "for Aiko").await;
  let inbox = events.next_snapshot().await;
  let inbox = inbox.as_array().unwrap();
  assert_eq!(inbox.len(), 1);
  assert_eq!(inbox[0]["content"], "for Aiko");
  assert_eq!(inbox[0]["receiver_id"], aiko.as_str());

  // A letter to someone else still triggers a fresh, complete snapshot.
  send(&app, &ben, &chen, "again for Chen").await;
  let inbox = events.next_snapshot().await;
  let contents: Vec<&str> = inbox
    .as_array()
    .unwrap()
    .iter()
    .map(|l| l["content"].as_str().unwrap())
    .collect();
  assert_eq!(contents, vec!["for Aiko"]);
}

#[tokio::test]
async fn user_stream_carries_public_profiles() {
  let app = app().await;
  register(&app, "Aiko", "female", true).await;

  let mut events = Events::open(&app, "/users/stream").await;
  let users = events.next_snapshot().await;
  let users = users.as_array().unwrap();
  assert_eq!(users.len(), 1);
  assert_eq!(users[0]["name"], "Aiko");
  assert!(users[0].get("gender").is_none());
  assert!(users[0].get("photo").is_none());

  register(&app, "Ben", "male", true).await;
  let users = events.next_snapshot().await;
  assert_eq!(users.as_array().unwrap().len(), 2);
}

// ── Evaluations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn evaluations_by_recipient_only() {
  let app = app().await;
  let aiko = register(&app, "Aiko", "female", true).await;
  let ben = register(&app, "Ben", "male", true).await;
  let (_, letter) = send(&app, &ben, &aiko, "Hello").await;
  let id = letter["letter_id"].as_str().unwrap();

  let (status, _) = call(
    &app,
    "POST",
    "/evaluations",
    Some(json!({ "letter_id": id, "evaluator_id": ben, "grammar": 4 })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  for grammar in [9, 300] {
    let (status, body) = call(
      &app,
      "POST",
      "/evaluations",
      Some(json!({ "letter_id": id, "evaluator_id": aiko, "grammar": grammar })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  let (status, evaluation) = call(
    &app,
    "POST",
    "/evaluations",
    Some(json!({ "letter_id": id, "evaluator_id": aiko, "grammar": 4 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(evaluation["grammar"], 4);
  assert_eq!(evaluation["intimacy"], 3);
  assert_eq!(evaluation["receiver_id"], ben.as_str());

  let (_, about_ben) = call(&app, "GET", &format!("/evaluations?receiver_id={ben}"), None).await;
  assert_eq!(about_ben.as_array().unwrap().len(), 1);
  let (_, by_ben) = call(&app, "GET", &format!("/evaluations?sender_id={ben}"), None).await;
  assert!(by_ben.as_array().unwrap().is_empty());
}
