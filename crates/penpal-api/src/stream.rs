//! Server-sent event streams over store snapshots.
//!
//! Each stream sends the current snapshot immediately, then a fresh one after
//! every change to the underlying collection. Every event carries the complete
//! (projected) collection, never a delta.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::watch;

/// Turn a snapshot receiver into an SSE response. `project` filters and
/// shapes each snapshot before it is sent.
pub fn snapshots<T, U, F>(
  rx: watch::Receiver<Vec<T>>,
  project: F,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
  T: Send + Sync + 'static,
  U: Serialize,
  F: Fn(&[T]) -> U + Send + 'static,
{
  let stream = stream::unfold((rx, project, true), |(mut rx, project, first)| async move {
    if !first && rx.changed().await.is_err() {
      // Store dropped; end the stream.
      return None;
    }

    let payload = project(&rx.borrow_and_update());
    let event = match Event::default().event("snapshot").json_data(&payload) {
      Ok(event) => event,
      Err(e) => {
        tracing::warn!(error = %e, "failed to encode snapshot");
        Event::default().comment("snapshot unavailable")
      }
    };
    Some((Ok(event), (rx, project, false)))
  });

  Sse::new(stream).keep_alive(
    KeepAlive::new()
      .interval(Duration::from_secs(15))
      .text("ping"),
  )
}
