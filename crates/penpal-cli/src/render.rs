//! Plain-text rendering of API records for the terminal.

use std::fmt::Write as _;

use penpal_core::{
  disclosure::{GENDER_THRESHOLD, ProfileView},
  evaluation::Evaluation,
  letter::{Language, Letter},
  session::Notification,
  user::{PublicProfile, User},
};

fn interests<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
  let joined = items
    .into_iter()
    .map(String::as_str)
    .collect::<Vec<_>>()
    .join(", ");
  if joined.is_empty() { "-".to_string() } else { joined }
}

pub fn user(u: &User) -> String {
  let mut out = format!("{}  {}\n", u.user_id, u.name);
  let _ = writeln!(out, "  language:  {}", u.language);
  if let Some(country) = &u.country {
    let _ = writeln!(out, "  country:   {country}");
  }
  let _ = writeln!(out, "  interests: {}", interests(&u.interests));
  let _ = writeln!(
    out,
    "  details:   {}",
    if u.allow_details { "shared with pen pals" } else { "private" }
  );
  out
}

/// One line per profile.
pub fn profiles(list: &[PublicProfile]) -> String {
  if list.is_empty() {
    return "No pen pals found.\n".to_string();
  }
  list
    .iter()
    .map(|p| {
      format!(
        "{}  {:<20} {:<12} {}\n",
        p.user_id,
        p.name,
        p.language,
        interests(&p.interests)
      )
    })
    .collect()
}

pub fn profile_view(view: &ProfileView) -> String {
  let p = &view.profile;
  let mut out = format!("{}  {}\n", p.user_id, p.name);
  let _ = writeln!(out, "  language:  {}", p.language);
  if let Some(country) = &p.country {
    let _ = writeln!(out, "  country:   {country}");
  }
  let _ = writeln!(out, "  interests: {}", interests(&p.interests));
  if let Some(gender) = &view.disclosed.gender {
    let _ = writeln!(out, "  gender:    {gender}");
  }
  if let Some(photo) = &view.disclosed.photo {
    let _ = writeln!(out, "  photo:     {photo}");
  }
  let _ = writeln!(out, "  letters you have sent: {}", view.interaction_count);
  if view.disclosed.is_empty() && p.allow_details && view.interaction_count < GENDER_THRESHOLD {
    let _ = writeln!(
      out,
      "  (more of this profile appears after {GENDER_THRESHOLD} letters)"
    );
  }
  out
}

/// Inbox header.
pub fn unread(count: usize) -> String {
  match count {
    0 => "No unread letters.\n".to_string(),
    1 => "1 unread letter.\n".to_string(),
    n => format!("{n} unread letters.\n"),
  }
}

/// Inbox/outbox listing, newest first as returned by the server.
pub fn letter_list(letters: &[Letter]) -> String {
  if letters.is_empty() {
    return "No letters.\n".to_string();
  }
  letters
    .iter()
    .map(|l| {
      let marker = if l.is_read { ' ' } else { '*' };
      let preview: String = l.content.lines().next().unwrap_or("").chars().take(40).collect();
      format!(
        "{marker} {}  {}  {} → {}  {preview}\n",
        l.letter_id,
        l.sent_at.format("%Y-%m-%d %H:%M"),
        short(l.sender_id),
        short(l.receiver_id),
      )
    })
    .collect()
}

pub fn letter(l: &Letter) -> String {
  let mut out = format!("Letter {}\n", l.letter_id);
  let _ = writeln!(out, "  from: {}", l.sender_id);
  let _ = writeln!(out, "  to:   {}", l.receiver_id);
  let _ = writeln!(out, "  sent: {}", l.sent_at.to_rfc3339());
  let _ = writeln!(out, "\n{}\n", l.content);
  if let Some(t) = &l.translation {
    let _ = writeln!(out, "[{}]\n{}\n", language_label(t.language), t.text);
  }
  for c in &l.comments {
    let _ = writeln!(out, "  ({}) {}: {}", c.kind, short(c.author_id), c.content);
  }
  out
}

pub fn evaluations(list: &[Evaluation]) -> String {
  if list.is_empty() {
    return "No evaluations.\n".to_string();
  }
  let mut out = String::new();
  for e in list {
    let _ = writeln!(
      out,
      "{}  letter {}  intimacy {}  naturalness {}  grammar {}",
      e.sent_at.format("%Y-%m-%d"),
      short(e.letter_id),
      e.intimacy.get(),
      e.naturalness.get(),
      e.grammar.get(),
    );
    if !e.corrections.is_empty() {
      let _ = writeln!(out, "  corrections: {}", e.corrections);
    }
    if !e.comments.is_empty() {
      let _ = writeln!(out, "  comments:    {}", e.comments);
    }
  }
  out
}

pub fn notification(n: &Notification) -> String {
  format!("[{}] {}", n.kind, n.message)
}

fn language_label(language: Language) -> String {
  format!("{} ({language})", language.native_name())
}

/// First block of a UUID, enough to tell letters apart on screen.
fn short(id: uuid::Uuid) -> String {
  id.simple().to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  use chrono::Utc;
  use penpal_core::{
    disclosure::Disclosure,
    letter::{NewLetter, Translation},
    user::NewUser,
  };
  use uuid::Uuid;

  fn sample_letter(content: &str) -> Letter {
    NewLetter {
      sender_id:   Uuid::new_v4(),
      receiver_id: Uuid::new_v4(),
      content:     content.into(),
    }
    .into_letter(Uuid::new_v4(), Utc::now())
    .unwrap()
  }

  #[test]
  fn unread_letters_are_starred() {
    let mut read = sample_letter("Seen it");
    read.is_read = true;
    let unread = sample_letter("First line\nsecond line");
    let out = letter_list(&[unread, read]);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with('*'));
    assert!(lines[0].ends_with("First line"));
    assert!(lines[1].starts_with(' '));
  }

  #[test]
  fn translation_shows_native_name() {
    let mut l = sample_letter("Hello");
    l.translation = Some(Translation::new("こんにちは", Language::Ja).unwrap());
    let out = letter(&l);
    assert!(out.contains("[日本語 (ja)]"));
    assert!(out.contains("こんにちは"));
  }

  #[test]
  fn profile_view_shows_only_disclosed_fields() {
    let user = NewUser::new("Aiko", "Japanese")
      .into_user(Uuid::new_v4(), Utc::now())
      .unwrap();
    let view = ProfileView {
      profile:           user.public(),
      interaction_count: 3,
      disclosed:         Disclosure {
        gender: Some("female".into()),
        photo:  None,
      },
    };
    let out = profile_view(&view);
    assert!(out.contains("gender:    female"));
    assert!(!out.contains("photo"));
    assert!(out.contains("letters you have sent: 3"));
  }

  #[test]
  fn hint_only_while_nothing_is_disclosed() {
    let mut input = NewUser::new("Aiko", "Japanese");
    input.allow_details = true;
    let user = input.into_user(Uuid::new_v4(), Utc::now()).unwrap();

    let early = ProfileView::for_viewer(&user, 1);
    assert!(profile_view(&early).contains("after 3 letters"));

    let private = ProfileView::for_viewer(
      &NewUser::new("Ben", "English")
        .into_user(Uuid::new_v4(), Utc::now())
        .unwrap(),
      1,
    );
    assert!(!profile_view(&private).contains("after 3 letters"));
  }

  #[test]
  fn empty_lists_say_so() {
    assert_eq!(unread(0), "No unread letters.\n");
    assert_eq!(letter_list(&[]), "No letters.\n");
    assert_eq!(profiles(&[]), "No pen pals found.\n");
    assert_eq!(evaluations(&[]), "No evaluations.\n");
  }
}
