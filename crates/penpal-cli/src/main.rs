//! `penpal`: command-line client for the PenPal letter exchange.
//!
//! # Usage
//!
//! ```text
//! penpal register --name Aiko --language Japanese --interest music
//! penpal --as <USER_ID> search --language english
//! penpal --as <USER_ID> send <RECIPIENT_ID> "Hello from Osaka!"
//! penpal --config ~/.config/penpal/config.toml inbox
//! ```

mod app;
mod client;
mod render;

use anyhow::{Context, Result};
use app::{App, Ratings};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use penpal_core::{letter::CommentKind, user::NewUser};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "penpal", about = "Command-line client for the PenPal letter exchange")]
struct Args {
  /// Path to a TOML config file (url, user).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the penpal server (default: http://localhost:8080).
  #[arg(long, env = "PENPAL_URL")]
  url: Option<String>,

  /// User id to act as.
  #[arg(long = "as", env = "PENPAL_USER", value_name = "USER_ID")]
  acting_as: Option<Uuid>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create a profile and print it.
  Register {
    #[arg(long)]
    name:          String,
    /// The language you write in.
    #[arg(long)]
    language:      String,
    #[arg(long)]
    gender:        Option<String>,
    /// URL of a profile photo.
    #[arg(long)]
    photo:         Option<String>,
    #[arg(long)]
    country:       Option<String>,
    /// Repeat for several interests.
    #[arg(long = "interest")]
    interests:     Vec<String>,
    /// Let pen pals see gender and photo as you exchange letters.
    #[arg(long)]
    allow_details: bool,
  },
  /// Find pen pals by language and interest.
  Search {
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    interest: Option<String>,
  },
  /// Show another user's profile as you see it.
  Profile { user_id: Uuid },
  /// Send a letter.
  Send { to: Uuid, content: String },
  /// Letters you have received, newest first.
  Inbox,
  /// Letters you have sent, newest first.
  Outbox,
  /// Show a letter; marks it read if it was sent to you.
  Read { letter_id: Uuid },
  /// Comment on a letter you sent or received.
  Comment {
    letter_id: Uuid,
    content:   String,
    /// correction, suggestion or comment.
    #[arg(long, default_value = "comment")]
    kind:      CommentKind,
  },
  /// Attach a translation to a letter.
  Translate {
    letter_id: Uuid,
    /// ISO 639-1 code: en, ja, ko, zh, es, fr, de.
    language:  String,
    text:      String,
  },
  /// Rate a letter you received (1-5, default 3).
  Evaluate {
    letter_id:   Uuid,
    #[arg(long)]
    intimacy:    Option<u8>,
    #[arg(long)]
    naturalness: Option<u8>,
    #[arg(long)]
    grammar:     Option<u8>,
    #[arg(long, default_value = "")]
    corrections: String,
    #[arg(long, default_value = "")]
    comments:    String,
  },
  /// Evaluations of your letters, or with --given, the ones you wrote.
  Evaluations {
    #[arg(long)]
    given: bool,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  url:  Option<String>,
  user: Option<Uuid>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or(file_cfg.url)
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
  };
  let acting_as = args.acting_as.or(file_cfg.user);

  let client = ApiClient::new(api_config)?;
  let mut app = App::new(client, acting_as);

  let output = run(&mut app, args.command).await?;
  print!("{output}");
  for notification in app.notifications() {
    println!("{}", render::notification(notification));
  }

  Ok(())
}

async fn run(app: &mut App, command: Command) -> Result<String> {
  match command {
    Command::Register {
      name,
      language,
      gender,
      photo,
      country,
      interests,
      allow_details,
    } => {
      app
        .register(NewUser {
          name,
          gender,
          photo,
          language,
          country,
          interests,
          allow_details,
        })
        .await
    }
    Command::Search { language, interest } => {
      app.search(language.as_deref(), interest.as_deref()).await
    }
    Command::Profile { user_id } => app.profile(user_id).await,
    Command::Send { to, content } => app.send(to, content).await,
    Command::Inbox => app.inbox().await,
    Command::Outbox => app.outbox().await,
    Command::Read { letter_id } => app.read(letter_id).await,
    Command::Comment {
      letter_id,
      content,
      kind,
    } => app.comment(letter_id, content, kind).await,
    Command::Translate {
      letter_id,
      language,
      text,
    } => app.translate(letter_id, &text, &language).await,
    Command::Evaluate {
      letter_id,
      intimacy,
      naturalness,
      grammar,
      corrections,
      comments,
    } => {
      let ratings = Ratings {
        intimacy,
        naturalness,
        grammar,
      };
      app.evaluate(letter_id, ratings, corrections, comments).await
    }
    Command::Evaluations { given } => app.evaluations(given).await,
  }
}
