//! Notedown entrypoint: note management and styling inspection from the
//! command line. The editing surface proper is a UI adapter concern; this
//! binary drives the same core crates it would.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use core_edit::Selection;
use core_session::Session;
use core_store::{LocalStore, NoteDraft, NoteId, NoteStore};
use core_style::SpanStyle;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "notedown", version, about = "Markdown notes with in-place styling")]
struct Args {
    /// Configuration file path (overrides discovery of `notedown.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all notes, most recently updated first.
    List,
    /// Search notes by title, content or tag.
    Search { query: String },
    /// Create a note.
    New {
        title: String,
        /// Initial content; defaults to empty (or a date header when enabled).
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Print one note as Markdown.
    Show { id: String },
    /// Append text to a note through an editing session.
    Append { id: String, text: String },
    /// Delete a note.
    Delete { id: String },
    /// Write one note to a Markdown file.
    Export {
        id: String,
        /// Output path; defaults to `<id>.md`.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Write every note into a JSON archive.
    Archive { out: PathBuf },
    /// Import notes: a JSON archive merges by identifier, a Markdown file
    /// becomes a new note titled after its file stem.
    Import { path: PathBuf },
    /// Dump the styled-span rendering of a note, one line per span.
    Render { id: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = core_config::load_from(args.config)?;
    let store = LocalStore::open(config.store_path())
        .with_context(|| format!("opening store at {}", config.store_path().display()))?;

    run(args.command, store, &config)
}

fn run(command: Command, mut store: LocalStore, config: &core_config::Config) -> Result<()> {
    match command {
        Command::List => {
            for note in store.all_notes()? {
                println!(
                    "{}  {}  {}\n    {}",
                    note.id,
                    note.updated_at.format("%Y-%m-%d %H:%M"),
                    note.title,
                    note.preview
                );
            }
        }
        Command::Search { query } => {
            for note in store.search_notes(&query)? {
                println!("{}  {}", note.id, note.title);
            }
        }
        Command::New { title, content } => {
            let content = content.unwrap_or_else(|| {
                if config.date_header() {
                    format!("# {}\n\n", Utc::now().format("%Y-%m-%d"))
                } else {
                    String::new()
                }
            });
            let tags = core_store::extract_tags(&content);
            let note = store.create_note(NoteDraft {
                title,
                content,
                tags,
            })?;
            info!(target: "cli", id = %note.id, "note created");
            println!("{}", note.id);
        }
        Command::Show { id } => {
            let note = store.get_note(&NoteId::from(id.as_str()))?;
            print!("{}", core_store::to_markdown(&note));
            println!();
        }
        Command::Append { id, text } => {
            let id = NoteId::from(id.as_str());
            let mut session = Session::open(store, &id, config.autosave_delay())?;
            let end = session.text().len();
            session.set_selection(Selection::caret(end));
            let lead_in = if session.text().is_empty() { "" } else { "\n" };
            session.insert(&format!("{lead_in}{text}"), std::time::Instant::now());
            session.close()?;
        }
        Command::Delete { id } => {
            store.delete_note(&NoteId::from(id.as_str()))?;
        }
        Command::Export { id, out } => {
            let note = store.get_note(&NoteId::from(id.as_str()))?;
            let path = out.unwrap_or_else(|| PathBuf::from(format!("{}.md", note.id)));
            fs::write(&path, core_store::to_markdown(&note))
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{}", path.display());
        }
        Command::Archive { out } => {
            let notes = store.all_notes()?;
            fs::write(&out, core_store::export_archive(&notes)?)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("{} notes archived", notes.len());
        }
        Command::Import { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            if path.extension().is_some_and(|e| e == "md") {
                let title = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let tags = core_store::extract_tags(&raw);
                let note = store.create_note(NoteDraft {
                    title,
                    content: raw,
                    tags,
                })?;
                println!("{}", note.id);
            } else {
                let added = store.adopt(core_store::import_archive(&raw)?)?;
                println!("{added} notes imported");
            }
        }
        Command::Render { id } => {
            let note = store.get_note(&NoteId::from(id.as_str()))?;
            let styled = core_style::render(&note.content);
            for (line, source) in styled.lines.iter().zip(note.content.split('\n')) {
                println!("{:?}", line.kind);
                for span in &line.spans {
                    println!(
                        "  {:>3}..{:<3} {:<12} {:?}",
                        span.start,
                        span.end,
                        style_name(&span.style),
                        &source[span.start..span.end]
                    );
                }
            }
        }
    }
    Ok(())
}

fn style_name(style: &SpanStyle) -> &'static str {
    match style {
        SpanStyle::Text => "text",
        SpanStyle::Delimiter => "delimiter",
        SpanStyle::Marker => "marker",
        SpanStyle::Bold => "bold",
        SpanStyle::Italic => "italic",
        SpanStyle::Code => "code",
        SpanStyle::Link { .. } => "link",
        SpanStyle::Hashtag { .. } => "hashtag",
    }
}
