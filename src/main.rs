use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hlar::config::{self, Config};
use hlar::utils::{ensure_database_directory, parse_tags};
use hlar::{
    EnrichedNote, Favorites, GlobalNote, GlobalNoteView, GlobalNotes, HttpNoteSource,
    HttpNoteSourceBuilder, KeyValueStore, NoteId, NoteInput, NoteService, SqliteStore, Tag, TagId,
    filter,
};
use log::{debug, warn};
use thiserror::Error;

/// hlar - personal notes with tags, plus a shared global collection
#[derive(Parser)]
#[command(name = "hlar")]
#[command(about = "Take tagged notes, browse global notes and keep favorites")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Create a new note
    New(NewCommand),

    /// List notes, optionally filtered by title and tags
    List(FilterArgs),

    /// Show one note
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Change a note's title, body or tags
    Edit(EditCommand),

    /// Delete a note
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Manage the tag registry
    #[command(subcommand)]
    Tags(TagsCommand),

    /// Browse notes from the global notes service
    #[command(subcommand)]
    Global(GlobalCommand),

    /// Manage locally saved favorites
    #[command(subcommand)]
    Favorites(FavoritesCommand),
}

#[derive(Args)]
struct NewCommand {
    /// Title of the note
    #[arg(value_name = "TITLE")]
    title: String,

    /// Markdown body
    #[arg(short, long, value_name = "TEXT", default_value = "")]
    markdown: String,

    /// Comma-separated tag labels; unknown labels are registered
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

#[derive(Args)]
struct EditCommand {
    #[arg(value_name = "ID")]
    id: String,

    /// New title
    #[arg(long)]
    title: Option<String>,

    /// New markdown body
    #[arg(short, long, value_name = "TEXT")]
    markdown: Option<String>,

    /// Comma-separated tag labels replacing the current set ("" clears)
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Case-insensitive title substring
    #[arg(long, value_name = "QUERY", default_value = "")]
    title: String,

    /// Comma-separated tag labels; a note must carry all of them
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

impl FilterArgs {
    fn labels(&self) -> Vec<String> {
        self.tags.as_deref().map(parse_tags).unwrap_or_default()
    }
}

#[derive(Subcommand)]
enum TagsCommand {
    /// List registered tags
    List,

    /// Rename a tag
    Rename {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(value_name = "LABEL")]
        label: String,
    },

    /// Delete a tag; notes keep their other tags
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand)]
enum GlobalCommand {
    /// Fetch and list global notes
    List(FilterArgs),

    /// Fetch and show one global note
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand)]
enum FavoritesCommand {
    /// List saved favorites
    List(FilterArgs),

    /// Fetch a global note and save it as a favorite
    Add {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Remove a favorite
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// Errors caused by what the user typed rather than by the system.
#[derive(Debug, Error)]
enum UserError {
    #[error("'{0}' is not a valid id")]
    InvalidId(String),

    #[error("No note with id {0}")]
    NoteNotFound(NoteId),

    #[error("No tag with id {0}")]
    TagNotFound(TagId),

    #[error("No favorite with id {0}")]
    FavoriteNotFound(String),
}

fn main() {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// User errors exit with 1; storage, network and I/O failures with 2.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<UserError>().is_some()
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_env()?;
    debug!("using database {}", config.db_path.display());
    ensure_database_directory(&config.db_path)?;
    let store = SqliteStore::open(&config.db_path).context("Failed to open database")?;

    let mut out = io::stdout().lock();
    match &cli.command {
        Commands::New(cmd) => {
            let mut service = NoteService::open(&store)?;
            execute_new(&mut service, cmd, &mut out)
        }
        Commands::List(args) => {
            let service = NoteService::open(&store)?;
            execute_list(&service, args, &mut out)
        }
        Commands::Show { id } => {
            let service = NoteService::open(&store)?;
            execute_show(&service, id, &mut out)
        }
        Commands::Edit(cmd) => {
            let mut service = NoteService::open(&store)?;
            execute_edit(&mut service, cmd, &mut out)
        }
        Commands::Delete { id } => {
            let mut service = NoteService::open(&store)?;
            execute_delete(&mut service, id, &mut out)
        }
        Commands::Tags(cmd) => {
            let mut service = NoteService::open(&store)?;
            execute_tags(&mut service, cmd, &mut out)
        }
        Commands::Global(cmd) => {
            let source = remote_source(&config)?;
            execute_global(&source, &Favorites::new(&store), cmd, &mut out)
        }
        Commands::Favorites(cmd) => {
            let favorites = Favorites::new(&store);
            match cmd {
                FavoritesCommand::Add { id } => {
                    let source = remote_source(&config)?;
                    execute_favorite_add(&source, &favorites, id, &mut out)
                }
                FavoritesCommand::List(args) => execute_favorites_list(&favorites, args, &mut out),
                FavoritesCommand::Remove { id } => {
                    execute_favorite_remove(&favorites, id, &mut out)
                }
            }
        }
    }
}

fn remote_source(config: &Config) -> Result<HttpNoteSource> {
    HttpNoteSourceBuilder::new()
        .base_url(config.remote_url.as_str())
        .timeout(config.remote_timeout)
        .build()
        .context("Failed to create global notes client")
}

fn parse_note_id(raw: &str) -> Result<NoteId> {
    raw.parse::<NoteId>()
        .map_err(|_| UserError::InvalidId(raw.to_string()).into())
}

fn parse_tag_id(raw: &str) -> Result<TagId> {
    raw.parse::<TagId>()
        .map_err(|_| UserError::InvalidId(raw.to_string()).into())
}

fn execute_new<S: KeyValueStore>(
    service: &mut NoteService<S>,
    cmd: &NewCommand,
    out: &mut impl Write,
) -> Result<()> {
    let labels = cmd.tags.as_deref().map(parse_tags).unwrap_or_default();
    let tags = service.resolve_tags(&labels)?;
    let id = service
        .create_note(
            NoteInput::new(cmd.title.as_str())
                .markdown(cmd.markdown.as_str())
                .tags(tags),
        )
        .context("Failed to create note")?;

    write!(out, "Note created (id: {id})")?;
    if !labels.is_empty() {
        write!(out, " with tags: {}", labels.join(", "))?;
    }
    writeln!(out)?;
    Ok(())
}

fn execute_list<S: KeyValueStore>(
    service: &NoteService<S>,
    args: &FilterArgs,
    out: &mut impl Write,
) -> Result<()> {
    let (selected, unknown) = service.select_tags(&args.labels());
    let notes = if unknown.is_empty() {
        service.search_labels(&args.title, &selected)
    } else {
        warn!("no tag labelled {}", unknown.join(", "));
        Vec::new()
    };

    if notes.is_empty() {
        writeln!(out, "No notes found")?;
        return Ok(());
    }
    for note in notes {
        write_note_line(out, note)?;
    }
    Ok(())
}

fn write_note_line(out: &mut impl Write, note: &EnrichedNote) -> io::Result<()> {
    write!(out, "{}  {}", note.id, note.title)?;
    if !note.tags.is_empty() {
        write!(out, "  [{}]", note.tag_labels().join(", "))?;
    }
    writeln!(out)
}

fn find_note<'a, S: KeyValueStore>(
    service: &'a NoteService<S>,
    raw_id: &str,
) -> Result<&'a EnrichedNote> {
    let id = parse_note_id(raw_id)?;
    service
        .note(id)
        .ok_or_else(|| UserError::NoteNotFound(id).into())
}

fn execute_show<S: KeyValueStore>(
    service: &NoteService<S>,
    raw_id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let note = find_note(service, raw_id)?;
    writeln!(out, "ID: {}", note.id)?;
    writeln!(out, "Title: {}", note.title)?;
    writeln!(out, "Tags: {}", note.tag_labels().join(", "))?;
    if !note.markdown.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", note.markdown)?;
    }
    Ok(())
}

/// Builds the replacement for `current`, keeping every field not supplied.
fn merge_edit(
    current: &EnrichedNote,
    title: Option<&str>,
    markdown: Option<&str>,
    tags: Option<Vec<Tag>>,
) -> NoteInput {
    NoteInput::new(title.unwrap_or(&current.title))
        .markdown(markdown.unwrap_or(&current.markdown))
        .tags(tags.unwrap_or_else(|| current.tags.clone()))
}

fn execute_edit<S: KeyValueStore>(
    service: &mut NoteService<S>,
    cmd: &EditCommand,
    out: &mut impl Write,
) -> Result<()> {
    let current = find_note(service, &cmd.id)?.clone();
    let tags = match cmd.tags.as_deref() {
        Some(raw) => Some(service.resolve_tags(&parse_tags(raw))?),
        None => None,
    };

    let input = merge_edit(&current, cmd.title.as_deref(), cmd.markdown.as_deref(), tags);
    service
        .update_note(current.id, input)
        .context("Failed to update note")?;

    writeln!(out, "Note updated (id: {})", current.id)?;
    Ok(())
}

fn execute_delete<S: KeyValueStore>(
    service: &mut NoteService<S>,
    raw_id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let id = find_note(service, raw_id)?.id;
    service.delete_note(id).context("Failed to delete note")?;
    writeln!(out, "Note deleted (id: {id})")?;
    Ok(())
}

fn execute_tags<S: KeyValueStore>(
    service: &mut NoteService<S>,
    cmd: &TagsCommand,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        TagsCommand::List => {
            if service.tags().is_empty() {
                writeln!(out, "No tags")?;
            }
            for tag in service.tags() {
                writeln!(out, "{}  {}", tag.id, tag.label)?;
            }
        }
        TagsCommand::Rename { id, label } => {
            let id = parse_tag_id(id)?;
            if service.registry().get(id).is_none() {
                return Err(UserError::TagNotFound(id).into());
            }
            service
                .update_tag(id, label.as_str())
                .context("Failed to rename tag")?;
            writeln!(out, "Tag renamed to {label}")?;
        }
        TagsCommand::Delete { id } => {
            let id = parse_tag_id(id)?;
            if service.registry().get(id).is_none() {
                return Err(UserError::TagNotFound(id).into());
            }
            service.delete_tag(id).context("Failed to delete tag")?;
            writeln!(out, "Tag deleted (id: {id})")?;
        }
    }
    Ok(())
}

fn write_global_line(out: &mut impl Write, note: &GlobalNote, favorite: bool) -> io::Result<()> {
    let marker = if favorite { "*" } else { " " };
    write!(out, "{marker} {}  {}", note.id, note.title)?;
    if !note.tags.is_empty() {
        write!(out, "  [{}]", note.tags.join(", "))?;
    }
    writeln!(out)
}

fn write_global_note(out: &mut impl Write, view: &GlobalNoteView) -> io::Result<()> {
    writeln!(out, "ID: {}", view.note.id)?;
    writeln!(out, "Title: {}", view.note.title)?;
    writeln!(out, "Tags: {}", view.note.tags.join(", "))?;
    writeln!(out, "Favorite: {}", if view.is_favorite { "yes" } else { "no" })?;
    if !view.note.markdown.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", view.note.markdown)?;
    }
    Ok(())
}

fn execute_global<R, S>(
    source: &R,
    favorites: &Favorites<S>,
    cmd: &GlobalCommand,
    out: &mut impl Write,
) -> Result<()>
where
    R: hlar::RemoteNoteSource,
    S: KeyValueStore,
{
    match cmd {
        GlobalCommand::List(args) => {
            let mut global = GlobalNotes::new();
            if let Some(message) = global.refresh(source).error() {
                anyhow::bail!("Failed to fetch global notes: {message}");
            }

            let hits = global.filtered(&args.title, &args.labels());
            if hits.is_empty() {
                writeln!(out, "No global notes found")?;
                return Ok(());
            }
            let saved = favorites.list()?;
            for note in hits {
                let favorite = saved.iter().any(|f| f.id == note.id);
                write_global_line(out, note, favorite)?;
            }
        }
        GlobalCommand::Show { id } => {
            let view = GlobalNoteView::load(source, favorites, id)
                .with_context(|| format!("Failed to fetch global note {id}"))?;
            write_global_note(out, &view)?;
        }
    }
    Ok(())
}

fn execute_favorites_list<S: KeyValueStore>(
    favorites: &Favorites<S>,
    args: &FilterArgs,
    out: &mut impl Write,
) -> Result<()> {
    let saved = favorites.list().context("Failed to read favorites")?;
    let hits = filter(&saved, &args.title, &args.labels());
    if hits.is_empty() {
        writeln!(out, "No favorites found")?;
        return Ok(());
    }
    for note in hits {
        write_global_line(out, note, true)?;
    }
    Ok(())
}

fn execute_favorite_add<R, S>(
    source: &R,
    favorites: &Favorites<S>,
    id: &str,
    out: &mut impl Write,
) -> Result<()>
where
    R: hlar::RemoteNoteSource,
    S: KeyValueStore,
{
    let mut view = GlobalNoteView::load(source, favorites, id)
        .with_context(|| format!("Failed to fetch global note {id}"))?;
    if view.is_favorite {
        writeln!(out, "Already a favorite: {}", view.note.title)?;
        return Ok(());
    }
    view.toggle_favorite(favorites)
        .context("Failed to save favorite")?;
    writeln!(out, "Added to favorites: {}", view.note.title)?;
    Ok(())
}

fn execute_favorite_remove<S: KeyValueStore>(
    favorites: &Favorites<S>,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    if !favorites.remove(id).context("Failed to remove favorite")? {
        return Err(UserError::FavoriteNotFound(id.to_string()).into());
    }
    writeln!(out, "Removed from favorites (id: {id})")?;
    Ok(())
}
