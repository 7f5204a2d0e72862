//! Storyteller CLI: write toward a word-count goal and browse past stories.
//!
//! Commands: save, list, open, count, write, titles, completions

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, CommandFactory, Parser};
use serde::Serialize;
use tokio::io::AsyncBufReadExt;

use story_catalog::{Catalog, OutputFormat, SortOrder, CATALOG_HEADER, COLUMN_DATE};
use story_core::config::StoryConfig;
use story_core::debounce::{ChangeDebouncer, DebounceHandle};
use story_core::document::Document;
use story_core::editor::WordCountTracker;
use story_core::goal::{count_label, GoalStatus};
use story_core::wordcount::count_words;
use story_store::{DocumentStore, StoreWatcher, TitleList};

const IDLE_POLL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "storyteller")]
#[command(version)]
#[command(about = "Write toward a word-count goal and browse past stories")]
struct Cli {
    /// Config file (defaults to <config dir>/storyteller/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Story directory, overriding the config
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// More log output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Save a story from a file or stdin
    Save {
        #[arg(long)]
        title: String,
        /// Creation date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Read the body from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List stored stories
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        browse: BrowseArgs,
        #[arg(long, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Keep running and re-list whenever the store changes
        #[arg(long)]
        watch: bool,
    },
    /// Print a stored story
    Open {
        #[command(flatten)]
        browse: BrowseArgs,
        /// Which visible row to open, counting from 0
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Print only the body, byte for byte
        #[arg(long)]
        raw: bool,
    },
    /// Count the words in a file or stdin against the goal
    Count {
        file: Option<PathBuf>,
        #[arg(long)]
        goal: Option<usize>,
    },
    /// Type a story on stdin with a live word count, saving it at EOF
    Write {
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        goal: Option<usize>,
    },
    /// List known titles, or add one
    Titles {
        #[command(subcommand)]
        action: Option<TitlesAction>,
    },
    /// Generate shell completions
    Completions { shell: clap_complete::Shell },
}

#[derive(clap::Subcommand)]
enum TitlesAction {
    /// Add a title to the list
    Add { title: String },
}

#[derive(clap::Args)]
struct BrowseArgs {
    /// Only show rows where some column contains this text
    #[arg(long, short)]
    search: Option<String>,
    /// Match the search text case-sensitively
    #[arg(long, overrides_with = "no_case_sensitive")]
    case_sensitive: bool,
    /// Ignore case even if the config asks for case-sensitive search
    #[arg(long, overrides_with = "case_sensitive")]
    no_case_sensitive: bool,
    /// Column to sort by: title, date, or wordcount (default: date, newest first)
    #[arg(long)]
    sort: Option<String>,
    /// asc or desc (default: ascending for --sort)
    #[arg(long)]
    order: Option<SortOrder>,
}

impl BrowseArgs {
    /// The command line wins over the config; the last flag given wins.
    fn case_sensitivity(&self, configured: bool) -> bool {
        if self.case_sensitive {
            true
        } else if self.no_case_sensitive {
            false
        } else {
            configured
        }
    }
}

#[derive(Serialize)]
struct SavedStory<'a> {
    filename: &'a str,
    title: &'a str,
    date: NaiveDate,
    word_count: usize,
    goal: usize,
    status: &'static str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = StoryConfig::discover(cli.config.as_deref()).context("loading config")?;
    let store = DocumentStore::new(cli.dir.clone().unwrap_or_else(|| config.store.dir.clone()));
    tracing::debug!(root = %store.root().display(), "using story directory");

    match cli.command {
        Commands::Save { title, date, file } => {
            let body = read_input(file.as_deref())?;
            let doc = Document::new(&title, date.unwrap_or_else(today), body)?;
            save(&store, &doc, config.editor.goal)
        }
        Commands::List {
            browse,
            format,
            watch,
        } => {
            let search_case = browse.case_sensitivity(config.search.case_sensitive);
            let catalog = browse_catalog(&store, &browse, search_case)?;
            print_listing(&catalog, format);
            if watch {
                watch_store(&store, &browse, search_case, format, config.search.debounce())?;
            }
            Ok(())
        }
        Commands::Open {
            browse,
            index,
            raw,
        } => {
            let search_case = browse.case_sensitivity(config.search.case_sensitive);
            let mut catalog = browse_catalog(&store, &browse, search_case)?;
            let visible = catalog.visible_entries().count();
            if !catalog.table_mut().select_visible(index) {
                bail!("no story at index {index} ({visible} visible)");
            }
            let opened = catalog.open_selected(&store)?;
            if raw {
                print!("{}", opened.body);
            } else {
                println!("Title: {}", opened.title());
                println!("Catalog title: {}", opened.key.title);
                println!("Date: {}", opened.key.date);
                println!("Words: {}", count_words(&opened.body));
                println!();
                println!("{}", opened.body);
            }
            Ok(())
        }
        Commands::Count { file, goal } => {
            let text = read_input(file.as_deref())?;
            let goal = goal.unwrap_or(config.editor.goal);
            let count = count_words(&text);
            println!("{} ({})", count_label(count, goal), GoalStatus::compare(count, goal));
            Ok(())
        }
        Commands::Write { title, date, goal } => {
            let goal = goal.unwrap_or(config.editor.goal);
            let created = date.unwrap_or_else(today);
            // fail on a bad title before any typing happens
            Document::new(&title, created, "")?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("starting runtime")?;
            let body = runtime.block_on(write_interactive(goal, config.editor.debounce()))?;
            let doc = Document::new(&title, created, body)?;
            save(&store, &doc, goal)
        }
        Commands::Titles { action } => {
            let titles = TitleList::for_store(&store);
            match action {
                Some(TitlesAction::Add { title }) => {
                    if !titles.add(&title)? {
                        tracing::info!(title, "title already listed");
                    }
                }
                None => {
                    for title in titles.load()? {
                        println!("{title}");
                    }
                }
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "storyteller", &mut io::stdout());
            Ok(())
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn save(store: &DocumentStore, doc: &Document, goal: usize) -> Result<()> {
    let filename = store.save(doc)?;
    TitleList::for_store(store).add(&doc.title)?;

    let word_count = doc.word_count();
    let saved = SavedStory {
        filename: &filename,
        title: &doc.title,
        date: doc.created,
        word_count,
        goal,
        status: GoalStatus::compare(word_count, goal).as_str(),
    };
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}

fn browse_catalog(store: &DocumentStore, browse: &BrowseArgs, case_sensitive: bool) -> Result<Catalog> {
    let mut catalog = Catalog::load(store)?;
    match &browse.sort {
        Some(column) => {
            catalog.sort(resolve_column(column)?, browse.order)?;
        }
        None => {
            catalog.sort(COLUMN_DATE, Some(browse.order.unwrap_or(SortOrder::Descending)))?;
        }
    }
    if let Some(query) = &browse.search {
        catalog.search(query, case_sensitive);
    }
    Ok(catalog)
}

fn resolve_column(name: &str) -> Result<&'static str> {
    CATALOG_HEADER
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(name))
        .with_context(|| format!("unknown column '{name}' (expected one of {CATALOG_HEADER:?})"))
}

fn print_listing(catalog: &Catalog, format: OutputFormat) {
    let output = catalog.render(format);
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}

/// Re-list the catalog after each quiet burst of store changes.
fn watch_store(
    store: &DocumentStore,
    browse: &BrowseArgs,
    case_sensitive: bool,
    format: OutputFormat,
    interval: Duration,
) -> Result<()> {
    let watcher = StoreWatcher::start(store.root())?;
    let mut debouncer = ChangeDebouncer::new(interval);
    tracing::info!(root = %store.root().display(), "watching for changes");

    loop {
        let timeout = debouncer
            .deadline()
            .map_or(IDLE_POLL, |d| d.saturating_duration_since(Instant::now()));
        if let Some(event) = watcher.recv_timeout(timeout) {
            tracing::debug!(?event, "store changed");
            debouncer.notify(Instant::now());
        }
        if debouncer.poll(Instant::now()) {
            let catalog = browse_catalog(store, browse, case_sensitive)?;
            println!();
            print_listing(&catalog, format);
        }
    }
}

/// Read stdin line by line, reporting the word count whenever it settles.
async fn write_interactive(goal: usize, interval: Duration) -> Result<String> {
    let state = Arc::new(Mutex::new((String::new(), WordCountTracker::new())));

    let shared = Arc::clone(&state);
    let debounce = DebounceHandle::spawn(interval, move || {
        let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
        let (text, tracker) = &mut *guard;
        if let Some(count) = tracker.recount(text) {
            eprintln!("{} ({})", count_label(count, goal), GoalStatus::compare(count, goal));
        }
    });

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        {
            let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
            guard.0.push_str(&line);
            guard.0.push('\n');
        }
        debounce.notify();
    }
    debounce.shutdown();

    let text = state.lock().unwrap_or_else(PoisonError::into_inner).0.clone();
    Ok(text)
}
