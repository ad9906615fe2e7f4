//! readlog - Personal reading log with filtered statistics
//!
//! Serves the record store over HTTP and computes dashboard statistics
//! against either the local store or a running server.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use readlog::{
    api::build_app,
    config::ReadlogConfig,
    dashboard::{
        ContentType, Dashboard, DashboardView, FilterState, HttpRecordSource, RecordSource,
    },
    reads::{
        parse_date, BookType, Demographic, Rating, ReadDraft, ReadId, ReadRecord, ReadStore,
        ReadsState,
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "readlog")]
#[command(version)]
#[command(about = "Personal reading log with year/type filtered statistics")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "READLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where commands find the read collection
#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Base URL of a running `readlog serve`
    #[arg(long, conflicts_with = "data_dir")]
    backend: Option<String>,

    /// Local data directory (overrides the configured one)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the record store HTTP API
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Show statistics for the selected years and content types
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        /// Active year (repeatable; default: all configured years)
        #[arg(long = "year")]
        years: Vec<i32>,

        /// Show a single year only
        #[arg(long, conflicts_with = "years")]
        only_year: Option<i32>,

        /// Active content type, Books or Manga (repeatable; default: both)
        #[arg(long = "type")]
        types: Vec<ContentType>,

        /// Also list the selected reads
        #[arg(long)]
        list: bool,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log a finished read
    Add {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        /// Novel, Novella, Short Story, Memoir, Manga, Graphic Novel or Anthology
        #[arg(long = "type")]
        book_type: BookType,

        #[arg(long)]
        pages: Option<u32>,

        /// Stars in half-star steps, 0 to 5
        #[arg(long)]
        rating: Option<f64>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Finish date (YYYY-MM-DD)
        #[arg(long)]
        finish: String,

        #[arg(long, default_value = "Adult")]
        demographic: Demographic,

        /// Series name; omit for a standalone
        #[arg(long)]
        series: Option<String>,

        #[arg(long)]
        nonfiction: bool,

        #[arg(long)]
        reread: bool,
    },

    /// Delete a read by id
    Delete {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long)]
        id: ReadId,
    },

    /// Look up logged titles
    Search {
        #[command(flatten)]
        source: SourceArgs,

        query: String,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("readlog={},tower_http=debug", log_level).into());
    let json_layer = cli
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!cli.json_logs)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    // Load configuration
    let config = if let Some(config_path) = cli.config {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        ReadlogConfig::from_toml(&content)?
    } else {
        ReadlogConfig::default()
    };

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            run_server(config, host, port, data_dir).await?;
        }
        Commands::Stats {
            source,
            years,
            only_year,
            types,
            list,
            json,
        } => {
            let filter = initial_filter(&config, years, types);
            show_stats(&config, source, filter, only_year, list, json).await?;
        }
        Commands::Add {
            source,
            title,
            author,
            book_type,
            pages,
            rating,
            start,
            finish,
            demographic,
            series,
            nonfiction,
            reread,
        } => {
            let rating = match rating {
                Some(stars) => match Rating::from_stars(stars) {
                    Some(rating) => Some(rating),
                    None => bail!("rating must be 0 to 5 in half-star steps, got {}", stars),
                },
                None => None,
            };
            let draft = ReadDraft {
                title,
                author,
                book_type,
                page_count: pages,
                rating,
                start_date: parse_date(&start),
                finish_date: parse_date(&finish),
                demographic,
                standalone: series.is_none(),
                partofseries: series,
                fiction: !nonfiction,
                reread,
            };
            let backend = Backend::open(&config, source).await?;
            let read = backend.source().create(draft).await?;
            println!("Added read {}: {}", read.id, read.title);
        }
        Commands::Delete { source, id } => {
            let backend = Backend::open(&config, source).await?;
            backend.source().delete(id).await?;
            println!("Deleted read {}", id);
        }
        Commands::Search { source, query } => {
            let backend = Backend::open(&config, source).await?;
            let hits = backend.search_titles(&query).await?;
            if hits.is_empty() {
                println!("No matching titles");
            }
            for read in &hits {
                print_read(read);
            }
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(
    config: ReadlogConfig,
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    tracing::info!("Starting readlog server");

    let data_dir = data_dir.unwrap_or(config.storage.data_dir);
    let store = Arc::new(ReadStore::new(data_dir).await?);
    let state = ReadsState::new(store, config.dashboard.reading_years.clone());
    let app = build_app(state, &config.server.cors_origins);

    let addr = format!(
        "{}:{}",
        host.unwrap_or(config.server.host),
        port.unwrap_or(config.server.port)
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("readlog is listening on http://{}. Press Ctrl+C to stop.", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

/// Either the local store or a remote server
enum Backend {
    Local(Arc<ReadStore>),
    Remote(HttpRecordSource),
}

impl Backend {
    async fn open(config: &ReadlogConfig, args: SourceArgs) -> Result<Self> {
        if let Some(data_dir) = args.data_dir {
            return Ok(Self::Local(Arc::new(ReadStore::new(data_dir).await?)));
        }
        match args.backend.or_else(|| config.dashboard.backend_url.clone()) {
            Some(url) => {
                tracing::debug!("Using remote record store at {}", url);
                Ok(Self::Remote(HttpRecordSource::new(url)?))
            }
            None => {
                let store = ReadStore::new(config.storage.data_dir.clone()).await?;
                Ok(Self::Local(Arc::new(store)))
            }
        }
    }

    fn source(&self) -> Arc<dyn RecordSource> {
        match self {
            Self::Local(store) => store.clone(),
            Self::Remote(client) => Arc::new(client.clone()),
        }
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<ReadRecord>> {
        Ok(match self {
            Self::Local(store) => store.search_titles(query).await,
            Self::Remote(client) => client.search_titles(query).await?,
        })
    }
}

fn initial_filter(config: &ReadlogConfig, years: Vec<i32>, types: Vec<ContentType>) -> FilterState {
    let known = config.dashboard.reading_years.iter().copied();
    if years.is_empty() && types.is_empty() {
        return FilterState::new(known);
    }
    let years = if years.is_empty() {
        config.dashboard.reading_years.clone()
    } else {
        years
    };
    let types = if types.is_empty() {
        ContentType::ALL.to_vec()
    } else {
        types
    };
    FilterState::with_selection(known, years, types)
}

async fn show_stats(
    config: &ReadlogConfig,
    source: SourceArgs,
    filter: FilterState,
    only_year: Option<i32>,
    list: bool,
    json: bool,
) -> Result<()> {
    let backend = Backend::open(config, source).await?;
    let dashboard = Dashboard::new(backend.source(), filter);
    dashboard.refresh().await?;
    if let Some(year) = only_year {
        dashboard.select_only_year(year).await;
    }

    let view = dashboard.view().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }

    if list {
        println!();
        for read in dashboard.reads_table().await {
            print_read(&read);
        }
    }
    Ok(())
}

fn print_view(view: &DashboardView) {
    let years: Vec<String> = view
        .filter
        .active_years()
        .iter()
        .map(|y| y.to_string())
        .collect();
    let types: Vec<&str> = view.filter.active_types().iter().map(|t| t.as_str()).collect();
    let stats = &view.stats;

    println!("Years: {}", years.join(", "));
    println!("Types: {}", types.join(", "));
    println!();
    println!(
        "Reads:            {} ({} completed, {} rereads)",
        view.count, stats.completed, stats.rereads
    );
    println!("Pages read:       {}", stats.total_length);
    println!("Average length:   {:.1}", stats.average_length);
    println!(
        "Longest/shortest: {} / {}",
        stats.max_length.map_or("-".to_string(), |n| n.to_string()),
        stats.min_length.map_or("-".to_string(), |n| n.to_string())
    );
    println!("Average duration: {:.1} days", stats.average_duration_days);

    if !stats.book_types.is_empty() {
        println!();
        println!("By type:");
        for entry in &stats.book_types {
            println!("  {:<14} {}", entry.book_type.as_str(), entry.total_reads);
        }
    }
    if !stats.demographics.is_empty() {
        println!();
        println!("By demographic:");
        for entry in &stats.demographics {
            println!("  {:<14} {}", entry.demographic.as_str(), entry.total_reads);
        }
    }
    if !stats.ratings.is_empty() {
        println!();
        println!("Ratings:");
        for entry in &stats.ratings {
            println!("  {:<14} {}", entry.rating.to_string(), entry.total_reads);
        }
    }
    if !stats.top_authors.is_empty() {
        println!();
        println!("Top authors:");
        for entry in &stats.top_authors {
            println!("  {:<30} {}", entry.author, entry.total_reads);
        }
    }

    println!();
    println!("By month:");
    for entry in &stats.months {
        println!(
            "  {:<4} {:>4} reads {:>7} pages",
            &entry.month.name()[..3],
            entry.total_reads,
            entry.total_pages
        );
    }
}

fn print_read(read: &ReadRecord) {
    let finished = read
        .finish_date
        .map_or("----------".to_string(), |d| d.to_string());
    println!(
        "{:>5}  {}  {} ({}, {})",
        read.id, finished, read.title, read.author, read.book_type
    );
}

fn show_config(config: Option<&ReadlogConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    println!("{}", config.to_toml()?);
    Ok(())
}
