//! fihris CLI: table-of-contents detection and chapter splitting for Arabic books.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::de::DeserializeOwned;

use fihris::config::{FihrisConfig, ProviderKind};
use fihris::content::{PageContent, split};
use fihris::error::{FihrisResult, InputError};
use fihris::pipeline::{detector_from_config, process_document};
use fihris::toc::model::flatten_views;
use fihris::toc::{DocumentInput, EmbeddedTocItem, TocItemView};

#[derive(Parser)]
#[command(name = "fihris", version, about = "Detect the table of contents of Arabic books and split them into chapters")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/fihris/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured completion provider.
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the table of contents and print it as JSON.
    Detect {
        /// Extracted plain text of the book.
        #[arg(long)]
        text: PathBuf,

        /// Page records as JSON: [{"page_number": 1, "text": "..."}].
        #[arg(long)]
        pages: Option<PathBuf>,

        /// Embedded outline as JSON: [{"level": 1, "title": "...", "page_number": 3}].
        #[arg(long)]
        embedded: Option<PathBuf>,
    },

    /// Split pages into chapters along a given TOC.
    Split {
        /// Page records as JSON.
        #[arg(long)]
        pages: PathBuf,

        /// TOC as JSON, either flat entries or nested items with `children`.
        #[arg(long)]
        toc: PathBuf,
    },

    /// Detect the TOC and split the content in one pass.
    Process {
        /// Extracted plain text of the book.
        #[arg(long)]
        text: PathBuf,

        /// Page records as JSON; without it the text is paginated by line count.
        #[arg(long)]
        pages: Option<PathBuf>,

        /// Embedded outline as JSON.
        #[arg(long)]
        embedded: Option<PathBuf>,

        /// Lines per page when paginating plain text.
        #[arg(long, default_value = "50")]
        lines_per_page: usize,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = FihrisConfig::load_or_default(cli.config.as_deref())?;
    if let Some(kind) = cli.provider {
        config.provider.kind = kind;
    }

    match cli.command {
        Commands::Detect {
            text,
            pages,
            embedded,
        } => {
            let text = read_text(&text)?;
            let pages: Vec<PageContent> = read_optional_json(pages.as_deref())?.unwrap_or_default();
            let embedded: Option<Vec<EmbeddedTocItem>> = read_optional_json(embedded.as_deref())?;

            let mut input = DocumentInput::new(&text).with_pages(&pages);
            if let Some(items) = &embedded {
                input = input.with_embedded_toc(items);
            }

            let result = detector_from_config(&config).detect(&input);
            print_json(&result)?;
        }

        Commands::Split { pages, toc } => {
            let pages: Vec<PageContent> = read_json(&pages)?;
            let views: Vec<TocItemView> = read_json(&toc)?;
            let chapters = split(&pages, &flatten_views(&views));
            print_json(&chapters)?;
        }

        Commands::Process {
            text,
            pages,
            embedded,
            lines_per_page,
        } => {
            let text = read_text(&text)?;
            let pages: Vec<PageContent> = match read_optional_json(pages.as_deref())? {
                Some(pages) => pages,
                None => PageContent::paginate(&text, lines_per_page),
            };
            let embedded: Option<Vec<EmbeddedTocItem>> = read_optional_json(embedded.as_deref())?;

            let mut input = DocumentInput::new(&text).with_pages(&pages);
            if let Some(items) = &embedded {
                input = input.with_embedded_toc(items);
            }

            let detector = detector_from_config(&config);
            let book = process_document(&detector, &input, &config.content);
            print_json(&book)?;
        }
    }

    Ok(())
}

fn read_text(path: &Path) -> FihrisResult<String> {
    let text = std::fs::read_to_string(path).map_err(|e| InputError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(text)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> FihrisResult<T> {
    let content = read_text(path)?;
    let value = serde_json::from_str(&content).map_err(|e| InputError::Json {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(value)
}

fn read_optional_json<T: DeserializeOwned>(path: Option<&Path>) -> FihrisResult<Option<T>> {
    path.map(|p| read_json::<T>(p)).transpose()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
