use std::fmt;
use std::sync::Arc;

use services::{CategoryPicker, CategoryService, CommitReport};
use storage::http::{API_TOKEN_VAR, API_URL_VAR};
use storage::{ApiConfig, Storage};
use study_core::model::CategoryId;
use study_core::tree::CategoryForest;

mod drafts;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCategoryId { raw: String },
    MissingIds,
    MissingFile,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCategoryId { raw } => write!(f, "invalid category id: {raw}"),
            ArgsError::MissingIds => write!(f, "select needs at least one category id"),
            ArgsError::MissingFile => write!(f, "import needs a drafts file"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- tree   [--api <url>] [--token <t>]");
    eprintln!("  cargo run -p app -- select [--api <url>] [--token <t>] <id>...");
    eprintln!("  cargo run -p app -- import [--api <url>] [--token <t>] [--parent <id>] <drafts.json>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {API_URL_VAR}, {API_TOKEN_VAR}, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Tree,
    Select,
    Import,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "tree" => Some(Self::Tree),
            "select" => Some(Self::Select),
            "import" => Some(Self::Import),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    api: Option<String>,
    token: Option<String>,
    parent: Option<CategoryId>,
    positional: Vec<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => parsed.api = Some(require_value(args, "--api")?),
                "--token" => parsed.token = Some(require_value(args, "--token")?),
                "--parent" => {
                    let value = require_value(args, "--parent")?;
                    let id = value
                        .parse::<CategoryId>()
                        .map_err(|_| ArgsError::InvalidCategoryId { raw: value.clone() })?;
                    parsed.parent = Some(id);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if other.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => parsed.positional.push(arg),
            }
        }
        Ok(parsed)
    }

    /// Flags win over the environment.
    fn api_config(&self) -> Result<ApiConfig, storage::StorageError> {
        let config = match &self.api {
            Some(url) => {
                let config = ApiConfig::new(url)?;
                match std::env::var(API_TOKEN_VAR) {
                    Ok(token) => config.with_token(token),
                    Err(_) => config,
                }
            }
            None => ApiConfig::from_env()?,
        };
        Ok(match &self.token {
            Some(token) => config.with_token(token.as_str()),
            None => config,
        })
    }
}

fn print_forest(forest: &CategoryForest) {
    if forest.is_empty() {
        println!("(no categories)");
        return;
    }
    for (depth, node) in forest.walk() {
        println!(
            "{}- {} [{}] ({})",
            "  ".repeat(depth),
            node.name(),
            node.kind(),
            node.id()
        );
    }
}

fn print_report(report: &CommitReport) {
    println!(
        "created {}, failed {}, skipped {}",
        report.success_count, report.error_count, report.skipped_count
    );
    for created in &report.created {
        match &created.parent {
            Some(parent) => println!("  + {} under {parent}", created.id),
            None => println!("  + {}", created.id),
        }
    }
    for failure in &report.failures {
        println!("  ! {}: {}", failure.name, failure.reason);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::http(parsed.api_config()?);
    let service = CategoryService::new(Arc::clone(&storage.categories));

    match cmd {
        Command::Tree => {
            let forest = service.load_forest().await?;
            print_forest(&forest);
            Ok(())
        }
        Command::Select => {
            if parsed.positional.is_empty() {
                return Err(ArgsError::MissingIds.into());
            }
            let mut picker = CategoryPicker::new(Arc::clone(&storage.categories));
            picker.reload().await?;
            for id in drafts::parse_ids(&parsed.positional)? {
                picker.toggle(&id);
            }
            for label in picker.selection().labelled_paths(picker.forest()) {
                println!("{label}");
            }
            println!("category: {}", picker.category_field());
            Ok(())
        }
        Command::Import => {
            let path = parsed.positional.first().ok_or(ArgsError::MissingFile)?;
            let raw = std::fs::read_to_string(path)?;
            let entries: Vec<drafts::DraftEntry> = serde_json::from_str(&raw)?;
            let tree = drafts::build_tree(&entries, parsed.parent.as_ref())?;
            tracing::info!(drafts = tree.count(), file = %path, "importing categories");

            let report = service.commit_pending(&tree).await;
            print_report(&report);
            if report.error_count > 0 {
                return Err(format!("{} categories failed", report.error_count).into());
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
