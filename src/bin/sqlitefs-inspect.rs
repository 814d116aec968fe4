//! sqlitefs inspector
//!
//! Drives the filesystem callbacks against one store without mounting it

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sqlitefs::{
    CreateRequest, Database, Dispatcher, FileInfo, Status, StoreBuilder, StoreConfig, Timestamps,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sqlitefs-inspect")]
#[command(about = "Inspect a SQLite-backed filesystem store through its callbacks")]
struct Args {
    /// Database file
    #[arg(short = 'd', long, conflicts_with = "config")]
    db: Option<PathBuf>,

    /// TOML store configuration
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Entry table name
    #[arg(short = 't', long, default_value = "entries", conflicts_with = "config")]
    table: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the entry table if missing
    Init,
    /// Insert a local file as a new row
    Put { path: String, source: PathBuf },
    /// Print the file information of a path
    Stat {
        path: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write file content to stdout
    Cat {
        path: String,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        /// Bytes to read (default: to end of file)
        #[arg(long)]
        length: Option<usize>,
    },
    /// Delete a file (delete, then cleanup with delete-on-close)
    Rm { path: String },
}

impl Command {
    fn writes(&self) -> bool {
        matches!(self, Command::Init | Command::Put { .. } | Command::Rm { .. })
    }
}

fn open_store(args: &Args) -> anyhow::Result<Arc<Database>> {
    let config = match (&args.config, &args.db) {
        (Some(path), _) => StoreConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        (None, Some(db)) => StoreBuilder::new().path(db).table(&args.table).config()?,
        (None, None) => bail!("either --db or --config is required"),
    };

    if args.command.writes() && config.read_only {
        bail!("store is configured read-only");
    }

    Ok(Arc::new(Database::open(&config)?))
}

fn check(status: Status, what: &str) -> anyhow::Result<()> {
    if !status.is_success() {
        bail!("{}: {}", what, status);
    }
    Ok(())
}

/// Bytes `cat` reads: the requested length, never past the end of the file
fn read_length(file_size: u64, offset: i64, requested: Option<usize>) -> usize {
    let remaining = file_size.saturating_sub(offset.max(0) as u64);
    let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
    requested.map_or(remaining, |n| n.min(remaining))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let db = open_store(&args)?;

    match &args.command {
        Command::Init => {
            db.ensure_schema()?;
            info!(table = %db.table(), "Schema ready");
        }
        Command::Put { path, source } => {
            let content = std::fs::read(source)
                .with_context(|| format!("reading {}", source.display()))?;
            let path = sqlitefs::validation::normalize_path(path)?;
            db.insert_file(&path, &content, Timestamps::now())?;
            info!(path = %path, bytes = content.len(), "Stored");
        }
        Command::Stat { path, json } => {
            let fs = Dispatcher::new(db);
            let (status, stat) = fs.get_file_information(path, &FileInfo::new());
            check(status, path)?;

            let fmt_time = |t: sqlitefs::FileTime| {
                t.to_datetime()
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string())
            };

            if *json {
                let out = serde_json::json!({
                    "path": path,
                    "size": stat.file_size(),
                    "attributes": stat.attributes,
                    "created": fmt_time(stat.creation_time),
                    "accessed": fmt_time(stat.last_access_time),
                    "modified": fmt_time(stat.last_write_time),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("path:     {}", path);
                println!("size:     {}", stat.file_size());
                println!("created:  {}", fmt_time(stat.creation_time));
                println!("accessed: {}", fmt_time(stat.last_access_time));
                println!("modified: {}", fmt_time(stat.last_write_time));
            }
        }
        Command::Cat {
            path,
            offset,
            length,
        } => {
            let fs = Dispatcher::new(db);
            let info = FileInfo::new();

            let (status, stat) = fs.get_file_information(path, &info);
            check(status, path)?;

            let mut buf = vec![0u8; read_length(stat.file_size(), *offset, *length)];
            let (status, n) = fs.read_file(path, &mut buf, *offset, &info);
            check(status, path)?;
            std::io::stdout().write_all(&buf[..n])?;
        }
        Command::Rm { path } => {
            let fs = Dispatcher::new(db.clone());
            let mut info = FileInfo::new();

            check(
                fs.create_file(path, &CreateRequest::open_existing(), &mut info),
                path,
            )?;
            info.delete_on_close = true;
            check(fs.delete_file(path, &info), path)?;
            fs.cleanup(path, &info);
            fs.close_file(path, &info);

            let remaining = db.count()?;
            info!(path = %path, remaining, "Removed");
        }
    }

    Ok(())
}
