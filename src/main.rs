use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use is_terminal::IsTerminal;
use lvl::error::Error::Parse;
use lvl::import::origin::zone_origin;
use lvl::import::ExistingRecordsIndex;
use lvl::record_store::RecordStore;
use lvl::{Config, SharedConfig, ZoneParser};
use std::fs::File;
use std::io::{self, Read, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lvl")]
#[command(about = "Command line client for the control panel API")]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Commands for managing domains
    #[command(subcommand)]
    Domain(DomainCommand),
}

#[derive(Subcommand)]
enum DomainCommand {
    /// Import DNS records for a domain from a zone file
    #[command(
        name = "zoneimport",
        long_about = "Import DNS records for a domain from a zone file.\n\
                      Existing records (same name/type) will be replaced by the new records.\n\
                      Pass '-' as file name to read from stdin."
    )]
    ZoneImport(ZoneImportArgs),

    /// Parse a zone file and print its entries without importing anything
    #[command(name = "zonecheck")]
    ZoneCheck {
        /// Zone file, or '-' for stdin
        zone_file: String,
    },
}

#[derive(Args)]
struct ZoneImportArgs {
    /// Domain to import into
    domain: String,

    /// Zone file, or '-' for stdin
    zone_file: String,

    /// Confirm import of file without prompt
    #[arg(short, long)]
    yes: bool,

    /// JSON file holding the domain's records
    #[arg(long)]
    records: Option<String>,

    /// Show what would be imported, but don't change anything
    #[arg(long)]
    dry_run: bool,

    /// Print the import plan as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let cli = Cli::parse();
    let config = config_init(cli.config.as_deref())?;

    match cli.command {
        Command::Domain(DomainCommand::ZoneImport(args)) => zone_import(config, args).await,
        Command::Domain(DomainCommand::ZoneCheck { zone_file }) => zone_check(&zone_file).await,
    }
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lvl=info".into()),
        )
        .init();
}

fn config_init(config_file: Option<&str>) -> Result<SharedConfig> {
    match config_file {
        None => Ok(Arc::new(Config::default())),
        Some(config_file) => {
            let config = Config::try_from_file(config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}

fn open_arg_file(path: &str) -> io::Result<Box<dyn Read + Send>> {
    match path {
        "-" => Ok(Box::new(io::stdin())),
        _ => Ok(Box::new(File::open(path)?)),
    }
}

async fn zone_import(config: SharedConfig, args: ZoneImportArgs) -> Result<()> {
    let origin = zone_origin(&args.domain)?;
    let zone_file = open_arg_file(&args.zone_file)
        .with_context(|| format!("failed to open input: {}", args.zone_file))?;

    let store = config.record_store(args.records.as_deref()).await?;
    let existing = store.read().await.records().await;
    let index = ExistingRecordsIndex::from_records(&existing);
    tracing::debug!("{} existing records for {origin}", index.len());

    let plan =
        tokio::task::spawn_blocking(move || lvl::plan_import(&origin, zone_file, &index)).await??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!(
            "{} existing records to delete (for replacement)\n{} records to create",
            plan.to_replace.len(),
            plan.to_create.len()
        );
    }

    if args.dry_run {
        return Ok(());
    }

    if !args.yes && !config.assume_yes {
        if args.zone_file == "-" || !io::stdin().is_terminal() {
            bail!("refusing to import without confirmation, pass --yes");
        }
        if !confirm_prompt("Confirm importing records?").await? {
            return Ok(());
        }
    }

    lvl::apply_plan(&store, &plan).await?;
    tracing::info!("all records successfully imported");
    Ok(())
}

async fn zone_check(zone_file: &str) -> Result<()> {
    let zone_file =
        open_arg_file(zone_file).with_context(|| format!("failed to open input: {zone_file}"))?;

    let failures = tokio::task::spawn_blocking(move || -> Result<usize, lvl::error::Error> {
        let mut failures = 0;
        for entry in ZoneParser::new(zone_file) {
            match entry {
                Ok(entry) => println!("{entry}"),
                Err(Parse(err)) => {
                    eprintln!("{err}");
                    failures += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(failures)
    })
    .await??;

    if failures > 0 {
        bail!("{failures} entries failed to parse");
    }
    Ok(())
}

async fn confirm_prompt(message: &str) -> Result<bool> {
    print!("{message} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
