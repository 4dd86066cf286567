//! TSA CLI
//!
//! Developer tool for previewing the statements the query layer produces:
//! - Render criteria given on the command line
//! - List the shortcut presets for a tenant
//! - Show the drill-down below one bucket
//! - Print a default config file

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tsa::config::{generate_default_config, Config, LoggingConfig};
use tsa::{QueryCriteria, QueryCriteriaBuilder, Resolution, Shortcut};

#[derive(Parser)]
#[command(name = "tsa")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Preview InfluxQL for tenant-scoped sensor data queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a query from criteria
    Query {
        /// Tenant the query is scoped to
        #[arg(short, long)]
        tenant: String,
        /// Sensor id
        #[arg(short, long)]
        id: Option<String>,
        /// Lower time bound: RFC 3339 timestamp or now()-relative expression
        #[arg(long)]
        from: Option<String>,
        /// Upper time bound: RFC 3339 timestamp or now()-relative expression
        #[arg(long)]
        to: Option<String>,
        /// Selection expressions, in order (e.g. "mean(*)")
        #[arg(short, long)]
        select: Vec<String>,
        /// Bucket width, in units of --unit
        #[arg(long)]
        interval: Option<u64>,
        /// Bucket unit: S, M, H or D
        #[arg(short, long)]
        unit: Option<Resolution>,
        /// Tag columns to group by (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        group_by: Vec<String>,
        /// Start of a bucket to drill into
        #[arg(long)]
        bucket_start: Option<DateTime<Utc>>,
    },

    /// Render every shortcut preset
    Shortcuts {
        /// Tenant the queries are scoped to
        #[arg(short, long)]
        tenant: String,
        /// Sensor id
        #[arg(short, long)]
        id: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Query {
            tenant,
            id,
            from,
            to,
            select,
            interval,
            unit,
            group_by,
            bucket_start,
        } => {
            let interval = match (interval, unit) {
                (Some(value), Some(unit)) => Some((value, unit)),
                (None, Some(unit)) => Some((unit.default_bucket_count(), unit)),
                (Some(_), None) => bail!("--interval needs --unit"),
                (None, None) => None,
            };

            let builder = QueryCriteria::builder()
                .tenant_id(tenant)
                .maybe_id(id)
                .maybe_from(from)
                .maybe_to(to)
                .select_criteria(select)
                .maybe_interval(interval)
                .group_by_criteria(group_by);
            let criteria = bind(builder, &config).build()?;

            println!("{}", criteria.to_query()?);

            if let Some(start) = bucket_start {
                match criteria.drill_down(start)? {
                    Some(finer) => println!("drill-down: {}", finer.to_query()?),
                    None => println!("drill-down: query is not time-bucketed"),
                }
            }
        }

        Commands::Shortcuts { tenant, id } => {
            for shortcut in Shortcut::ALL {
                let criteria = bind(shortcut.criteria(&tenant, id.as_deref()), &config).build()?;
                println!("{:<20} {}", shortcut.rel(), criteria.to_query()?);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn bind(builder: QueryCriteriaBuilder, config: &Config) -> QueryCriteriaBuilder {
    builder
        .database(config.store.database.as_str())
        .table(config.store.measurement.as_str())
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("tsa={}", logging.level)));

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer.pretty()).init();
    }

    Ok(())
}
