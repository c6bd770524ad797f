use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hal_search::client::HalClient;
use hal_search::config::{find_config_file, load_config, ConfigFile, CONFIG_FILE_NAME};
use hal_search::models::{Format, SearchParams, SortOrder};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// hal-search - Query the HAL open archive search API
#[derive(Parser, Debug)]
#[command(name = "hal-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Query the HAL open archive search API", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

/// Sort order
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    /// Ascending order
    Asc,
    /// Descending order
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Ascending,
            Order::Desc => SortOrder::Descending,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search HAL and print the raw response body
    #[command(alias = "s")]
    Search {
        /// Solr query string
        query: String,

        /// Response format (json, xml, xml-tei, bibtex, csv)
        #[arg(long, short, value_parser = parse_format)]
        format: Option<Format>,

        /// Comma-separated list of fields to return
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        /// Field to sort on
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort order
        #[arg(long, value_enum, requires = "sort_by")]
        order: Option<Order>,

        /// Upper slot of the submission year range
        #[arg(long)]
        before: Option<i32>,

        /// Lower slot of the submission year range
        #[arg(long)]
        after: Option<i32>,

        /// Number of rows to return (the library itself defaults to 0 rows)
        #[arg(long, short, default_value_t = 10)]
        rows: u64,

        /// Index of the first row
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Search within a portal (e.g. "inria")
        #[arg(long, conflicts_with = "collection")]
        portal: Option<String>,

        /// Search within a collection (e.g. "TDS-MACS")
        #[arg(long)]
        collection: Option<String>,

        /// Override the API base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Write the body to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Re-indent JSON bodies
        #[arg(long)]
        pretty: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show the environment variables that override configuration
    Env,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Target path (default: user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

fn parse_format(s: &str) -> Result<Format, hal_search::HalError> {
    s.parse()
}

fn print_env_vars() {
    println!("hal-search - Environment Variables");
    println!();
    println!("Client:");
    println!("  HAL_SEARCH_CLIENT__BASE_URL        Search API endpoint");
    println!("  HAL_SEARCH_CLIENT__PORTAL          Portal sub-path (exclusive with collection)");
    println!("  HAL_SEARCH_CLIENT__COLLECTION      Collection sub-path (exclusive with portal)");
    println!("  HAL_SEARCH_CLIENT__DEFAULT_FORMAT  Default response format (default: json)");
    println!("  HAL_SEARCH_CLIENT__TIMEOUT_SECS    Request timeout in seconds (default: 60)");
    println!("  HAL_SEARCH_CLIENT__USER_AGENT      User agent sent with requests");
    println!();
    println!("Logging:");
    println!("  HAL_SEARCH_LOGGING__LEVEL          Log level (default: info)");
    println!("  HAL_SEARCH_LOGGING__FORMAT         Set to \"json\" for structured logs");
    println!("  RUST_LOG                           Overrides the log filter entirely");
}

fn init_logging(cli: &Cli, settings: &ConfigFile) {
    let log_level = match cli.verbose {
        0 => settings.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    let (json_layer, text_layer) = if settings.logging.is_json() {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("hal_search={}", env_filter)),
        ))
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("hal-search").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let mut settings = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config from environment".to_string(),
    })?;

    init_logging(&cli, &settings);

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    if let Some(timeout) = cli.timeout {
        settings.client.timeout_secs = timeout;
    }

    match cli.command {
        Commands::Search {
            query,
            format,
            fields,
            sort_by,
            order,
            before,
            after,
            rows,
            offset,
            portal,
            collection,
            base_url,
            output,
            pretty,
        } => {
            let mut client_config = settings.client;
            if let Some(base_url) = base_url {
                client_config.base_url = base_url;
            }
            if portal.is_some() {
                client_config.portal = portal;
                client_config.collection = None;
            }
            if collection.is_some() {
                client_config.collection = collection;
                client_config.portal = None;
            }

            let client = HalClient::new(client_config)?;

            let mut params = SearchParams::new(query).rows(rows).offset(offset);
            params.format = format;
            params.sort_by = sort_by;
            params.sort_order = order.map(SortOrder::from);
            params.before = before;
            params.after = after;
            if !fields.is_empty() {
                params = params.include_fields(fields);
            }

            let effective_format = params.format.unwrap_or(client.default_format());

            let response = client.search(&params).await?;
            let mut body = response
                .text()
                .await
                .context("Failed to read response body")?;

            if pretty && effective_format == Format::Json {
                let value: serde_json::Value =
                    serde_json::from_str(&body).context("Response is not valid JSON")?;
                body = serde_json::to_string_pretty(&value)?;
            }

            match output {
                Some(path) => {
                    let path = if path.extension().is_none() {
                        path.with_extension(effective_format.extension())
                    } else {
                        path
                    };
                    std::fs::write(&path, &body)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    if !cli.quiet {
                        eprintln!("Wrote {} bytes to {}", body.len(), path.display());
                    }
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(body.as_bytes())?;
                    if !body.ends_with('\n') {
                        stdout.write_all(b"\n")?;
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                let path = path.unwrap_or_else(default_config_path);
                if path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                ConfigFile::create_default()
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote default configuration to {}", path.display());
            }
            ConfigAction::Show => {
                settings.client.validate()?;
                println!("{}", toml::to_string_pretty(&settings)?);
            }
        },

        Commands::Env => print_env_vars(),
    }

    Ok(())
}
