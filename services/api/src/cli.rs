use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use yard_quote::error::AppError;
use yard_quote::pricing::AddOnSelection;

use crate::quote::{run_config_export, run_config_list, run_quote};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Yard Quote",
    about = "Price yard service quotes and run the quoting API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Price a single quote and print the itemized result
    Quote(QuoteArgs),
    /// Inspect tenant pricing configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print a tenant's resolved configuration as JSON
    Export(ExportArgs),
    /// List tenants with a stored configuration
    List(StoreArgs),
}

/// Storage override shared by every command that reads tenant documents.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct StoreArgs {
    /// Directory of `<business-id>.json` tenant documents (overrides QUOTE_CONFIG_DIR)
    #[arg(long)]
    pub(crate) config_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) store: StoreArgs,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Business to price for (defaults to QUOTE_DEFAULT_BUSINESS)
    #[arg(long)]
    pub(crate) business: Option<String>,
    /// Number of dogs on the property
    #[arg(long)]
    pub(crate) dogs: i64,
    /// Yard size: small, medium, large or xlarge
    #[arg(long, default_value = "medium")]
    pub(crate) yard_size: String,
    /// Visit frequency: weekly, twice-weekly, bi-weekly, monthly or one-time
    #[arg(long, default_value = "weekly")]
    pub(crate) frequency: String,
    /// Add-on to include, optionally with a billing mode (`deodorize` or `spray-deck=every-other`)
    #[arg(long = "add-on", value_parser = crate::infra::parse_add_on)]
    pub(crate) add_ons: Vec<(String, AddOnSelection)>,
    /// Named area of the property to service
    #[arg(long = "area")]
    pub(crate) areas: Vec<String>,
    /// ZIP code used to resolve the service zone
    #[arg(long)]
    pub(crate) zip: Option<String>,
    /// Explicit zone multiplier (takes precedence over --zip)
    #[arg(long)]
    pub(crate) zone_multiplier: Option<f64>,
    /// Days since the yard was last cleaned
    #[arg(long)]
    pub(crate) days_since_cleanup: Option<u32>,
    /// Date the yard was last cleaned (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) last_cleaned_on: Option<NaiveDate>,
    /// Reference date for --last-cleaned-on (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the quote as JSON instead of an itemized summary
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) store: StoreArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Business whose configuration to export
    #[arg(long)]
    pub(crate) business: Option<String>,
    #[command(flatten)]
    pub(crate) store: StoreArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quote(args) => run_quote(args),
        Command::Config {
            command: ConfigCommand::Export(args),
        } => run_config_export(args),
        Command::Config {
            command: ConfigCommand::List(args),
        } => run_config_list(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yard_quote::pricing::BillingMode;

    #[test]
    fn quote_command_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "yard-quote-api",
            "quote",
            "--dogs",
            "2",
            "--yard-size",
            "large",
            "--add-on",
            "deodorize",
            "--add-on",
            "spray-deck=every-other",
            "--area",
            "front",
            "--last-cleaned-on",
            "2025-05-01",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Quote(args)) => {
                assert_eq!(args.dogs, 2);
                assert_eq!(args.frequency, "weekly");
                assert_eq!(
                    args.add_ons,
                    vec![
                        ("deodorize".to_string(), AddOnSelection::SelectedDefault),
                        (
                            "spray-deck".to_string(),
                            AddOnSelection::SelectedWithMode(BillingMode::EveryOther)
                        ),
                    ]
                );
                assert_eq!(args.areas, vec!["front"]);
                assert_eq!(args.last_cleaned_on, NaiveDate::from_ymd_opt(2025, 5, 1));
            }
            other => panic!("expected quote command, got {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_config_dir_override() {
        let cli = Cli::try_parse_from([
            "yard-quote-api",
            "serve",
            "--port",
            "8088",
            "--config-dir",
            "/srv/tenants",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8088));
                assert_eq!(args.store.config_dir, Some(PathBuf::from("/srv/tenants")));
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}
