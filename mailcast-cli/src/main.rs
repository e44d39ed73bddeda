//! mailcast - CRM bulk-mail dispatch console
//!
//! Composes an audience filter, asks the backend to start a bulk-send job,
//! and follows the per-recipient delivery stream to a final summary:
//!
//! ```text
//! mailcast send --template 3 --audience family-heads --product 5 --export mail_log.csv
//! mailcast preview --template 3 --audience female --older-than 65
//! mailcast templates
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mailcast_cli::client::ApiClient;
use mailcast_cli::{dashboard, report, stream, Dashboard};
use mailcast_common::auth::Credentials;
use mailcast_common::config::Settings;
use mailcast_common::filter::{AgeComparator, AudienceClass, FilterSelection, SubFilterKind};
use mailcast_common::EventBus;

/// Delivery events buffered for slow consumers before the oldest are dropped
const EVENT_BUS_CAPACITY: usize = 1024;

#[derive(Parser)]
#[command(name = "mailcast", version, about = "Bulk-mail dispatch console for the CRM backend")]
struct Cli {
    /// Backend base URL (overrides MAILCAST_API_URL and the config file)
    #[arg(global = true, long, value_name = "URL")]
    api_url: Option<String>,

    /// Bearer token (overrides MAILCAST_TOKEN and the config file)
    #[arg(global = true, long, value_name = "TOKEN")]
    token: Option<String>,

    /// Config file path (default: the platform config directory)
    #[arg(global = true, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a bulk-send job and follow its progress to completion
    Send(SendArgs),
    /// List the clients the given filter selects, without sending anything
    Preview(FilterArgs),
    /// Follow the delivery event stream without starting a job
    Watch,
    /// List available mail templates
    Templates,
    /// List available products
    Products,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AudienceArg {
    /// All clients
    All,
    /// Family heads only
    FamilyHeads,
    /// Male clients only
    Male,
    /// Female clients only
    Female,
    /// Clients who celebrate their birthday
    Birthday,
}

impl From<AudienceArg> for AudienceClass {
    fn from(arg: AudienceArg) -> Self {
        match arg {
            AudienceArg::All => AudienceClass::AllClients,
            AudienceArg::FamilyHeads => AudienceClass::FamilyHeads,
            AudienceArg::Male => AudienceClass::MaleClients,
            AudienceArg::Female => AudienceClass::FemaleClients,
            AudienceArg::Birthday => AudienceClass::BirthdayClients,
        }
    }
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Mail template to apply
    #[arg(long, value_name = "ID")]
    template: u64,

    /// Audience class to target
    #[arg(long, value_enum, default_value_t = AudienceArg::All)]
    audience: AudienceArg,

    /// Narrow to clients holding one of these products (repeatable)
    #[arg(
        long = "product",
        value_name = "ID",
        conflicts_with_all = ["older_than", "younger_than", "aged"]
    )]
    products: Vec<u64>,

    /// Narrow to clients older than AGE
    #[arg(long, value_name = "AGE", conflicts_with_all = ["younger_than", "aged"])]
    older_than: Option<u32>,

    /// Narrow to clients younger than AGE
    #[arg(long, value_name = "AGE", conflicts_with = "aged")]
    younger_than: Option<u32>,

    /// Narrow to clients of exactly AGE
    #[arg(long, value_name = "AGE")]
    aged: Option<u32>,
}

impl FilterArgs {
    fn selection(&self) -> FilterSelection {
        let mut selection = FilterSelection {
            audience: self.audience.into(),
            template_id: self.template,
            ..Default::default()
        };

        if !self.products.is_empty() {
            selection.sub_filter = SubFilterKind::Product;
            selection.product_ids = self.products.iter().copied().collect::<BTreeSet<_>>();
        } else if let Some(age) = self.older_than {
            selection.sub_filter = SubFilterKind::Age;
            selection.age_comparator = AgeComparator::Over;
            selection.age_value = Some(age);
        } else if let Some(age) = self.younger_than {
            selection.sub_filter = SubFilterKind::Age;
            selection.age_comparator = AgeComparator::Under;
            selection.age_value = Some(age);
        } else if let Some(age) = self.aged {
            selection.sub_filter = SubFilterKind::Age;
            selection.age_comparator = AgeComparator::Exactly;
            selection.age_value = Some(age);
        }

        selection
    }
}

#[derive(Debug, Args)]
struct SendArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Write the delivery log as CSV to PATH once the job completes
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(
        cli.api_url.as_deref(),
        cli.token.as_deref(),
        cli.config.as_deref(),
    );

    init_tracing(&settings.log_level);
    tracing::debug!(api = %settings.api_base_url, "Resolved backend endpoint");

    match cli.command {
        Commands::Send(args) => run_send(&settings, args).await,
        Commands::Preview(args) => run_preview(&settings, args).await,
        Commands::Watch => run_watch(&settings).await,
        Commands::Templates => run_templates(&settings).await,
        Commands::Products => run_products(&settings).await,
    }
}

/// Logs go to stderr; stdout is reserved for the report
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the authenticated client, refusing tokens already known to be
/// expired
fn api_client(settings: &Settings) -> Result<ApiClient> {
    let token = settings.token.clone().ok_or_else(|| {
        anyhow!("no bearer token configured; pass --token, set MAILCAST_TOKEN, or add token to the config file")
    })?;

    let credentials = Credentials::new(token);
    if credentials.is_expired() {
        bail!("bearer token has expired; log in again to obtain a fresh token");
    }

    Ok(ApiClient::new(&settings.api_base_url, credentials)?)
}

async fn run_send(settings: &Settings, args: SendArgs) -> Result<()> {
    let client = api_client(settings)?;
    let selection = args.filter.selection();

    // One push channel per console session, shared across jobs
    let bus = EventBus::new(EVENT_BUS_CAPACITY);
    tokio::spawn(stream::run_progress_stream(
        client.clone(),
        bus.clone(),
        stream::ReconnectPolicy::default(),
    ));

    let mut dashboard = Dashboard::new(client, bus);
    let summary = dashboard
        .run_send(&selection)
        .await
        .context("failed to initiate mail sending")?;

    report::print_summary(&summary, dashboard.log().foreign_events());

    if let Some(path) = &args.export {
        report::export_csv(dashboard.log().events(), path)?;
        println!("Delivery log written to {}", path.display());
    }

    Ok(())
}

async fn run_preview(settings: &Settings, args: FilterArgs) -> Result<()> {
    let client = api_client(settings)?;
    let descriptor = args.selection().descriptor();

    let clients = client
        .preview_clients(&descriptor)
        .await
        .with_context(|| format!("failed to preview \"{}\"", descriptor.filter_name))?;

    report::print_clients(&clients);
    Ok(())
}

async fn run_watch(settings: &Settings) -> Result<()> {
    let client = api_client(settings)?;

    let bus = EventBus::new(EVENT_BUS_CAPACITY);
    let rx = bus.subscribe();
    tokio::spawn(stream::run_progress_stream(
        client,
        bus.clone(),
        stream::ReconnectPolicy::default(),
    ));
    // Drop the local handle so the watch ends once the stream consumer
    // gives up and releases its clone
    drop(bus);

    println!("Watching delivery events (Ctrl-C to stop)...");
    dashboard::watch(rx).await;
    Ok(())
}

async fn run_templates(settings: &Settings) -> Result<()> {
    let client = api_client(settings)?;
    let templates = client
        .list_templates()
        .await
        .context("failed to fetch templates")?;
    report::print_templates(&templates);
    Ok(())
}

async fn run_products(settings: &Settings) -> Result<()> {
    let client = api_client(settings)?;
    let products = client
        .list_products()
        .await
        .context("failed to fetch products")?;
    report::print_products(&products);
    Ok(())
}
