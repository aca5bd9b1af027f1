//! avp-dash - AI Vision Pro dashboard client
//!
//! Command-line front end over the dashboard core: refresh analytics and the
//! reconciled image list, inspect single images, and upload new ones.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use avp_common::api::ListImagesQuery;
use avp_common::config::DashboardConfig;
use avp_common::events::RefreshTrigger;
use avp_common::models::{recent_cards, AnalyticsSummary, ImageCard};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use avp_dash::report;
use avp_dash::services::{DashboardSnapshot, LocalFile, RefreshOrchestrator, UploadAttempt};
use avp_dash::Dashboard;

/// Command-line arguments for avp-dash
#[derive(Parser, Debug)]
#[command(name = "avp-dash")]
#[command(about = "Dashboard client for the AI Vision Pro image processing backend")]
#[command(version)]
struct Args {
    /// Backend base URL (overrides AVP_API_BASE_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (default: <config_dir>/avp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one refresh cycle and print the dashboard
    Refresh,
    /// List reconciled images
    Images {
        /// Page size requested from the backend (1-100)
        #[arg(long)]
        limit: Option<u32>,

        /// Server-side status filter (uploaded, processing, completed)
        #[arg(long)]
        status: Option<String>,

        /// Resume listing after this key (from a previous page)
        #[arg(long)]
        last_key: Option<String>,

        /// Print raw JSON records
        #[arg(long)]
        json: bool,
    },
    /// Show a single image
    Show {
        /// Backend image id
        id: String,
    },
    /// Upload an image and wait for the post-upload refresh
    Upload {
        /// Image file (JPG, PNG, WebP; at most 10MB)
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG wins over the configured level
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "avp_dash=info,avp_common=info".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = DashboardConfig::resolve(args.api_url.as_deref(), args.config.as_deref())
        .context("Failed to load configuration")?;
    if !rust_log_set {
        filter_handle
            .reload(EnvFilter::new(config.logging.filter_directive()))
            .context("Failed to apply log level")?;
    }
    debug!(?config, "Configuration resolved");

    let dashboard = Dashboard::new(config).context("Failed to create backend client")?;
    info!("Backend: {}", dashboard.client.base_url());

    match args.command {
        Command::Refresh => {
            let report = dashboard.orchestrator.refresh_all(RefreshTrigger::Startup).await;
            print_dashboard(&dashboard, &report.snapshot);
            for error in &report.errors {
                eprintln!("warning: {}", error);
            }
        }
        Command::Images {
            limit,
            status,
            last_key,
            json,
        } => {
            let query = image_query(limit, status, last_key);
            let orchestrator = RefreshOrchestrator::new(dashboard.client.clone(), dashboard.event_bus.clone())
                .with_image_query(query);
            let records = orchestrator.fetch_images().await.context("Failed to fetch images")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                let cards: Vec<ImageCard> = recent_cards(&records, records.len());
                print!("{}", report::render_recent(&cards));
            }
        }
        Command::Show { id } => {
            let detail = dashboard
                .client
                .get_image(&id)
                .await
                .with_context(|| format!("Failed to fetch image {}", id))?;
            let card = ImageCard::from_record(&detail.image, 0);
            print!("{}", report::render_detail(&card, Some(detail.analysis_complete)));
        }
        Command::Upload { path } => {
            let file = LocalFile::open(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;

            let mut session = dashboard.session();
            match session.upload(&file).await {
                UploadAttempt::Finished {
                    outcome,
                    refresh: Some(refresh),
                } if outcome.success => {
                    println!("{}", outcome.summary());
                    println!(
                        "Refreshing in {} ms...",
                        dashboard.config.refresh_delay_ms
                    );
                    let report = refresh.await.context("Scheduled refresh task failed")?;
                    if let Some(report) = report {
                        println!();
                        print_dashboard(&dashboard, &report.snapshot);
                    }
                }
                attempt => {
                    let message = attempt
                        .message()
                        .unwrap_or_else(|| "Upload already in progress".to_string());
                    bail!(message);
                }
            }
        }
    }

    Ok(())
}

fn image_query(limit: Option<u32>, status: Option<String>, last_key: Option<String>) -> ListImagesQuery {
    let mut query = ListImagesQuery::default();
    if let Some(limit) = limit {
        query = query.with_limit(limit);
    }
    if let Some(status) = status {
        query = query.with_status(status);
    }
    if let Some(key) = last_key {
        query = query.with_last_key(key);
    }
    query
}

fn print_dashboard(dashboard: &Dashboard, snapshot: &DashboardSnapshot) {
    let summary = snapshot
        .analytics
        .as_ref()
        .map(|a| AnalyticsSummary::from_analytics(a, dashboard.config.top_objects_limit))
        .unwrap_or_default();
    print!("{}", report::render_summary(&summary));
    println!();

    let cards = recent_cards(&snapshot.images, dashboard.config.recent_limit);
    print!("{}", report::render_recent(&cards));
}
