//! Print the admin dashboard summary for the configured record store.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use admin_core::AdminSettings;
use admin_core::domain::{
    DashboardAggregator, DashboardSummary, LoanManager, User, UserManager, filter_by_name,
};
use admin_core::outbound::rest_store::RestRecordStore;
use admin_core::outbound::timeout_store::TimeoutRecordStore;
use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `dashboard-report` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dashboard-report",
    about = "Summarise users and loan requests held in the record store",
    version
)]
struct CliArgs {
    /// Number of recent loans to list. Overrides `LENDING_ADMIN_RECENT_LOANS`.
    #[arg(long = "recent", value_name = "count")]
    recent: Option<usize>,
    /// Also list users whose name contains this text, ignoring case.
    #[arg(long = "name", value_name = "query")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    summary: DashboardSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    matching_users: Option<Vec<&'a User>>,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = AdminSettings::load_from_iter([OsString::from("dashboard-report")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;

    let base_url = settings
        .store_url()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
    let mut rest = RestRecordStore::new(base_url, settings.request_timeout())
        .map_err(|error| io::Error::other(format!("create record store client: {error}")))?;
    if let Some(token) = settings.api_token() {
        rest = rest.with_bearer_token(token);
    }
    let store = Arc::new(TimeoutRecordStore::new(rest, settings.request_timeout()));

    let mut users = UserManager::with_collection(
        Arc::clone(&store),
        settings.users_collection(),
        Arc::new(DefaultClock),
    );
    let mut loans = LoanManager::with_collection(store, settings.loans_collection());

    users.list_users().await.map_err(report_error)?;
    loans.list_loans().await.map_err(report_error)?;

    let aggregator = DashboardAggregator::new(args.recent.unwrap_or(settings.recent_loans()));
    let report = Report {
        summary: aggregator.summarize(users.snapshot(), loans.snapshot()),
        matching_users: args
            .name
            .as_deref()
            .map(|query| filter_by_name(users.snapshot(), query)),
    };
    info!(
        users = users.snapshot().len(),
        loans = loans.snapshot().len(),
        "dashboard summary computed"
    );

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|error| io::Error::other(format!("render report: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn report_error(error: admin_core::Error) -> io::Error {
    io::Error::other(format!("{} ({error})", error.user_message()))
}
