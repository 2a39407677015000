//! Studio admin CLI
//!
//! Resolves a session's access against the platform API and prints what the
//! admin console would derive from it.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use studio_admin::{
    access_control::{AccessResolver, RequestAccess},
    api::ApiClient,
    auth::SessionIdentity,
    config::{AppConfig, LogFormat, load_config},
    gate::Page,
    listing::{ListParams, paginate},
    vars::{VarFilter, scope_vars},
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Studio admin - access resolution for the admin console
#[derive(Parser, Debug)]
#[command(name = "studio-admin")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "STUDIO_ADMIN_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "STUDIO_ADMIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Session user id
    #[arg(long, env = "STUDIO_ADMIN_UID")]
    uid: Option<u64>,

    /// Session bearer token
    #[arg(long, env = "STUDIO_ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print role names, access map and visible accounts and applications
    Access,

    /// Run the page gate for a page
    Check {
        /// Page name, e.g. "vars" or "user roles"
        page: String,
    },

    /// Print the navigation menu
    Menu,

    /// List the vars the session may see
    Vars {
        #[arg(long)]
        account: Option<u64>,

        #[arg(long)]
        application: Option<u64>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// List users
    Users {
        #[command(flatten)]
        list: ListArgs,
    },

    /// List pending invites
    Invites {
        #[command(flatten)]
        list: ListArgs,
    },
}

/// Filtering, ordering and paging shared by the listing subcommands
#[derive(clap::Args, Debug)]
struct ListArgs {
    #[arg(long)]
    keyword: Option<String>,

    /// Sort key; vars also sort locally by account or application
    #[arg(long)]
    order_by: Option<String>,

    /// asc or desc
    #[arg(long)]
    direction: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: usize,
}

impl ListArgs {
    /// Request parameters as a list page would receive them
    fn query(&self) -> Vec<(&'static str, String)> {
        [
            ("keyword", self.keyword.clone()),
            ("order_by", self.order_by.clone()),
            ("direction", self.direction.clone()),
            ("page", Some(self.page.to_string())),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

fn init_logging(config: &AppConfig, level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(&config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_identity(request: &RequestAccess) -> anyhow::Result<&SessionIdentity> {
    request
        .identity()
        .ok_or_else(|| anyhow::anyhow!("Listings require --uid and --token"))
}

/// Gate a listing page. A denied decision is printed and `false` returned.
async fn admit(request: &RequestAccess, page: Page) -> anyhow::Result<bool> {
    let decision = request.gate(page).await;
    if decision.is_granted() {
        return Ok(true);
    }
    print_json(&decision)?;
    Ok(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config, args.log_level.as_deref());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        api = %config.api.base_url(),
        "Starting studio-admin"
    );

    let identity = SessionIdentity::from_parts(args.uid, args.token)
        .inspect_err(|e| error!(error = %e, "Incomplete session identity"))?;

    let client = ApiClient::new(&config.api)
        .inspect_err(|e| error!(error = %e, "Failed to create API client"))?;
    let resolver = AccessResolver::new(Arc::new(client.clone()));
    let request = RequestAccess::new(resolver, identity);
    let step = config.admin.pagination_step;

    match args.command {
        Command::Access => {
            let resolved = request.resolved().await?;
            print_json(resolved)?;
        }
        Command::Check { page } => {
            let page = Page::try_parse(&page)
                .ok_or_else(|| anyhow::anyhow!("Unknown page: {page}"))?;
            let decision = request.gate(page).await;
            print_json(&decision)?;
            if !decision.is_granted() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Menu => {
            let menu = request.menu().await?;
            print_json(&menu)?;
        }
        Command::Vars {
            account,
            application,
            list,
        } => {
            let identity = require_identity(&request)?;
            if !admit(&request, Page::Vars).await? {
                return Ok(ExitCode::FAILURE);
            }
            let mut query = list.query();
            query.extend(account.map(|id| ("filter_by_account", id.to_string())));
            query.extend(application.map(|id| ("filter_by_application", id.to_string())));
            let filter = VarFilter::from_query(query.clone())?;
            let params = ListParams::from_query(query)?;

            let resolved = request.resolved().await?;
            let vars = client.list_vars(identity, &filter).await?;
            let scoped = scope_vars(vars, resolved, &filter);
            print_json(&paginate(scoped, params.page, step))?;
        }
        Command::Users { list } => {
            let identity = require_identity(&request)?;
            if !admit(&request, Page::Users).await? {
                return Ok(ExitCode::FAILURE);
            }
            let params = ListParams::from_query(list.query())?;
            let users = client.list_users(identity, &params).await?;
            print_json(&paginate(users, params.page, step))?;
        }
        Command::Invites { list } => {
            let identity = require_identity(&request)?;
            if !admit(&request, Page::Invites).await? {
                return Ok(ExitCode::FAILURE);
            }
            let params = ListParams::from_query(list.query())?;
            let invites = client.list_invites(identity, &params).await?;
            print_json(&paginate(invites, params.page, step))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
