use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use poweradmin::{
    AppState, SharedState, api,
    auth::hash_password,
    config::AppConfig,
    db::{self, user_repo::{self, PermEdit}},
    powerdns::{DnssecProvider, client::PowerDnsClient},
    validation::RecordType,
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, value_name = "PATH", global = true, default_value = "poweradmin.sqlite3")]
    db_path: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Add a user that can log in to the API
    CreateUser(CreateUserArgs),
}

#[derive(Args, Debug)]
#[command(rename_all = "kebab-case")]
struct ServeArgs {
    /// Listen address for the HTTP server
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,
    /// TTL for records submitted without one
    #[arg(long, value_name = "SECONDS", default_value_t = 86400)]
    default_ttl: u32,
    /// SOA contact mailbox for new zones
    #[arg(long, value_name = "EMAIL", default_value = "hostmaster@example.net")]
    hostmaster: String,
    /// Nameserver added to new zones (repeat for multiple values; first is SOA primary)
    #[arg(long = "nameserver", value_name = "FQDN", required = true)]
    nameservers: Vec<String>,
    #[arg(long, value_name = "SECONDS", default_value_t = 28800)]
    soa_refresh: u32,
    #[arg(long, value_name = "SECONDS", default_value_t = 7200)]
    soa_retry: u32,
    #[arg(long, value_name = "SECONDS", default_value_t = 604800)]
    soa_expire: u32,
    #[arg(long, value_name = "SECONDS", default_value_t = 86400)]
    soa_minimum: u32,
    /// Reject single-label hostnames such as `localhost`
    #[arg(long)]
    top_level_tld_check: bool,
    /// Quote TXT content that was submitted without quotes
    #[arg(long)]
    txt_auto_quote: bool,
    /// Disable PTR creation, both single and batch
    #[arg(long)]
    no_reverse_records: bool,
    /// Minutes east of UTC used to date SOA serials
    #[arg(long, value_name = "MINUTES", default_value_t = 0, allow_negative_numbers = true)]
    utc_offset_minutes: i32,
    /// Record types allowed in forward zones (comma separated, default all)
    #[arg(long, value_name = "TYPES", value_delimiter = ',')]
    domain_record_types: Option<Vec<RecordType>>,
    /// Record types allowed in reverse zones (comma separated, default all)
    #[arg(long, value_name = "TYPES", value_delimiter = ',')]
    reverse_record_types: Option<Vec<RecordType>>,
    /// PowerDNS API URL; enables DNSSEC management when set
    #[arg(long, value_name = "URL", requires = "pdns_key")]
    pdns_url: Option<String>,
    /// PowerDNS API key
    #[arg(long, value_name = "KEY")]
    pdns_key: Option<String>,
    /// PowerDNS server ID
    #[arg(long, value_name = "ID", default_value = "localhost")]
    pdns_server_id: String,
}

#[derive(Args, Debug)]
#[command(rename_all = "kebab-case")]
struct CreateUserArgs {
    #[arg(long)]
    username: String,
    /// Password; read from POWERADMIN_PASSWORD when omitted
    #[arg(long, env = "POWERADMIN_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long, default_value = "")]
    fullname: String,
    /// all, own, own_as_client or none
    #[arg(long, default_value = "own")]
    perm: PermEdit,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let db = open_db(&cli.db_path).await?;

    match cli.command {
        Command::Serve(args) => serve(args, db).await,
        Command::CreateUser(args) => create_user(args, db).await,
    }
}

async fn open_db(path: &std::path::Path) -> Result<db::Db> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create db directory {}", parent.display()))?;
    }
    db::init_db(path).await
}

async fn serve(args: ServeArgs, db: db::Db) -> Result<()> {
    let config = build_app_config(&args)?;
    let state = init_shared_state(&args, config, db);
    let app = api::create_router(state);

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind to {}", args.listen))?;

    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}

async fn create_user(args: CreateUserArgs, db: db::Db) -> Result<()> {
    let username = args.username.trim();
    if username.is_empty() {
        bail!("username cannot be empty");
    }
    if user_repo::exists(&db, username).await? {
        bail!("user '{username}' already exists");
    }
    let hash = hash_password(&args.password)?;
    let id = user_repo::insert(&db, username, &hash, &args.fullname, args.perm).await?;
    info!(user = %username, id, perm = %args.perm, "user created");
    Ok(())
}

fn init_shared_state(args: &ServeArgs, config: AppConfig, db: db::Db) -> SharedState {
    let dnssec = match (&args.pdns_url, &args.pdns_key) {
        (Some(url), Some(key)) => {
            let client = PowerDnsClient::new(url, key, &args.pdns_server_id);
            Some(Arc::new(client) as Arc<dyn DnssecProvider>)
        }
        _ => None,
    };
    Arc::new(AppState::new(config, db, dnssec))
}

fn build_app_config(args: &ServeArgs) -> Result<AppConfig> {
    let nameservers = args
        .nameservers
        .iter()
        .map(|ns| normalize_fqdn(ns).with_context(|| format!("invalid nameserver '{ns}'")))
        .collect::<Result<Vec<_>>>()?;
    if nameservers.is_empty() {
        bail!("at least one --nameserver value is required");
    }
    if !args.hostmaster.contains('@') {
        bail!("hostmaster must be an email address");
    }

    Ok(AppConfig {
        default_ttl: args.default_ttl,
        hostmaster: args.hostmaster.trim().to_string(),
        nameservers,
        soa_refresh: args.soa_refresh,
        soa_retry: args.soa_retry,
        soa_expire: args.soa_expire,
        soa_minimum: args.soa_minimum,
        top_level_tld_check: args.top_level_tld_check,
        txt_auto_quote: args.txt_auto_quote,
        reverse_records_enabled: !args.no_reverse_records,
        dnssec_enabled: args.pdns_url.is_some(),
        utc_offset_minutes: args.utc_offset_minutes,
        domain_record_types: args.domain_record_types.clone(),
        reverse_record_types: args.reverse_record_types.clone(),
    })
}

fn normalize_fqdn(input: &str) -> Result<String> {
    let trimmed = input.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        bail!("FQDN cannot be empty");
    }
    Ok(trimmed.to_ascii_lowercase())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
    }
    info!("shutdown signal received");
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
