mod application;
mod domain;
mod infrastructure;
mod interface;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use application::auth_manager::AuthManager;
use application::context::BridgeContext;
use application::deployment_registry::DeploymentRegistry;
use application::dispatcher::UnroutedDispatcher;
use application::identity_resolver::IdentityResolver;
use application::thread_locator::ThreadLocator;
use infrastructure::cache::MemoryCache;
use infrastructure::github_adapter::OctocrabSourceControlGateway;
use infrastructure::local_config_adapter::{stored_token_path, DeploymentConfigAdapter};
use infrastructure::roster_adapter::load_roster;
use infrastructure::slack_adapter::SlackChatGateway;
use infrastructure::token_providers::{EnvTokenProvider, StoredTokenProvider};
use interface::cli::{
    AuthSubcommand, Cli, Commands, DeploymentSubcommand, IdentitySubcommand, Service, ServeArgs,
};
use interface::web;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Deployment(deployment) => match deployment.command {
            DeploymentSubcommand::Lookup {
                name,
                deployments,
                github_org,
                github_api_base,
            } => run_deployment_lookup(name, deployments, github_org, github_api_base).await,
        },
        Commands::Identity(identity) => match identity.command {
            IdentitySubcommand::Lookup {
                login,
                roster,
                github_api_base,
                slack_api_base,
            } => run_identity_lookup(login, roster, github_api_base, slack_api_base).await,
        },
        Commands::Auth(auth) => match auth.command {
            AuthSubcommand::Login { service, token } => run_auth_login(service, &token),
            AuthSubcommand::Which => run_auth_which(),
        },
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let webhook_secret = resolve_required_token(Service::Webhook)?;

    // Load both static files up front so a bad path or malformed file fails
    // the process at startup instead of on the first notification.
    let deployments = DeploymentConfigAdapter::new(&args.deployments).load()?;
    let roster = load_roster(&args.roster)?;
    tracing::info!(
        deployments = deployments.len(),
        roster_entries = roster.len(),
        "static configuration loaded"
    );

    let context = Arc::new(BridgeContext::new(
        webhook_secret,
        Arc::new(UnroutedDispatcher),
    ));
    let app = web::router(context);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(bind = %args.bind, "webhook intake listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn run_deployment_lookup(
    name: String,
    deployments_path: PathBuf,
    github_org: String,
    github_api_base: Option<String>,
) -> Result<()> {
    let github = build_source_control_gateway(github_api_base)?;
    let config = DeploymentConfigAdapter::new(&deployments_path).load()?;
    let registry = DeploymentRegistry::new(config, github_org, github);

    match registry.lookup_deployment(&name).await {
        Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
        None => println!("deployment not recognized: {name}"),
    }
    Ok(())
}

async fn run_identity_lookup(
    login: String,
    roster_path: PathBuf,
    github_api_base: Option<String>,
    slack_api_base: String,
) -> Result<()> {
    let github = build_source_control_gateway(github_api_base)?;
    let slack_token = resolve_required_token(Service::Slack)?;
    // Lookups never post, so the thread locator's app id is irrelevant here.
    let chat = Arc::new(SlackChatGateway::new(
        slack_token,
        slack_api_base,
        ThreadLocator::new(String::new()),
        MemoryCache::new(),
    ));
    let roster = load_roster(&roster_path)?;
    let resolver = IdentityResolver::new(roster, github, chat);

    match resolver.find_chat_id_for(&login).await {
        Some(chat_id) => println!("login={login} slack_id={chat_id}"),
        None => println!("login={login} not resolved"),
    }
    Ok(())
}

fn run_auth_login(service: Service, token: &str) -> Result<()> {
    let (_, file_name, label) = service_token_sources(service);
    let stored = StoredTokenProvider::new(stored_token_path(file_name));
    AuthManager::new(vec![], &stored).login(token)?;
    println!("{label} token saved to local config");
    Ok(())
}

fn run_auth_which() -> Result<()> {
    for service in [Service::Github, Service::Slack, Service::Webhook] {
        let (env_var, file_name, label) = service_token_sources(service);
        let env = EnvTokenProvider::new(env_var);
        let stored = StoredTokenProvider::new(stored_token_path(file_name));
        let manager = AuthManager::new(vec![&env, &stored], &stored);

        match manager.resolve_token()? {
            Some(resolution) => {
                let prefix: String = resolution.token.chars().take(6).collect();
                println!("{label}: {} ({prefix}***)", resolution.source);
            }
            None => println!("{label}: not configured (checked {env_var}, stored token)"),
        }
    }
    Ok(())
}

fn build_source_control_gateway(
    github_api_base: Option<String>,
) -> Result<Arc<OctocrabSourceControlGateway>> {
    let token = resolve_required_token(Service::Github)?;
    let client = OctocrabSourceControlGateway::build_client(token, github_api_base.as_deref())?;
    Ok(Arc::new(OctocrabSourceControlGateway::new(
        client,
        MemoryCache::new(),
    )))
}

fn resolve_required_token(service: Service) -> Result<String> {
    let (env_var, file_name, label) = service_token_sources(service);
    let env = EnvTokenProvider::new(env_var);
    let stored = StoredTokenProvider::new(stored_token_path(file_name));
    let manager = AuthManager::new(vec![&env, &stored], &stored);

    let resolution = manager.resolve_token()?.with_context(|| {
        format!("no {label} token found (set {env_var} or run `herald auth login`)")
    })?;
    tracing::debug!(source = resolution.source, "{} token resolved", label);
    Ok(resolution.token)
}

fn service_token_sources(service: Service) -> (&'static str, &'static str, &'static str) {
    match service {
        Service::Github => ("GITHUB_TOKEN", "github_token", "GitHub"),
        Service::Slack => ("SLACK_BOT_TOKEN", "slack_token", "Slack"),
        Service::Webhook => ("HERALD_WEBHOOK_SECRET", "webhook_secret", "webhook"),
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
