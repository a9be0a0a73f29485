use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::infrastructure::slack_adapter::DEFAULT_API_BASE;

#[derive(Debug, Parser)]
#[command(
    name = "herald",
    version,
    about = "Deployment notification bridge",
    long_about = "herald receives deployment-lifecycle webhooks, resolves which repository and \
                  which people are involved, and posts threaded status updates to Slack."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Run the webhook intake server")]
    Serve(ServeArgs),
    #[command(about = "Deployment resolution utilities")]
    Deployment(DeploymentCommand),
    #[command(about = "Identity resolution utilities")]
    Identity(IdentityCommand),
    #[command(about = "Token management (save tokens, show active sources)")]
    Auth(AuthCommand),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(
        long,
        default_value = "0.0.0.0:8000",
        help = "Address to bind the webhook listener on"
    )]
    pub bind: String,
    #[arg(
        long,
        default_value = "deployments.json",
        help = "Deployment configuration file"
    )]
    pub deployments: PathBuf,
    #[arg(long, default_value = "roster.csv", help = "User roster file")]
    pub roster: PathBuf,
}

#[derive(Debug, Args)]
pub struct DeploymentCommand {
    #[command(subcommand)]
    pub command: DeploymentSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum DeploymentSubcommand {
    #[command(about = "Resolve a deployment name to repository coordinates")]
    Lookup {
        name: String,
        #[arg(
            long,
            default_value = "deployments.json",
            help = "Deployment configuration file"
        )]
        deployments: PathBuf,
        #[arg(
            long,
            env = "HERALD_GITHUB_ORG",
            help = "Organization used for conventional repository lookups"
        )]
        github_org: String,
        #[arg(
            long,
            env = "HERALD_GITHUB_API_BASE",
            help = "Override the GitHub API base URL (e.g. for GitHub Enterprise)"
        )]
        github_api_base: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct IdentityCommand {
    #[command(subcommand)]
    pub command: IdentitySubcommand,
}

#[derive(Debug, Subcommand)]
pub enum IdentitySubcommand {
    #[command(about = "Resolve a GitHub login to a Slack user id")]
    Lookup {
        login: String,
        #[arg(long, default_value = "roster.csv", help = "User roster file")]
        roster: PathBuf,
        #[arg(
            long,
            env = "HERALD_GITHUB_API_BASE",
            help = "Override the GitHub API base URL"
        )]
        github_api_base: Option<String>,
        #[arg(
            long,
            env = "HERALD_SLACK_API_BASE",
            default_value = DEFAULT_API_BASE,
            help = "Override the Slack API base URL"
        )]
        slack_api_base: String,
    },
}

#[derive(Debug, Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthSubcommand {
    #[command(about = "Save a service token to the local config directory")]
    Login {
        #[arg(value_enum)]
        service: Service,
        token: String,
    },
    #[command(about = "Show which source supplies each service token")]
    Which,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Service {
    Github,
    Slack,
    Webhook,
}
