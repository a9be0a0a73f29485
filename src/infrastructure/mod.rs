pub mod cache;
pub mod github_adapter;
pub mod local_config_adapter;
pub mod roster_adapter;
pub mod slack_adapter;
pub mod token_providers;
