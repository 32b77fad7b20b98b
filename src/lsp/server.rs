use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::lsp::backend::Backend;
use crate::properties::PropertyRegistry;
use crate::Config;

/// Start the LSP server on stdio
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;

    // Logs go to stderr; stdout carries the protocol
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .target(env_logger::Target::Stderr)
    .init();

    if let Some(path) = &config.project_config_path {
        log::info!("Using project configuration {}", path.display());
    }

    let properties = load_properties(&config).await;
    log::info!("Loaded {} property definitions", properties.len());

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config.clone(), properties.clone()))
            .finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}

/// Built-in knowledge base extended by the configured property directories
pub async fn load_properties(config: &Config) -> PropertyRegistry {
    let mut registry = PropertyRegistry::with_builtin();

    for dir in &config.property_dirs {
        match registry.load_directory(dir).await {
            Ok(0) => {}
            Ok(count) => log::info!("Loaded {} property files from {}", count, dir.display()),
            Err(e) => log::warn!("Failed to load properties from {}: {:#}", dir.display(), e),
        }
    }

    registry
}
