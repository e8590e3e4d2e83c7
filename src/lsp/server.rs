use std::thread;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::lsp_types::MessageType;
use tower_lsp::{LspService, Server};

use crate::catalog::CatalogManager;
use crate::lsp::backend::Backend;
use crate::Config;

/// Start the LSP server on stdio
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;
    config.init_logging();

    if let Some(path) = &config.project_config_path {
        log::info!("Using project configuration {}", path.display());
    }
    log::debug!("Catalog directories: {:?}", config.catalog_dirs);

    // Under the integration test, exit shortly so the test can read stdout to EOF.
    if std::env::var("ALLOY_LS_TEST_EXIT").as_deref() == Ok("1") {
        thread::spawn(|| {
            thread::sleep(Duration::from_secs(1));
            std::process::exit(0);
        });
    }

    let catalog_manager = CatalogManager::new(config.catalog_dirs.clone());

    let (service, socket) = LspService::build(move |client| {
        let backend = Backend::new(client.clone(), config.clone(), catalog_manager);

        // Load user catalogs and start the watcher in the background
        let manager = backend.catalog_manager.clone();
        tokio::spawn(async move {
            let mut manager = manager.lock().await;
            if let Err(e) = manager.initialize(Some(client.clone())).await {
                log::error!("Failed to initialize catalog: {:#}", e);
                client
                    .log_message(
                        MessageType::ERROR,
                        format!("Failed to initialize catalog: {}", e),
                    )
                    .await;
            }
        });

        backend
    })
    .finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
