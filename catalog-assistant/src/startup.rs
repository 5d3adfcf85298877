//! Application startup and lifecycle management.

use axum::Router;
use service_core::error::AppError;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AssistantConfig, EntityMappings, PRODUCTS_ENTITY};
use crate::services::providers::azure_openai::{AzureOpenAiConfig, AzureOpenAiProvider};
use crate::services::{EntityClient, PgCatalogSearch};
use crate::{build_router, AppState};

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Validate configuration, create backend clients and bind the listener.
    ///
    /// Nothing here talks to the database, the entity service or the model;
    /// those are reached lazily on the first request.
    pub async fn build(config: AssistantConfig) -> Result<Self, AppError> {
        let mappings = EntityMappings::load(&config.entity_service.mapping_path)?;
        let products_source = mappings.require_source_object(PRODUCTS_ENTITY)?;
        tracing::info!(
            entity = PRODUCTS_ENTITY,
            source = %products_source,
            entities = mappings.entity_names().count(),
            "Loaded entity mappings"
        );

        let catalog = PgCatalogSearch::connect_lazy(
            &config.database.connection_string,
            &config.database.search_procedure,
            config.database.max_connections,
        )?;

        let entities = EntityClient::new(&config.entity_service)?;

        let chat = AzureOpenAiProvider::new(AzureOpenAiConfig::from(&config.model)).map_err(|e| {
            tracing::error!("Failed to initialize chat provider: {}", e);
            AppError::ConfigError(anyhow::anyhow!("Chat provider initialization error: {}", e))
        })?;
        tracing::info!(
            deployment = %config.model.deployment,
            url = %chat.url(),
            "Chat provider initialized"
        );

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let state = AppState {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            entities,
            chat: Arc::new(chat),
        };

        tracing::info!(
            port,
            entity_service = %state.entities.base_url(),
            "catalog-assistant ready"
        );
        let router = build_router(state);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Port the server is listening on (useful when bound to port 0).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT or SIGTERM, then let in-flight requests finish.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
