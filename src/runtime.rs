//! Runtime services and shared state for the event bot.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    generator::EventGenerator,
    interaction::autopost,
    service::{chat::ChatClient, store::ChatStore},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the generator, chat store, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The event generator instance.
    pub generator: EventGenerator,
    /// The registered chat store instance.
    pub store: ChatStore,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Load the catalog; any configuration error stops startup here.
        let generator = EventGenerator::from_config(&config)?;

        info!(
            people = generator.catalog().people().len(),
            group_templates = generator.catalog().group().len(),
            "Catalog loaded."
        );

        // Initialize the chat store.
        let store = ChatStore::file(&config.state_path);

        // Initialize the telegram client.
        let chat = ChatClient::telegram(&config, generator.clone(), store.clone()).await?;

        Ok(Self { config, generator, store, chat })
    }

    /// Runs the autopost scheduler and the chat listener until shutdown.
    pub async fn start(&self) -> Void {
        let autopost = autopost::spawn_autopost(self.config.clone(), self.generator.clone(), self.store.clone(), self.chat.clone());

        let result = tokio::select! {
            result = self.chat.start() => result,
            signal = shutdown_signal() => {
                info!("Stopping event bot ...");
                signal
            }
        };

        if let Some(handle) = autopost {
            handle.abort();
        }

        result
    }
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() -> Void {
    #[cfg(unix)]
    {
        let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
