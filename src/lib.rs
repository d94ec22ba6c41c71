//! Library root for `pvz-event-bot`.
//!
//! The event bot is a Telegram bot for a pickup-point team chat designed to:
//! - Generate short random stories about team members on demand
//! - Post one such story to a registered chat on a fixed interval
//! - Let a chat register or unregister itself for autoposting
//!
//! The random event generator is the core of the crate; the Telegram client,
//! the registered chat store and the scheduler are built around extensible
//! traits that allow for different implementations of each service.

pub mod base;
pub mod generator;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::{info, warn};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the event bot runtime:
/// - Installs the crypto provider
/// - Creates the runtime context with generator, store, and chat clients
/// - Starts the autopost scheduler and the update loop
pub async fn start(config: Config) -> Void {
    info!("Starting pvz-event-bot ...");

    // Start the crypto provider.
    if crypto::ring::default_provider().install_default().is_err() {
        warn!("A crypto provider was already installed.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
