//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the event bot:
//! - Chat services (e.g., Telegram)
//! - Chat registration storage (e.g., a JSON state file)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod store;
