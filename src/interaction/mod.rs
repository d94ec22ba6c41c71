//! Event handling and user interactions for the event bot.
//!
//! This module provides functionality for handling chat interactions:
//! - Processing incoming commands and inline button presses
//! - Registering and unregistering the autopost chat
//! - Posting generated events on a schedule

pub mod autopost;
pub mod command;
