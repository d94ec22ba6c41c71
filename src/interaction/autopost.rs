//! Periodic posting of generated events to the target chat.

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{ChatId, Res, Void},
    },
    generator::EventGenerator,
    service::{chat::ChatClient, store::ChatStore},
};

/// Resolves the chat autoposts go to: the configured override first, then the registered chat.
pub async fn target_chat_id(config: &Config, store: &ChatStore) -> Res<Option<ChatId>> {
    if let Some(chat_id) = config.chat_id {
        return Ok(Some(chat_id));
    }

    store.get().await
}

/// Generates one event and posts it to the target chat, if there is one.
#[instrument(skip_all)]
pub async fn send_event_to_target(config: &Config, generator: &EventGenerator, store: &ChatStore, chat: &ChatClient) -> Void {
    let Some(chat_id) = target_chat_id(config, store).await? else {
        warn!("No target chat; use /register or set EVENT_BOT_CHAT_ID.");
        return Ok(());
    };

    let text = generator.generate_event();
    chat.send_message(chat_id, &text).await?;

    info!("Posted event to chat `{}`: {}", chat_id, text);

    Ok(())
}

/// Starts the autopost loop, unless autoposting is disabled.
///
/// The first post happens right away when `send_on_start` is set, otherwise
/// after one full interval.
pub fn spawn_autopost(config: Config, generator: EventGenerator, store: ChatStore, chat: ChatClient) -> Option<JoinHandle<()>> {
    let Some(period) = config.autopost_interval() else {
        info!("Autopost is disabled.");
        return None;
    };

    let first = if config.send_on_start { Duration::ZERO } else { period };

    info!("Autopost interval: {:?} (first post in {:?}).", period, first);

    Some(tokio::spawn(run_autopost(period, first, config, generator, store, chat).in_current_span()))
}

async fn run_autopost(period: Duration, first: Duration, config: Config, generator: EventGenerator, store: ChatStore, chat: ChatClient) {
    let mut ticker = tokio::time::interval_at(Instant::now() + first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Err(err) = send_event_to_target(&config, &generator, &store, &chat).await {
            error!("Failed to post event: {}", err);
        }
    }
}
