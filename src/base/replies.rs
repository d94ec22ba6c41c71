//! User-facing texts the bot sends back to chats.

/// Greeting shown on `/start`.
pub const START_MESSAGE: &str = "Привет! Я бот-генератор событий для ПВЗ.

/generate — сгенерировать событие
/register — включить автопостинг
/unregister — выключить автопостинг";

/// Label of the inline button attached to the greeting.
pub const GENERATE_BUTTON_TEXT: &str = "Сгенерировать действие";

/// Callback data carried by the generate button.
pub const GENERATE_CALLBACK_DATA: &str = "generate";

pub const REGISTERED_MESSAGE: &str = "Этот чат зарегистрирован для автопостинга.";
pub const UNREGISTERED_MESSAGE: &str = "Автопостинг отключён.";
pub const NOT_REGISTERED_MESSAGE: &str = "Этот чат не был зарегистрирован.";

// Callback query answers.

pub const CALLBACK_GENERATED: &str = "Сгенерировано";
pub const CALLBACK_UNKNOWN: &str = "Неизвестная команда";
pub const CALLBACK_ERROR: &str = "Ошибка";
