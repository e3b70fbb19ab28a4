//! Outbound side: formatting and throttled delivery of listings
//!
//! - `format_message`: the text posted for one listing
//! - `Publisher`: one listing per tick, marked only after a successful send
//! - `Messenger`: the delivery capability, with a Telegram Bot API client

mod format;
mod publisher;
mod telegram;

pub use format::{format_message, format_salary_line, plausible_salary, MAX_DESCRIPTION_CHARS};
pub use publisher::{PublishOutcome, Publisher};
pub use telegram::{Messenger, TelegramMessenger};
