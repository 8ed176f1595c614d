//! Messaging front-ends
//!
//! - [`chatwoot`]: helpdesk webhook (Instagram, WhatsApp and Telegram inboxes)
//! - [`telegram`]: long-polling Telegram bot with guided buttons

pub mod chatwoot;
pub mod telegram;

pub use chatwoot::{ChatwootClient, Helpdesk, IncomingMessage, WebhookOutcome};
pub use telegram::{TelegramBot, TelegramLeadNotifier};
