//! Discord webhook alerts
//!
//! Posts Alert-channel events as embeds. Delivery is best effort: failures
//! are logged and swallowed so a webhook outage never stalls the loop.
//!
//! Usage:
//!   Set DISCORD_WEBHOOK (or notify.discord_webhook in the config file)

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::BotEvent;

const COLOR_OK: u32 = 0x00FF00;
const COLOR_WARN: u32 = 0xFFA500;
const COLOR_ERROR: u32 = 0xFF0000;
const COLOR_INFO: u32 = 0x808080;

/// Discord webhook message structure
#[derive(Debug, Serialize)]
pub(crate) struct DiscordMessage {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    fields: Vec<DiscordField>,
    footer: Option<DiscordFooter>,
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
struct DiscordField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct DiscordFooter {
    text: String,
}

fn field(name: &str, value: String, inline: bool) -> DiscordField {
    DiscordField {
        name: name.to_string(),
        value,
        inline,
    }
}

pub struct DiscordAlerter {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl DiscordAlerter {
    pub fn new(webhook_url: Option<String>) -> Self {
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());

        if webhook_url.is_some() {
            info!("Discord alerts enabled");
        } else {
            warn!("DISCORD_WEBHOOK not set - Discord alerts disabled");
        }

        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub(crate) fn build_message(event: &BotEvent) -> DiscordMessage {
        let (title, color, fields) = match event {
            BotEvent::TradeMessages { path, message_count, messages_json } => (
                format!("📤 Submitting trade on {}", path),
                COLOR_INFO,
                vec![
                    field("Messages", message_count.to_string(), true),
                    field("Payload", format!("```json\n{}\n```", truncate(messages_json, 900)), false),
                ],
            ),
            BotEvent::BroadcastResult { path, result, sequence } => {
                let (title, color) = if result.accepted() {
                    (format!("✅ Broadcast accepted: {}", path), COLOR_OK)
                } else {
                    (format!("⚠️ Broadcast rejected by CheckTx: {}", path), COLOR_WARN)
                };
                (
                    title,
                    color,
                    vec![
                        field("Code", result.code.to_string(), true),
                        field("Sequence", sequence.to_string(), true),
                        field("Hash", format!("`{}`", result.hash), false),
                        field("Log", truncate(&result.log, 900), false),
                    ],
                )
            }
            BotEvent::StepFailed { iteration, error } => (
                "❌ Step failed".to_string(),
                COLOR_ERROR,
                vec![
                    field("Iteration", iteration.to_string(), true),
                    field("Error", truncate(error, 900), false),
                ],
            ),
            BotEvent::SignOfLife { iteration, active_paths, cooling_paths, sequence, uptime_minutes } => (
                "💓 Sign of life".to_string(),
                COLOR_INFO,
                vec![field(
                    "Status",
                    format!(
                        "```\nIteration: {}\nActive:    {}\nCooling:   {}\nSequence:  {}\nUptime:    {} min\n```",
                        iteration, active_paths, cooling_paths, sequence, uptime_minutes
                    ),
                    false,
                )],
            ),
        };

        DiscordMessage {
            content: None,
            embeds: vec![DiscordEmbed {
                title,
                description: String::new(),
                color,
                fields,
                footer: Some(DiscordFooter {
                    text: "Mempool Arbitrage".to_string(),
                }),
                timestamp: Some(chrono::Utc::now().to_rfc3339()),
            }],
        }
    }

    /// Post `event` to the webhook. No-op when disabled.
    pub async fn send(&self, event: &BotEvent) {
        let webhook_url = match &self.webhook_url {
            Some(url) => url,
            None => return,
        };

        let message = Self::build_message(event);

        match self.client.post(webhook_url).json(&message).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    debug!("Discord alert sent");
                } else {
                    warn!("Discord webhook returned status: {}", response.status());
                }
            }
            Err(e) => {
                error!("Failed to send Discord alert: {}", e);
            }
        }
    }
}

/// Clip to Discord's field limits on a char boundary
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars).collect();
    clipped.push('…');
    clipped
}
