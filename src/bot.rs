use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use tracing::{debug, error, info, warn};

use crate::assets::AssetStore;
use crate::config::Config;
use crate::external::ShellTools;
use crate::pipeline::{Pipeline, Saved, TelegramSource};

const WELCOME: &str =
    "Welcome to LSQ Note Saver! Send me any text or media and I will save it to your Logseq journal.";

/// Shared application state
pub struct AppState {
    pipeline: Pipeline<TelegramSource, ShellTools>,
}

impl AppState {
    pub fn new(config: &Config, bot: Bot) -> Self {
        let assets = AssetStore::new(config.assets_dir());
        let pipeline = Pipeline::new(assets, TelegramSource::new(bot), ShellTools::new());
        Self { pipeline }
    }
}

/// Start the Telegram bot
pub async fn run(bot: Bot, state: Arc<AppState>) -> Result<()> {
    info!("Starting Telegram bot...");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("bot"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let started = Instant::now();
    let sender = sender_label(&msg);

    match msg.text() {
        Some(text) => info!("Received message from {}: {}", sender, text),
        None => info!("Received {} from {}", kind_label(&msg), sender),
    }

    let reply = match route(&bot, &msg, &state).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Error handling message from {}: {:#}", sender, e);
            Some("An error occurred while processing your message. Please try again.".to_string())
        }
    };

    if let Some(text) = reply {
        bot.send_message(msg.chat.id, text).await?;
    }

    debug!("Processed update {:?} in {:?}", msg.id, started.elapsed());
    Ok(())
}

/// Classify the message and run the matching pipeline operation. Returns
/// the reply to send, if any; saves that succeed silently return None.
async fn route(bot: &Bot, msg: &Message, state: &AppState) -> Result<Option<String>> {
    let pipeline = &state.pipeline;
    let caption = msg.caption();

    if let Some(text) = msg.text() {
        if text == "/start" {
            return Ok(Some(WELCOME.to_string()));
        }

        bot.send_chat_action(msg.chat.id, ChatAction::Typing)
            .await?;
        return Ok(reply_for("Note", pipeline.save_text(text).await));
    }

    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        bot.send_chat_action(msg.chat.id, ChatAction::Typing)
            .await?;
        return Ok(reply_for(
            "Image",
            pipeline.save_photo(&photo.file.id.0, caption).await,
        ));
    }

    if let Some(video) = msg.video() {
        bot.send_chat_action(msg.chat.id, ChatAction::UploadDocument)
            .await?;
        return Ok(reply_for(
            "Video",
            pipeline.save_video(&video.file.id.0, caption).await,
        ));
    }

    if let Some(doc) = msg.document() {
        bot.send_chat_action(msg.chat.id, ChatAction::UploadDocument)
            .await?;
        return Ok(reply_for(
            "File",
            pipeline
                .save_document(&doc.file.id.0, doc.file_name.as_deref(), caption)
                .await,
        ));
    }

    if let Some(audio) = msg.audio() {
        bot.send_chat_action(msg.chat.id, ChatAction::UploadDocument)
            .await?;
        return Ok(reply_for(
            "Audio",
            pipeline
                .save_audio(
                    &audio.file.id.0,
                    audio.file_name.as_deref(),
                    audio.title.as_deref(),
                    caption,
                )
                .await,
        ));
    }

    if let Some(voice) = msg.voice() {
        bot.send_chat_action(msg.chat.id, ChatAction::UploadDocument)
            .await?;
        return Ok(reply_for(
            "Voice message",
            pipeline
                .save_voice(&voice.file.id.0, voice.duration.seconds(), caption)
                .await,
        ));
    }

    debug!("Ignoring unsupported message kind from {}", sender_label(msg));
    Ok(None)
}

/// Map a pipeline result onto the reply policy: errors and warnings get a
/// reply, clean saves stay silent.
fn reply_for(label: &str, result: Result<Saved>) -> Option<String> {
    match result {
        Ok(Saved::Ok) | Ok(Saved::Ignored) => None,
        Ok(Saved::Warning(stderr)) => Some(format!("{label} saved with warnings:\n{stderr}")),
        Err(e) => Some(format!(
            "Failed to save {}: {:#}",
            label.to_lowercase(),
            e
        )),
    }
}

fn sender_label(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|user| {
            user.username
                .clone()
                .unwrap_or_else(|| user.id.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn kind_label(msg: &Message) -> &'static str {
    if msg.photo().is_some() {
        "photo"
    } else if msg.video().is_some() {
        "video"
    } else if msg.document().is_some() {
        "document"
    } else if msg.audio().is_some() {
        "audio"
    } else if msg.voice().is_some() {
        "voice message"
    } else {
        "unsupported message"
    }
}
