//! Telegram update dispatching and reply rendering.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, InlineKeyboardButton, InlineKeyboardMarkup, InlineQueryResult,
    InlineQueryResultArticle, InputMessageContent, InputMessageContentText, KeyboardButton,
    KeyboardMarkup,
};
use tracing::{error, info, warn};

use crate::core::command::bot_commands;
use crate::core::ConversationEngine;
use crate::domain::UserId;
use crate::port::{CallbackData, Keyboard, Reply};

/// Run the long-polling dispatcher until shutdown.
pub async fn run_dispatcher(bot: Bot, engine: Arc<ConversationEngine>) {
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "failed to register bot commands");
    }

    info!("telegram dispatcher started");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
        .branch(Update::filter_inline_query().endpoint(on_inline));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Register commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();
    bot.set_my_commands(commands).await?;
    Ok(())
}

async fn on_message(
    bot: Bot,
    msg: Message,
    engine: Arc<ConversationEngine>,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let reply = engine.handle_text(UserId(msg.chat.id.0), text).await;
    send_reply(&bot, msg.chat.id, reply).await
}

async fn on_callback(
    bot: Bot,
    query: CallbackQuery,
    engine: Arc<ConversationEngine>,
) -> ResponseResult<()> {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(data) = query.data.as_deref().and_then(CallbackData::parse) else {
        // Unrecognized or mangled tokens are dropped silently.
        return Ok(());
    };
    let Some(message) = query.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let reply = engine.handle_callback(UserId(chat_id.0), data).await;
    send_reply(&bot, chat_id, reply).await
}

async fn on_inline(
    bot: Bot,
    query: InlineQuery,
    engine: Arc<ConversationEngine>,
) -> ResponseResult<()> {
    let suggestions = engine.handle_inline(&query.query).await;
    if suggestions.is_empty() {
        return Ok(());
    }

    let results: Vec<InlineQueryResult> = suggestions
        .into_iter()
        .map(|s| {
            InlineQueryResult::Article(
                InlineQueryResultArticle::new(
                    s.id,
                    s.title,
                    InputMessageContent::Text(InputMessageContentText::new(s.message)),
                )
                .description(s.description),
            )
        })
        .collect();

    if let Err(e) = bot
        .answer_inline_query(query.id, results)
        .cache_time(300)
        .is_personal(true)
        .await
    {
        error!(error = %e, "failed to answer inline query");
    }
    Ok(())
}

/// Render a core [`Reply`] as a Telegram message.
async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let request = bot.send_message(chat_id, reply.text);
    let result = match reply.keyboard {
        None => request.await,
        Some(Keyboard::Reply(rows)) => {
            let rows = rows
                .into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>());
            let mut markup = KeyboardMarkup::new(rows);
            markup.resize_keyboard = true;
            request.reply_markup(markup).await
        }
        Some(Keyboard::Inline(rows)) => {
            let rows = rows.into_iter().map(|row| {
                row.into_iter()
                    .map(|button| InlineKeyboardButton::callback(button.label, button.data.encode()))
                    .collect::<Vec<_>>()
            });
            request.reply_markup(InlineKeyboardMarkup::new(rows)).await
        }
    };

    if let Err(e) = result {
        error!(chat_id = chat_id.0, error = %e, "failed to send message");
    }
    Ok(())
}
