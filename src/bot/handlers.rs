use std::sync::Arc;

use anyhow::Context;
use teloxide::dispatching::UpdateHandler;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use teloxide::types::Message;
use teloxide::utils::command::BotCommands;
use tracing::info;
use tracing::instrument;

use crate::bot::Command;
use crate::bot::HandlerResult;
use crate::bot::context::AppContext;
use crate::bot::reply::Reply;
use crate::bot::router;

type SharedContext = Arc<AppContext>;

pub fn build_schema() -> UpdateHandler<anyhow::Error> {
  let message_handler = Update::filter_message()
    .branch(command_branch())
    .branch(dptree::endpoint(handle_text_message));

  dptree::entry().branch(message_handler)
}

fn command_branch() -> UpdateHandler<anyhow::Error> {
  dptree::entry()
    .filter_command::<Command>()
    .branch(dptree::case![Command::Start].endpoint(handle_start))
    .branch(dptree::case![Command::Help].endpoint(handle_help))
}

#[instrument(skip(bot, ctx, msg))]
async fn handle_start(bot: Bot, ctx: SharedContext, msg: Message) -> HandlerResult {
  let user = msg.from.as_ref().context("message missing sender")?;
  let user_id = user.id.0 as i64;
  info!(user_id, chat_id = %msg.chat.id, "received /start command");
  let reply = router::start(&ctx, user_id).await;
  send_reply(&bot, msg.chat.id, reply).await
}

#[instrument(skip(bot, msg))]
async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
  info!(chat_id = %msg.chat.id, "received /help command");
  let mut text = Command::descriptions().to_string();
  text.push_str("\n\nEverything else is available from the menu buttons.");
  bot.send_message(msg.chat.id, text).await?;
  Ok(())
}

#[instrument(skip(bot, ctx, msg))]
async fn handle_text_message(bot: Bot, ctx: SharedContext, msg: Message) -> HandlerResult {
  let Some(text) = msg.text() else {
    return Ok(());
  };
  if text.starts_with('/') {
    // unknown command, ignore to let telegram handle
    return Ok(());
  }
  let user = msg.from.as_ref().context("message missing sender")?;
  let user_id = user.id.0 as i64;
  info!(user_id, chat_id = %msg.chat.id, "handling text message");
  let reply = router::handle_text(&ctx, user_id, text).await;
  send_reply(&bot, msg.chat.id, reply).await
}

async fn send_reply(bot: &Bot, chat: ChatId, reply: Reply) -> HandlerResult {
  let request = bot.send_message(chat, reply.text);
  match reply.keyboard.markup() {
    Some(markup) => request.reply_markup(markup).await?,
    None => request.await?,
  };
  Ok(())
}
