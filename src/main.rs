mod app;
mod bot;
mod config;
mod db;
mod models;
mod telemetry;
mod util;

use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use teloxide::prelude::Bot;
use tracing::info;

use crate::bot::AppContext;
use crate::bot::BotSettings;
use crate::bot::SessionStore;
use crate::db::Db;
use crate::db::SheetRef;
use crate::db::sheets::GoogleSheets;

#[tokio::main]
async fn main() -> Result<()> {
  telemetry::init()?;
  let config = config::Config::from_env()?;
  info!(
    users_sheet = %config.user_sheet_name,
    payments_sheet = %config.payment_sheet_name,
    timeout_secs = config.sheets_timeout.as_secs(),
    "starting bot"
  );

  let backend = GoogleSheets::from_credentials_file(&config.credentials_file, config.sheets_timeout)
    .with_context(|| format!("failed to load credentials from {}", config.credentials_file.display()))?;
  let db = Db::new(
    Arc::new(backend),
    SheetRef::new(config.user_spreadsheet_id, config.user_sheet_name),
    SheetRef::new(config.payment_spreadsheet_id, config.payment_sheet_name),
  );
  let settings = BotSettings {
    payment_date: config.payment_date,
    invoice_bot_username: config.invoice_bot_username,
    channel_link: config.channel_link,
  };

  let bot = Bot::new(config.bot_token);
  let app = app::App::new(bot, AppContext::new(db, SessionStore::new(), settings));
  app.run().await
}
