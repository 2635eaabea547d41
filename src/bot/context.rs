use crate::bot::session::SessionStore;
use crate::db::Db;

/// Static texts that come from configuration.
#[derive(Debug, Clone)]
pub struct BotSettings {
  pub payment_date: String,
  pub invoice_bot_username: String,
  pub channel_link: String,
}

#[derive(Clone)]
pub struct AppContext {
  db: Db,
  sessions: SessionStore,
  settings: BotSettings,
}

impl AppContext {
  pub fn new(db: Db, sessions: SessionStore, settings: BotSettings) -> Self {
    Self { db, sessions, settings }
  }

  pub fn db(&self) -> &Db {
    &self.db
  }

  pub fn sessions(&self) -> &SessionStore {
    &self.sessions
  }

  pub fn settings(&self) -> &BotSettings {
    &self.settings
  }
}
