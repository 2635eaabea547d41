//! Dialogue flows. Each handler consumes one message for a flow step, mutates
//! the session in place and returns the reply to send.

pub mod login;
pub mod menu;
pub mod profile;
pub mod registration;
pub mod withdrawal;

#[cfg(test)]
pub(crate) mod testing {
  use std::sync::Arc;

  use crate::bot::context::AppContext;
  use crate::bot::context::BotSettings;
  use crate::bot::session::SessionStore;
  use crate::db::Db;
  use crate::db::SheetRef;
  use crate::db::memory::MemorySheets;
  use crate::models::PaymentMode;
  use crate::models::USER_HEADERS;
  use crate::models::UserRecord;

  pub fn users() -> SheetRef {
    SheetRef::new("users-sheet", "Users")
  }

  pub fn payments() -> SheetRef {
    SheetRef::new("payments-sheet", "Payments")
  }

  pub fn context() -> (Arc<MemorySheets>, AppContext) {
    let backend = Arc::new(MemorySheets::new());
    let db = Db::new(backend.clone(), users(), payments());
    let settings = BotSettings {
      payment_date: "15th of the month".to_string(),
      invoice_bot_username: "invoice_test_bot".to_string(),
      channel_link: "https://t.me/testchannel".to_string(),
    };
    (backend, AppContext::new(db, SessionStore::new(), settings))
  }

  /// Writes the header row plus one user, replacing the Users sheet.
  pub fn seed_user(backend: &MemorySheets, username: &str, balance: &str, payment_mode: PaymentMode) {
    let record = UserRecord {
      username: username.to_string(),
      first_name: "First".to_string(),
      last_name: "Last".to_string(),
      payment_mode,
      upi_id: format!("{username}@upi"),
      bank_account: "000111".to_string(),
      ifsc_code: "IFSC0000".to_string(),
      balance: balance.to_string(),
    };
    backend.seed(
      &users(),
      vec![USER_HEADERS.map(String::from).to_vec(), record.to_row()],
    );
  }
}
