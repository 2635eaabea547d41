use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;

const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
const DEFAULT_USER_SHEET: &str = "Users";
const DEFAULT_PAYMENT_SHEET: &str = "Payments";
const DEFAULT_PAYMENT_DATE: &str = "15th of the month";
const DEFAULT_INVOICE_BOT: &str = "invoice_earnifybot";
const DEFAULT_CHANNEL_LINK: &str = "https://t.me/employeechannel";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
  pub bot_token: String,
  pub credentials_file: PathBuf,
  pub user_spreadsheet_id: String,
  pub payment_spreadsheet_id: String,
  pub user_sheet_name: String,
  pub payment_sheet_name: String,
  pub payment_date: String,
  pub invoice_bot_username: String,
  pub channel_link: String,
  pub sheets_timeout: Duration,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    if let Err(err) = dotenvy::dotenv()
      && !err.not_found()
    {
      tracing::warn!(error = %err, "failed to load .env file");
    }

    let bot_token = env::var("TELEGRAM_TOKEN")
      .or_else(|_| env::var("BOT_TOKEN"))
      .or_else(|_| env::var("TELOXIDE_TOKEN"))
      .context("TELEGRAM_TOKEN must be set")?;
    let user_spreadsheet_id = env::var("USER_SPREADSHEET_ID").context("USER_SPREADSHEET_ID must be set")?;
    let payment_spreadsheet_id = env::var("PAYMENT_SPREADSHEET_ID").context("PAYMENT_SPREADSHEET_ID must be set")?;
    let timeout_raw = env::var("SHEETS_TIMEOUT_SECS").unwrap_or_default();

    Ok(Self {
      bot_token,
      credentials_file: PathBuf::from(var_or("GOOGLE_CREDENTIALS_FILE", DEFAULT_CREDENTIALS_FILE)),
      user_spreadsheet_id,
      payment_spreadsheet_id,
      user_sheet_name: var_or("USER_SHEET_NAME", DEFAULT_USER_SHEET),
      payment_sheet_name: var_or("PAYMENT_SHEET_NAME", DEFAULT_PAYMENT_SHEET),
      payment_date: var_or("DEFAULT_PAYMENT_DATE", DEFAULT_PAYMENT_DATE),
      invoice_bot_username: normalize_handle(&var_or("INVOICE_BOT_USERNAME", DEFAULT_INVOICE_BOT)),
      channel_link: var_or("CHANNEL_LINK", DEFAULT_CHANNEL_LINK),
      sheets_timeout: parse_timeout(&timeout_raw),
    })
  }
}

fn var_or(name: &str, default: &str) -> String {
  env::var(name)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
    .unwrap_or_else(|| default.to_string())
}

fn normalize_handle(raw: &str) -> String {
  raw.trim().trim_start_matches('@').to_string()
}

fn parse_timeout(raw: &str) -> Duration {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Duration::from_secs(DEFAULT_TIMEOUT_SECS);
  }
  match trimmed.parse::<u64>() {
    Ok(secs) if secs > 0 => Duration::from_secs(secs),
    Ok(_) => {
      tracing::warn!(value = trimmed, "SHEETS_TIMEOUT_SECS must be positive, using default");
      Duration::from_secs(DEFAULT_TIMEOUT_SECS)
    },
    Err(err) => {
      tracing::warn!(value = trimmed, error = %err, "invalid SHEETS_TIMEOUT_SECS, using default");
      Duration::from_secs(DEFAULT_TIMEOUT_SECS)
    },
  }
}
