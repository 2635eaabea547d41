use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use gcp_auth::CustomServiceAccount;
use gcp_auth::TokenProvider;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::instrument;

use super::SheetBackend;
use super::SheetRef;
use super::StoreError;
use super::StoreResult;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
/// Reads never reach past this column; the widest table has eight columns.
const LAST_COLUMN: &str = "Z";

/// Google Sheets v4 REST backend authenticated with a service account.
pub struct GoogleSheets {
  client: Client,
  auth: CustomServiceAccount,
}

impl GoogleSheets {
  pub fn from_credentials_file(path: &Path, timeout: Duration) -> StoreResult<Self> {
    let auth = CustomServiceAccount::from_file(path)?;
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, auth })
  }

  fn values_url(&self, sheet: &SheetRef, range: &str, suffix: &str) -> StoreResult<Url> {
    let mut url = Url::parse(SHEETS_API_BASE).map_err(|err| StoreError::Backend(err.to_string()))?;
    url
      .path_segments_mut()
      .map_err(|_| StoreError::Backend("sheets base url cannot carry a path".to_string()))?
      .push(&sheet.spreadsheet_id)
      .push("values")
      .push(&format!("{}!{range}{suffix}", quote_sheet_name(&sheet.sheet_name)));
    Ok(url)
  }

  async fn send(&self, request: RequestBuilder) -> StoreResult<reqwest::Response> {
    let token = self.auth.token(&[SHEETS_SCOPE]).await?;
    let response = request.bearer_auth(token.as_str()).send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
      .map(|envelope| envelope.error.message)
      .unwrap_or(body);
    Err(StoreError::Api {
      status: status.as_u16(),
      message,
    })
  }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
  #[serde(default)]
  values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct ValuesBody {
  values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
  error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
  message: String,
}

#[async_trait]
impl SheetBackend for GoogleSheets {
  #[instrument(skip(self), fields(sheet = %sheet.sheet_name))]
  async fn read_rows(&self, sheet: &SheetRef, from_row: usize, limit: Option<usize>) -> StoreResult<Vec<Vec<String>>> {
    let range = row_range(from_row, limit);
    let url = self.values_url(sheet, &range, "")?;
    // Formatted values carry display separators ("1,000.00") that balances cannot parse.
    let request = self
      .client
      .get(url)
      .query(&[("valueRenderOption", "UNFORMATTED_VALUE")]);
    let response = self.send(request).await?;
    let body: ValueRange = response.json().await?;
    debug!(range = %range, rows = body.values.len(), "read sheet rows");
    Ok(
      body
        .values
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect(),
    )
  }

  #[instrument(skip(self, values), fields(sheet = %sheet.sheet_name))]
  async fn write_cells(&self, sheet: &SheetRef, row: usize, column: usize, values: Vec<String>) -> StoreResult<()> {
    let range = format!("{}{row}", column_letters(column));
    let url = self.values_url(sheet, &range, "")?;
    let request = self
      .client
      .put(url)
      .query(&[("valueInputOption", "RAW")])
      .json(&ValuesBody { values: vec![values] });
    self.send(request).await?;
    debug!(range = %range, "updated sheet cells");
    Ok(())
  }

  #[instrument(skip(self, values), fields(sheet = %sheet.sheet_name))]
  async fn append_row(&self, sheet: &SheetRef, values: Vec<String>) -> StoreResult<()> {
    let url = self.values_url(sheet, "A2", ":append")?;
    let request = self
      .client
      .post(url)
      .query(&[("valueInputOption", "RAW")])
      .json(&ValuesBody { values: vec![values] });
    self.send(request).await?;
    debug!("appended sheet row");
    Ok(())
  }
}

fn cell_text(value: serde_json::Value) -> String {
  match value {
    serde_json::Value::String(text) => text,
    serde_json::Value::Null => String::new(),
    other => other.to_string(),
  }
}

fn row_range(from_row: usize, limit: Option<usize>) -> String {
  match limit {
    Some(limit) => format!("A{from_row}:{LAST_COLUMN}{}", from_row + limit.saturating_sub(1)),
    None => format!("A{from_row}:{LAST_COLUMN}"),
  }
}

/// Converts a 0-based column index to A1 letters (0 -> A, 26 -> AA).
fn column_letters(column: usize) -> String {
  let mut letters = Vec::new();
  let mut remaining = column + 1;
  while remaining > 0 {
    let rem = (remaining - 1) % 26;
    letters.push(b'A' + rem as u8);
    remaining = (remaining - 1) / 26;
  }
  letters.reverse();
  String::from_utf8(letters).unwrap_or_default()
}

fn quote_sheet_name(name: &str) -> String {
  if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
    name.to_string()
  } else {
    format!("'{}'", name.replace('\'', "''"))
  }
}

#[cfg(test)]
mod tests {
  use super::cell_text;
  use super::column_letters;
  use super::quote_sheet_name;
  use super::row_range;
  use crate::util::parse_balance;

  #[test]
  fn converts_columns_to_letters() {
    assert_eq!(column_letters(0), "A");
    assert_eq!(column_letters(7), "H");
    assert_eq!(column_letters(25), "Z");
    assert_eq!(column_letters(26), "AA");
    assert_eq!(column_letters(27), "AB");
  }

  #[test]
  fn builds_row_ranges() {
    assert_eq!(row_range(1, Some(1)), "A1:Z1");
    assert_eq!(row_range(2, None), "A2:Z");
  }

  #[test]
  fn quotes_sheet_names_with_spaces() {
    assert_eq!(quote_sheet_name("Users"), "Users");
    assert_eq!(quote_sheet_name("Pay Outs"), "'Pay Outs'");
    assert_eq!(quote_sheet_name("Bob's"), "'Bob''s'");
  }

  #[test]
  fn renders_non_string_cells() {
    assert_eq!(cell_text(serde_json::json!("70")), "70");
    assert_eq!(cell_text(serde_json::json!(70)), "70");
    assert_eq!(cell_text(serde_json::Value::Null), "");
  }

  #[test]
  fn unformatted_numeric_balances_parse() {
    for (value, expected) in [(serde_json::json!(1000), "1000"), (serde_json::json!(1000.5), "1000.5")] {
      let text = cell_text(value);
      assert_eq!(text, expected);
      assert!(parse_balance(&text).is_some());
    }
  }
}
