use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use tracing::instrument;

use crate::models::BALANCE_COLUMN;
use crate::models::PAYMENT_HEADERS;
use crate::models::PaymentRequest;
use crate::models::PaymentStatus;
use crate::models::ProfileField;
use crate::models::USER_HEADERS;
use crate::models::UserRecord;

#[cfg(test)]
pub mod memory;
pub mod sheets;

/// First data row; row 1 holds the headers.
const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("authentication failed: {0}")]
  Auth(#[from] gcp_auth::Error),
  #[error("sheets api returned {status}: {message}")]
  Api { status: u16, message: String },
  #[error("User not found")]
  UserNotFound,
  #[error("Username already exists")]
  UsernameTaken,
  #[error("stored balance {0:?} is not a number")]
  InvalidBalance(String),
  #[error("{0}")]
  Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Address of one sheet (tab) inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
  pub spreadsheet_id: String,
  pub sheet_name: String,
}

impl SheetRef {
  pub fn new(spreadsheet_id: impl Into<String>, sheet_name: impl Into<String>) -> Self {
    Self {
      spreadsheet_id: spreadsheet_id.into(),
      sheet_name: sheet_name.into(),
    }
  }
}

/// Row/column access to a remote sheet. Rows are 1-based, columns 0-based.
#[async_trait]
pub trait SheetBackend: Send + Sync {
  /// Reads `limit` rows starting at `from_row`, or every remaining row when
  /// `limit` is `None`. Trailing empty rows may be omitted.
  async fn read_rows(&self, sheet: &SheetRef, from_row: usize, limit: Option<usize>) -> StoreResult<Vec<Vec<String>>>;

  /// Writes `values` left to right starting at (`row`, `column`).
  async fn write_cells(&self, sheet: &SheetRef, row: usize, column: usize, values: Vec<String>) -> StoreResult<()>;

  /// Appends one row after the last non-empty row.
  async fn append_row(&self, sheet: &SheetRef, values: Vec<String>) -> StoreResult<()>;
}

/// Record access over the Users and Payments tables.
///
/// Every operation makes at most one attempt per remote call. The existence
/// check in [`Db::insert_user`] and the append/deduct pair used by
/// withdrawals are separate calls and are not transactional.
#[derive(Clone)]
pub struct Db {
  backend: Arc<dyn SheetBackend>,
  users: SheetRef,
  payments: SheetRef,
}

impl Db {
  pub fn new(backend: Arc<dyn SheetBackend>, users: SheetRef, payments: SheetRef) -> Self {
    Self {
      backend,
      users,
      payments,
    }
  }

  /// Rewrites the header row when it is missing or differs from `headers`.
  #[instrument(skip(self, headers))]
  pub async fn ensure_headers(&self, sheet: &SheetRef, headers: &[&str]) -> StoreResult<()> {
    let first = self.backend.read_rows(sheet, 1, Some(1)).await?;
    let current = first.into_iter().next().unwrap_or_default();
    if current.iter().map(String::as_str).eq(headers.iter().copied()) {
      return Ok(());
    }
    info!(sheet = %sheet.sheet_name, "writing missing header row");
    let values = headers.iter().map(|header| header.to_string()).collect();
    self.backend.write_cells(sheet, 1, 0, values).await
  }

  /// Case-sensitive lookup; returns the record and its 1-based row.
  #[instrument(skip(self))]
  pub async fn find_user(&self, username: &str) -> StoreResult<Option<(UserRecord, usize)>> {
    self.ensure_headers(&self.users, &USER_HEADERS).await?;
    let rows = self.backend.read_rows(&self.users, FIRST_DATA_ROW, None).await?;
    Ok(
      rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.first().is_some_and(|cell| cell == username))
        .map(|(offset, row)| (UserRecord::from_row(row), FIRST_DATA_ROW + offset)),
    )
  }

  #[instrument(skip(self, record), fields(username = %record.username))]
  pub async fn insert_user(&self, record: &UserRecord) -> StoreResult<()> {
    if self.find_user(&record.username).await?.is_some() {
      return Err(StoreError::UsernameTaken);
    }
    self.backend.append_row(&self.users, record.to_row()).await?;
    info!("user row appended");
    Ok(())
  }

  #[instrument(skip(self, value))]
  pub async fn update_user_field(&self, username: &str, field: ProfileField, value: &str) -> StoreResult<()> {
    let (_, row) = self.find_user(username).await?.ok_or(StoreError::UserNotFound)?;
    self
      .backend
      .write_cells(&self.users, row, field.column(), vec![value.to_string()])
      .await
  }

  #[instrument(skip(self))]
  pub async fn update_balance(&self, username: &str, balance: Decimal) -> StoreResult<()> {
    let (_, row) = self.find_user(username).await?.ok_or(StoreError::UserNotFound)?;
    self
      .backend
      .write_cells(&self.users, row, BALANCE_COLUMN, vec![balance.to_string()])
      .await
  }

  /// Raw balance text; "0" when the user or the cell is missing.
  #[instrument(skip(self))]
  pub async fn balance(&self, username: &str) -> StoreResult<String> {
    Ok(
      self
        .find_user(username)
        .await?
        .map(|(record, _)| record.balance)
        .unwrap_or_else(|| "0".to_string()),
    )
  }

  /// Stamps the request with the current local time and `Pending` status.
  #[instrument(skip(self, request), fields(username = %request.username, amount = %request.amount))]
  pub async fn append_payment_request(&self, request: &PaymentRequest) -> StoreResult<()> {
    self.ensure_headers(&self.payments, &PAYMENT_HEADERS).await?;
    let requested_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let row = request.to_row(&requested_at, PaymentStatus::Pending);
    self.backend.append_row(&self.payments, row).await?;
    info!("payment request appended");
    Ok(())
  }
}
