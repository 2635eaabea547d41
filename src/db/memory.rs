use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::SheetBackend;
use super::SheetRef;
use super::StoreError;
use super::StoreResult;

type SheetKey = (String, String);

#[derive(Default)]
struct Inner {
  sheets: HashMap<SheetKey, Vec<Vec<String>>>,
  failure: Option<String>,
  append_failure: Option<String>,
}

/// Sheet backend holding rows in memory, with injectable failures.
#[derive(Default)]
pub struct MemorySheets {
  inner: Mutex<Inner>,
}

impl MemorySheets {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn seed(&self, sheet: &SheetRef, rows: Vec<Vec<String>>) {
    self.lock().sheets.insert(key(sheet), rows);
  }

  pub fn rows(&self, sheet: &SheetRef) -> Vec<Vec<String>> {
    self.lock().sheets.get(&key(sheet)).cloned().unwrap_or_default()
  }

  /// Makes every following call fail with `message`.
  pub fn fail_with(&self, message: &str) {
    self.lock().failure = Some(message.to_string());
  }

  /// Makes only appends fail with `message`.
  pub fn fail_appends_with(&self, message: &str) {
    self.lock().append_failure = Some(message.to_string());
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

fn key(sheet: &SheetRef) -> SheetKey {
  (sheet.spreadsheet_id.clone(), sheet.sheet_name.clone())
}

fn check(failure: &Option<String>) -> StoreResult<()> {
  match failure {
    Some(message) => Err(StoreError::Backend(message.clone())),
    None => Ok(()),
  }
}

#[async_trait]
impl SheetBackend for MemorySheets {
  async fn read_rows(&self, sheet: &SheetRef, from_row: usize, limit: Option<usize>) -> StoreResult<Vec<Vec<String>>> {
    let inner = self.lock();
    check(&inner.failure)?;
    let rows = inner.sheets.get(&key(sheet)).map(Vec::as_slice).unwrap_or_default();
    let start = from_row.saturating_sub(1).min(rows.len());
    let end = limit.map_or(rows.len(), |limit| (start + limit).min(rows.len()));
    Ok(rows[start .. end].to_vec())
  }

  async fn write_cells(&self, sheet: &SheetRef, row: usize, column: usize, values: Vec<String>) -> StoreResult<()> {
    let mut inner = self.lock();
    check(&inner.failure)?;
    let rows = inner.sheets.entry(key(sheet)).or_default();
    let index = row.saturating_sub(1);
    if rows.len() <= index {
      rows.resize(index + 1, Vec::new());
    }
    let target = &mut rows[index];
    let width = column + values.len();
    if target.len() < width {
      target.resize(width, String::new());
    }
    for (offset, value) in values.into_iter().enumerate() {
      target[column + offset] = value;
    }
    Ok(())
  }

  async fn append_row(&self, sheet: &SheetRef, values: Vec<String>) -> StoreResult<()> {
    let mut inner = self.lock();
    check(&inner.failure)?;
    check(&inner.append_failure)?;
    let rows = inner.sheets.entry(key(sheet)).or_default();
    while rows.last().is_some_and(|row| row.iter().all(String::is_empty)) {
      rows.pop();
    }
    rows.push(values);
    Ok(())
  }
}
