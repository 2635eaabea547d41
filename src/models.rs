use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

pub const USER_HEADERS: [&str; 8] = [
  "Username",
  "First Name",
  "Last Name",
  "Preferred Payment Mode",
  "UPI ID",
  "Bank Account",
  "IFSC Code",
  "Balance",
];

pub const PAYMENT_HEADERS: [&str; 7] = [
  "Username",
  "Amount",
  "Payment Mode",
  "UPI ID/Bank Account",
  "IFSC Code",
  "Request Date",
  "Status",
];

/// Zero-based column of the balance cell in the Users table.
pub const BALANCE_COLUMN: usize = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentMode {
  Upi,
  BankAccount,
  #[default]
  Unset,
}

impl PaymentMode {
  /// Matches the exact labels offered on the payment mode keyboard.
  pub fn from_label(label: &str) -> Option<Self> {
    match label {
      "UPI" => Some(Self::Upi),
      "Bank Account" => Some(Self::BankAccount),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Upi => "UPI",
      Self::BankAccount => "Bank Account",
      Self::Unset => "",
    }
  }

  fn from_cell(cell: &str) -> Self {
    Self::from_label(cell.trim()).unwrap_or_default()
  }
}

/// Editable columns of a user row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProfileField {
  FirstName,
  LastName,
  PreferredPaymentMode,
  UpiId,
  BankAccount,
  IfscCode,
}

impl ProfileField {
  pub const ALL: [Self; 6] = [
    Self::FirstName,
    Self::LastName,
    Self::PreferredPaymentMode,
    Self::UpiId,
    Self::BankAccount,
    Self::IfscCode,
  ];

  pub fn from_menu_label(label: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|field| field.menu_label() == label)
  }

  pub fn menu_label(self) -> &'static str {
    match self {
      Self::FirstName => "First Name",
      Self::LastName => "Last Name",
      Self::PreferredPaymentMode => "Payment Mode",
      Self::UpiId => "UPI ID",
      Self::BankAccount => "Bank Account",
      Self::IfscCode => "IFSC Code",
    }
  }

  /// Zero-based column in the Users table.
  pub fn column(self) -> usize {
    match self {
      Self::FirstName => 1,
      Self::LastName => 2,
      Self::PreferredPaymentMode => 3,
      Self::UpiId => 4,
      Self::BankAccount => 5,
      Self::IfscCode => 6,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
  pub username: String,
  pub first_name: String,
  pub last_name: String,
  pub payment_mode: PaymentMode,
  pub upi_id: String,
  pub bank_account: String,
  pub ifsc_code: String,
  pub balance: String,
}

impl UserRecord {
  /// Builds a record from a sheet row. Short rows are padded with blanks and a
  /// missing balance reads as "0".
  pub fn from_row(row: &[String]) -> Self {
    let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
    let balance = row
      .get(BALANCE_COLUMN)
      .filter(|value| !value.trim().is_empty())
      .cloned()
      .unwrap_or_else(|| "0".to_string());
    Self {
      username: cell(0),
      first_name: cell(1),
      last_name: cell(2),
      payment_mode: PaymentMode::from_cell(&cell(3)),
      upi_id: cell(4),
      bank_account: cell(5),
      ifsc_code: cell(6),
      balance,
    }
  }

  pub fn to_row(&self) -> Vec<String> {
    vec![
      self.username.clone(),
      self.first_name.clone(),
      self.last_name.clone(),
      self.payment_mode.label().to_string(),
      self.upi_id.clone(),
      self.bank_account.clone(),
      self.ifsc_code.clone(),
      self.balance.clone(),
    ]
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
  Pending,
}

impl PaymentStatus {
  pub fn label(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
    }
  }
}

/// A withdrawal request before the store stamps its date and status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentRequest {
  pub username: String,
  pub amount: Decimal,
  pub payment_mode: PaymentMode,
  /// UPI id or bank account number, depending on the mode.
  pub destination: String,
  pub ifsc_code: String,
}

impl PaymentRequest {
  pub fn to_row(&self, requested_at: &str, status: PaymentStatus) -> Vec<String> {
    vec![
      self.username.clone(),
      self.amount.to_string(),
      self.payment_mode.label().to_string(),
      self.destination.clone(),
      self.ifsc_code.clone(),
      requested_at.to_string(),
      status.label().to_string(),
    ]
  }
}
