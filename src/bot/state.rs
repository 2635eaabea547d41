use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

use crate::models::PaymentMode;
use crate::models::ProfileField;
use crate::models::UserRecord;

/// Transient per-user conversation state.
///
/// Each flow keeps its own answers inside its step, so finishing or
/// abandoning one flow never leaks data into another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Session {
  pub username: Option<String>,
  pub logged_in: bool,
  pub registration: Option<Registration>,
  pub login_pending: bool,
  pub withdrawal: Option<Withdrawal>,
  pub profile_update: Option<ProfileUpdate>,
}

impl Session {
  /// Username of a logged-in user.
  pub fn active_username(&self) -> Option<&str> {
    self.username.as_deref().filter(|_| self.logged_in)
  }

  pub fn log_in(&mut self, username: String) {
    self.username = Some(username);
    self.logged_in = true;
  }

  /// Drops the login but keeps the session itself.
  pub fn log_out(&mut self) {
    self.username = None;
    self.logged_in = false;
  }
}

/// Name details collected before the payment mode is chosen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Applicant {
  pub username: String,
  pub first_name: String,
  pub last_name: String,
}

impl Applicant {
  pub fn into_record(self, payment_mode: PaymentMode, upi_id: String, bank_account: String, ifsc_code: String) -> UserRecord {
    UserRecord {
      username: self.username,
      first_name: self.first_name,
      last_name: self.last_name,
      payment_mode,
      upi_id,
      bank_account,
      ifsc_code,
      balance: "0".to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "step", content = "data")]
pub enum Registration {
  AwaitingUsername,
  AwaitingFirstName { username: String },
  AwaitingLastName { username: String, first_name: String },
  AwaitingPaymentMode(Applicant),
  AwaitingUpiId(Applicant),
  AwaitingBankAccount(Applicant),
  AwaitingIfscCode { applicant: Applicant, bank_account: String },
  AwaitingConfirmation(UserRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "step", content = "data")]
pub enum Withdrawal {
  AwaitingAmount,
  AwaitingModeConfirmation { amount: Decimal },
  AwaitingNewMode { amount: Decimal },
  AwaitingUpiId { amount: Decimal },
  AwaitingBankAccount { amount: Decimal },
  AwaitingIfscCode { amount: Decimal, bank_account: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "step", content = "data")]
pub enum ProfileUpdate {
  SelectingField,
  UpdatingPaymentMode,
  UpdatingField(ProfileField),
}

#[cfg(test)]
mod tests {
  use super::Applicant;
  use super::Session;
  use crate::models::PaymentMode;

  #[test]
  fn new_session_is_logged_out_and_idle() {
    let session = Session::default();
    assert!(!session.logged_in);
    assert!(session.active_username().is_none());
    assert!(session.registration.is_none());
    assert!(session.withdrawal.is_none());
    assert!(session.profile_update.is_none());
  }

  #[test]
  fn username_is_hidden_until_logged_in() {
    let mut session = Session {
      username: Some("alice".to_string()),
      ..Session::default()
    };
    assert!(session.active_username().is_none());
    session.log_in("alice".to_string());
    assert_eq!(session.active_username(), Some("alice"));

    session.log_out();
    assert!(!session.logged_in);
    assert!(session.username.is_none());
  }

  #[test]
  fn new_records_start_with_zero_balance() {
    let applicant = Applicant {
      username: "alice".to_string(),
      first_name: "Alice".to_string(),
      last_name: "Lee".to_string(),
    };
    let record = applicant.into_record(PaymentMode::Upi, "alice@upi".to_string(), String::new(), String::new());
    assert_eq!(record.balance, "0");
    assert_eq!(record.payment_mode, PaymentMode::Upi);
  }
}
