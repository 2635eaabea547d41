use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::bot::context::AppContext;
use crate::bot::reply::Keyboard;
use crate::bot::reply::Reply;
use crate::bot::state::Applicant;
use crate::bot::state::Registration;
use crate::bot::state::Session;
use crate::models::PaymentMode;
use crate::models::UserRecord;

pub fn start(session: &mut Session) -> Reply {
  session.registration = Some(Registration::AwaitingUsername);
  Reply::new("Please enter your desired username:", Keyboard::Remove)
}

#[instrument(skip(ctx, session, text))]
pub async fn handle(ctx: &AppContext, user_id: i64, session: &mut Session, step: Registration, text: &str) -> Reply {
  match step {
    Registration::AwaitingUsername => match ctx.db().find_user(text).await {
      Ok(Some(_)) => Reply::text("This username already exists. Please choose another username:"),
      Ok(None) => {
        session.registration = Some(Registration::AwaitingFirstName {
          username: text.to_string(),
        });
        Reply::text("Please enter your first name:")
      },
      Err(err) => {
        warn!(user_id, error = %err, "username lookup failed during registration");
        session.registration = None;
        Reply::new(
          format!("Registration failed: {err}. Please try again."),
          Keyboard::Welcome,
        )
      },
    },
    Registration::AwaitingFirstName { username } => {
      session.registration = Some(Registration::AwaitingLastName {
        username,
        first_name: text.to_string(),
      });
      Reply::text("Please enter your last name:")
    },
    Registration::AwaitingLastName { username, first_name } => {
      session.registration = Some(Registration::AwaitingPaymentMode(Applicant {
        username,
        first_name,
        last_name: text.to_string(),
      }));
      Reply::new("Please select your preferred payment mode:", Keyboard::PaymentMode)
    },
    Registration::AwaitingPaymentMode(applicant) => match PaymentMode::from_label(text) {
      Some(PaymentMode::Upi) => {
        session.registration = Some(Registration::AwaitingUpiId(applicant));
        Reply::new("Please enter your UPI ID:", Keyboard::Remove)
      },
      Some(PaymentMode::BankAccount) => {
        session.registration = Some(Registration::AwaitingBankAccount(applicant));
        Reply::new("Please enter your Bank Account Number:", Keyboard::Remove)
      },
      _ => Reply::new("Please select a valid payment mode:", Keyboard::PaymentMode),
    },
    Registration::AwaitingUpiId(applicant) => {
      let record = applicant.into_record(PaymentMode::Upi, text.to_string(), String::new(), String::new());
      confirm(session, record)
    },
    Registration::AwaitingBankAccount(applicant) => {
      session.registration = Some(Registration::AwaitingIfscCode {
        applicant,
        bank_account: text.to_string(),
      });
      Reply::text("Please enter your IFSC Code:")
    },
    Registration::AwaitingIfscCode { applicant, bank_account } => {
      let record = applicant.into_record(PaymentMode::BankAccount, String::new(), bank_account, text.to_string());
      confirm(session, record)
    },
    Registration::AwaitingConfirmation(record) => {
      if !text.eq_ignore_ascii_case("yes") {
        session.registration = None;
        info!(user_id, "registration cancelled");
        return Reply::new(
          "Registration cancelled. Please start again if you wish to register.",
          Keyboard::Welcome,
        );
      }
      session.registration = None;
      match ctx.db().insert_user(&record).await {
        Ok(()) => {
          info!(user_id, username = %record.username, "user registered");
          let reply = Reply::new(
            format!("Registration successful! You are now logged in as {}.", record.username),
            Keyboard::MainMenu,
          );
          session.log_in(record.username);
          reply
        },
        Err(err) => {
          warn!(user_id, error = %err, "registration failed");
          Reply::new(
            format!("Registration failed: {err}. Please try again."),
            Keyboard::Welcome,
          )
        },
      }
    },
  }
}

fn confirm(session: &mut Session, record: UserRecord) -> Reply {
  let summary = summary(&record);
  session.registration = Some(Registration::AwaitingConfirmation(record));
  Reply::new(format!("{summary}\n\nIs this correct?"), Keyboard::YesNo)
}

fn summary(record: &UserRecord) -> String {
  let mut lines = vec![
    "Please confirm your details:".to_string(),
    format!("Username: {}", record.username),
    format!("Name: {} {}", record.first_name, record.last_name),
    format!("Payment Mode: {}", record.payment_mode.label()),
  ];
  match record.payment_mode {
    PaymentMode::Upi => lines.push(format!("UPI ID: {}", record.upi_id)),
    PaymentMode::BankAccount => {
      lines.push(format!("Bank Account: {}", record.bank_account));
      lines.push(format!("IFSC Code: {}", record.ifsc_code));
    },
    PaymentMode::Unset => {},
  }
  lines.join("\n")
}

#[cfg(test)]
mod tests {
  use super::handle;
  use super::start;
  use crate::bot::flows::testing;
  use crate::bot::reply::Keyboard;
  use crate::bot::state::Registration;
  use crate::bot::state::Session;
  use crate::models::PaymentMode;

  async fn drive(ctx: &crate::bot::context::AppContext, session: &mut Session, inputs: &[&str]) -> String {
    let mut last = String::new();
    for input in inputs {
      let step = session.registration.clone().expect("registration in progress");
      last = handle(ctx, 1, session, step, input).await.text;
    }
    last
  }

  #[tokio::test]
  async fn bank_registration_commits_all_details() {
    let (backend, ctx) = testing::context();
    let mut session = Session::default();
    start(&mut session);

    let summary = drive(&ctx, &mut session, &["bob", "Bob", "Ray", "Bank Account", "12345", "IFSC0001"]).await;
    assert!(summary.contains("Bank Account: 12345"));
    assert!(summary.contains("IFSC Code: IFSC0001"));

    let step = session.registration.clone().expect("awaiting confirmation");
    let reply = handle(&ctx, 1, &mut session, step, "YES").await;
    assert_eq!(reply.keyboard, Keyboard::MainMenu);
    assert!(session.registration.is_none());
    assert_eq!(session.active_username(), Some("bob"));

    let rows = backend.rows(&testing::users());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], ["bob", "Bob", "Ray", "Bank Account", "", "12345", "IFSC0001", "0"]);
  }

  #[tokio::test]
  async fn duplicate_username_stays_at_prompt() {
    let (backend, ctx) = testing::context();
    testing::seed_user(&backend, "alice", "100", PaymentMode::Upi);
    let mut session = Session::default();
    start(&mut session);

    let reply = drive(&ctx, &mut session, &["alice"]).await;
    assert!(reply.contains("already exists"));
    assert_eq!(session.registration, Some(Registration::AwaitingUsername));
    assert_eq!(backend.rows(&testing::users()).len(), 2);
  }

  #[tokio::test]
  async fn invalid_payment_mode_reprompts() {
    let (_, ctx) = testing::context();
    let mut session = Session::default();
    start(&mut session);
    drive(&ctx, &mut session, &["carol", "Carol", "Diaz"]).await;

    let step = session.registration.clone().expect("awaiting payment mode");
    let reply = handle(&ctx, 1, &mut session, step.clone(), "upi").await;
    assert_eq!(reply.keyboard, Keyboard::PaymentMode);
    assert_eq!(session.registration, Some(step));
  }

  #[tokio::test]
  async fn declining_confirmation_inserts_nothing() {
    let (backend, ctx) = testing::context();
    let mut session = Session::default();
    start(&mut session);
    drive(&ctx, &mut session, &["dave", "Dave", "Eck", "UPI", "dave@upi"]).await;

    let step = session.registration.clone().expect("awaiting confirmation");
    let reply = handle(&ctx, 1, &mut session, step, "No").await;
    assert_eq!(reply.keyboard, Keyboard::Welcome);
    assert!(session.registration.is_none());
    assert!(!session.logged_in);
    assert_eq!(backend.rows(&testing::users()).len(), 1);
  }

  #[tokio::test]
  async fn store_failure_on_commit_returns_to_welcome() {
    let (backend, ctx) = testing::context();
    let mut session = Session::default();
    start(&mut session);
    drive(&ctx, &mut session, &["erin", "Erin", "Fox", "UPI", "erin@upi"]).await;
    backend.fail_appends_with("quota exceeded");

    let step = session.registration.clone().expect("awaiting confirmation");
    let reply = handle(&ctx, 1, &mut session, step, "yes").await;
    assert_eq!(reply.text, "Registration failed: quota exceeded. Please try again.");
    assert_eq!(reply.keyboard, Keyboard::Welcome);
    assert!(session.registration.is_none());
    assert!(!session.logged_in);
  }
}
