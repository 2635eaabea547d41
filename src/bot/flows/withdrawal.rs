use rust_decimal::Decimal;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::bot::context::AppContext;
use crate::bot::reply::Keyboard;
use crate::bot::reply::Reply;
use crate::bot::state::Session;
use crate::bot::state::Withdrawal;
use crate::db::StoreError;
use crate::models::PaymentMode;
use crate::models::PaymentRequest;
use crate::models::UserRecord;
use crate::util::AmountError;
use crate::util::format_rupees;
use crate::util::parse_amount;
use crate::util::parse_balance;

/// Where the money should go, as chosen during the flow.
enum Payout {
  Preferred,
  Upi { upi_id: String },
  Bank { account: String, ifsc_code: String },
}

pub fn start(session: &mut Session) -> Reply {
  if session.active_username().is_none() {
    return Reply::new("You need to be logged in to withdraw funds.", Keyboard::Welcome);
  }
  session.withdrawal = Some(Withdrawal::AwaitingAmount);
  Reply::new("Please enter the amount you wish to withdraw:", Keyboard::Remove)
}

#[instrument(skip(ctx, session, text))]
pub async fn handle(ctx: &AppContext, user_id: i64, session: &mut Session, step: Withdrawal, text: &str) -> Reply {
  let Some(username) = session.active_username().map(str::to_string) else {
    session.withdrawal = None;
    return Reply::new("You need to be logged in to withdraw funds.", Keyboard::Welcome);
  };

  match step {
    Withdrawal::AwaitingAmount => {
      let amount = match parse_amount(text) {
        Ok(amount) => amount,
        Err(AmountError::NotPositive) => return Reply::text("Please enter a positive amount:"),
        Err(AmountError::InvalidFormat) => return Reply::text("Please enter a valid number:"),
      };
      let record = match load_profile(ctx, user_id, session, &username).await {
        Ok(record) => record,
        Err(reply) => return reply,
      };
      let Some(balance) = parse_balance(&record.balance) else {
        session.withdrawal = None;
        warn!(user_id, balance = %record.balance, "stored balance is not a number");
        return Reply::new(
          "Failed to process withdrawal: your stored balance is invalid.",
          Keyboard::MainMenu,
        );
      };
      if amount > balance {
        session.withdrawal = None;
        info!(user_id, %amount, %balance, "withdrawal exceeds balance");
        return Reply::new(
          format!("Insufficient balance. Your current balance is: {}", format_rupees(balance)),
          Keyboard::MainMenu,
        );
      }
      session.withdrawal = Some(Withdrawal::AwaitingModeConfirmation { amount });
      Reply::new(
        format!(
          "Your default payment mode is: {}\nWould you like to use this payment mode?",
          mode_name(record.payment_mode)
        ),
        Keyboard::YesNo,
      )
    },
    Withdrawal::AwaitingModeConfirmation { amount } => {
      if !text.eq_ignore_ascii_case("yes") {
        return ask_for_mode(session, amount, "Please select your preferred payment mode for this withdrawal:");
      }
      let record = match load_profile(ctx, user_id, session, &username).await {
        Ok(record) => record,
        Err(reply) => return reply,
      };
      if record.payment_mode == PaymentMode::Unset {
        return ask_for_mode(
          session,
          amount,
          "You have no default payment mode. Please select one for this withdrawal:",
        );
      }
      commit(ctx, user_id, session, record, amount, Payout::Preferred).await
    },
    Withdrawal::AwaitingNewMode { amount } => match PaymentMode::from_label(text) {
      Some(PaymentMode::Upi) => {
        session.withdrawal = Some(Withdrawal::AwaitingUpiId { amount });
        Reply::new("Please enter your UPI ID:", Keyboard::Remove)
      },
      Some(PaymentMode::BankAccount) => {
        session.withdrawal = Some(Withdrawal::AwaitingBankAccount { amount });
        Reply::new("Please enter your Bank Account Number:", Keyboard::Remove)
      },
      _ => Reply::new("Please select a valid payment mode:", Keyboard::PaymentMode),
    },
    Withdrawal::AwaitingUpiId { amount } => {
      let record = match load_profile(ctx, user_id, session, &username).await {
        Ok(record) => record,
        Err(reply) => return reply,
      };
      let payout = Payout::Upi {
        upi_id: text.to_string(),
      };
      commit(ctx, user_id, session, record, amount, payout).await
    },
    Withdrawal::AwaitingBankAccount { amount } => {
      session.withdrawal = Some(Withdrawal::AwaitingIfscCode {
        amount,
        bank_account: text.to_string(),
      });
      Reply::text("Please enter your IFSC Code:")
    },
    Withdrawal::AwaitingIfscCode { amount, bank_account } => {
      let record = match load_profile(ctx, user_id, session, &username).await {
        Ok(record) => record,
        Err(reply) => return reply,
      };
      let payout = Payout::Bank {
        account: bank_account,
        ifsc_code: text.to_string(),
      };
      commit(ctx, user_id, session, record, amount, payout).await
    },
  }
}

fn ask_for_mode(session: &mut Session, amount: Decimal, prompt: &str) -> Reply {
  session.withdrawal = Some(Withdrawal::AwaitingNewMode { amount });
  Reply::new(prompt, Keyboard::PaymentMode)
}

fn mode_name(mode: PaymentMode) -> &'static str {
  match mode {
    PaymentMode::Unset => "Not set",
    other => other.label(),
  }
}

/// Fetches the user's row, ending the flow when it cannot be read.
async fn load_profile(ctx: &AppContext, user_id: i64, session: &mut Session, username: &str) -> Result<UserRecord, Reply> {
  match ctx.db().find_user(username).await {
    Ok(Some((record, _))) => Ok(record),
    Ok(None) => {
      session.withdrawal = None;
      session.log_out();
      warn!(user_id, username, "logged-in user missing from store");
      Err(Reply::new(
        "Your account could not be found. Please login again.",
        Keyboard::Welcome,
      ))
    },
    Err(err) => {
      session.withdrawal = None;
      warn!(user_id, error = %err, "profile lookup failed during withdrawal");
      Err(Reply::new(
        format!("Failed to process withdrawal: {err}"),
        Keyboard::MainMenu,
      ))
    },
  }
}

fn build_request(record: &UserRecord, amount: Decimal, payout: Payout) -> PaymentRequest {
  let (payment_mode, destination, ifsc_code) = match payout {
    Payout::Preferred => match record.payment_mode {
      PaymentMode::Upi => (PaymentMode::Upi, record.upi_id.clone(), String::new()),
      mode => (mode, record.bank_account.clone(), record.ifsc_code.clone()),
    },
    Payout::Upi { upi_id } => {
      let upi_id = if upi_id.trim().is_empty() {
        record.upi_id.clone()
      } else {
        upi_id
      };
      (PaymentMode::Upi, upi_id, String::new())
    },
    Payout::Bank { account, ifsc_code } => {
      if account.trim().is_empty() || ifsc_code.trim().is_empty() {
        (PaymentMode::BankAccount, record.bank_account.clone(), record.ifsc_code.clone())
      } else {
        (PaymentMode::BankAccount, account, ifsc_code)
      }
    },
  };
  PaymentRequest {
    username: record.username.clone(),
    amount,
    payment_mode,
    destination,
    ifsc_code,
  }
}

/// Records the request, then deducts the amount from a freshly read balance.
/// The two writes are independent; a failed deduction is logged, not undone.
async fn commit(
  ctx: &AppContext,
  user_id: i64,
  session: &mut Session,
  record: UserRecord,
  amount: Decimal,
  payout: Payout,
) -> Reply {
  session.withdrawal = None;
  let request = build_request(&record, amount, payout);
  if let Err(err) = ctx.db().append_payment_request(&request).await {
    warn!(user_id, error = %err, "payment request was not recorded");
    return Reply::new(format!("Failed to process withdrawal: {err}"), Keyboard::MainMenu);
  }
  info!(user_id, username = %record.username, %amount, mode = request.payment_mode.label(), "payment request recorded");

  if let Err(err) = deduct(ctx, &record.username, amount).await {
    warn!(user_id, error = %err, "balance deduction failed after recording payment request");
  }

  let settings = ctx.settings();
  Reply::new(
    format!(
      "Your payment request for {} has been received. It will be processed on {}.\n\nPlease forward a screenshot of this chat to @{} for reference.",
      format_rupees(amount),
      settings.payment_date,
      settings.invoice_bot_username
    ),
    Keyboard::MainMenu,
  )
}

async fn deduct(ctx: &AppContext, username: &str, amount: Decimal) -> Result<(), StoreError> {
  let raw = ctx.db().balance(username).await?;
  let current = parse_balance(&raw).ok_or(StoreError::InvalidBalance(raw))?;
  ctx.db().update_balance(username, current - amount).await
}
