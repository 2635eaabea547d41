use teloxide::types::KeyboardButton;
use teloxide::types::KeyboardMarkup;
use teloxide::types::KeyboardRemove;
use teloxide::types::ReplyMarkup;

pub const WELCOME_TEXT: &str = "Welcome to the Employee Payment System!\nChoose an option:\n1. Signup\n2. Login";
pub const MAIN_MENU_TEXT: &str =
  "Main Menu:\n1. Check Balance\n2. Withdraw Funds\n3. Join Channel\n4. Update Profile";

/// Keyboard to show alongside a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
  /// Leave whatever keyboard the user has.
  Keep,
  /// Hide the keyboard for a free-text answer.
  Remove,
  Welcome,
  MainMenu,
  PaymentMode,
  YesNo,
  ProfileFields,
}

impl Keyboard {
  /// Button labels by row for choice keyboards.
  pub fn rows(self) -> Option<Vec<Vec<&'static str>>> {
    let rows = match self {
      Self::Keep | Self::Remove => return None,
      Self::Welcome => vec![vec!["1. Signup", "2. Login"]],
      Self::MainMenu => vec![
        vec!["1. Check Balance"],
        vec!["2. Withdraw Funds"],
        vec!["3. Join Channel"],
        vec!["4. Update Profile"],
        vec!["Logout"],
      ],
      Self::PaymentMode => vec![vec!["UPI", "Bank Account"]],
      Self::YesNo => vec![vec!["Yes", "No"]],
      Self::ProfileFields => vec![
        vec!["First Name", "Last Name"],
        vec!["Payment Mode", "UPI ID"],
        vec!["Bank Account", "IFSC Code"],
        vec!["Back to Main Menu"],
      ],
    };
    Some(rows)
  }

  pub fn markup(self) -> Option<ReplyMarkup> {
    if self == Self::Remove {
      return Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new()));
    }
    let rows = self.rows()?;
    let buttons = rows
      .into_iter()
      .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
      .collect::<Vec<_>>();
    Some(ReplyMarkup::Keyboard(
      KeyboardMarkup::new(buttons).resize_keyboard().one_time_keyboard(),
    ))
  }
}

/// One outbound message produced by a conversational turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
  pub text: String,
  pub keyboard: Keyboard,
}

impl Reply {
  pub fn new(text: impl Into<String>, keyboard: Keyboard) -> Self {
    Self {
      text: text.into(),
      keyboard,
    }
  }

  /// Text reply that keeps the current keyboard.
  pub fn text(text: impl Into<String>) -> Self {
    Self::new(text, Keyboard::Keep)
  }

  pub fn welcome() -> Self {
    Self::new(WELCOME_TEXT, Keyboard::Welcome)
  }

  pub fn main_menu() -> Self {
    Self::new(MAIN_MENU_TEXT, Keyboard::MainMenu)
  }
}

#[cfg(test)]
mod tests {
  use super::Keyboard;

  #[test]
  fn free_text_keyboards_have_no_buttons() {
    assert!(Keyboard::Keep.rows().is_none());
    assert!(Keyboard::Remove.rows().is_none());
    assert!(Keyboard::Keep.markup().is_none());
    assert!(Keyboard::Remove.markup().is_some());
  }

  #[test]
  fn main_menu_ends_with_logout() {
    let rows = Keyboard::MainMenu.rows().unwrap_or_default();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows.last().map(Vec::as_slice), Some(&["Logout"][..]));
  }

  #[test]
  fn profile_keyboard_offers_every_field() {
    let labels: Vec<&str> = Keyboard::ProfileFields.rows().unwrap_or_default().concat();
    for field in crate::models::ProfileField::ALL {
      assert!(labels.contains(&field.menu_label()));
    }
    assert!(labels.contains(&"Back to Main Menu"));
  }
}
