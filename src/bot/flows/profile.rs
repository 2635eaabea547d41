use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::bot::context::AppContext;
use crate::bot::flows::menu;
use crate::bot::reply::Keyboard;
use crate::bot::reply::Reply;
use crate::bot::state::ProfileUpdate;
use crate::bot::state::Session;
use crate::models::PaymentMode;
use crate::models::ProfileField;

pub const BACK_TO_MAIN_MENU: &str = "Back to Main Menu";

pub fn start(session: &mut Session) -> Reply {
  if !session.logged_in {
    return Reply::new("You need to be logged in to update your profile.", Keyboard::Welcome);
  }
  session.profile_update = Some(ProfileUpdate::SelectingField);
  Reply::new("Which part of your profile would you like to update?", Keyboard::ProfileFields)
}

#[instrument(skip(ctx, session, text))]
pub async fn handle(ctx: &AppContext, user_id: i64, session: &mut Session, step: ProfileUpdate, text: &str) -> Reply {
  match step {
    ProfileUpdate::SelectingField => {
      if text == BACK_TO_MAIN_MENU {
        session.profile_update = None;
        return menu::main_menu(session);
      }
      match ProfileField::from_menu_label(text) {
        Some(ProfileField::PreferredPaymentMode) => {
          session.profile_update = Some(ProfileUpdate::UpdatingPaymentMode);
          Reply::new("Please select your new preferred payment mode:", Keyboard::PaymentMode)
        },
        Some(field) => {
          session.profile_update = Some(ProfileUpdate::UpdatingField(field));
          Reply::new(format!("Please enter your new {}:", field.menu_label()), Keyboard::Remove)
        },
        None => Reply::new("Please select a valid field to update:", Keyboard::ProfileFields),
      }
    },
    ProfileUpdate::UpdatingPaymentMode => {
      let Some(mode) = PaymentMode::from_label(text) else {
        return Reply::new("Please select a valid payment mode:", Keyboard::PaymentMode);
      };
      let success = format!(
        "Your payment mode has been updated to {}.\n\nYou may also want to update your UPI ID or Bank Account details.",
        mode.label()
      );
      save(ctx, user_id, session, ProfileField::PreferredPaymentMode, mode.label(), success).await
    },
    ProfileUpdate::UpdatingField(field) => {
      let success = "Your profile has been updated successfully.".to_string();
      save(ctx, user_id, session, field, text, success).await
    },
  }
}

async fn save(
  ctx: &AppContext,
  user_id: i64,
  session: &mut Session,
  field: ProfileField,
  value: &str,
  success: String,
) -> Reply {
  session.profile_update = None;
  let Some(username) = session.active_username() else {
    return Reply::new("You need to be logged in to update your profile.", Keyboard::Welcome);
  };
  match ctx.db().update_user_field(username, field, value).await {
    Ok(()) => {
      info!(user_id, ?field, "profile field updated");
      Reply::new(success, Keyboard::MainMenu)
    },
    Err(err) => {
      warn!(user_id, ?field, error = %err, "profile update failed");
      Reply::new(format!("Failed to update profile: {err}"), Keyboard::MainMenu)
    },
  }
}
