use tracing::instrument;
use tracing::warn;

use crate::bot::context::AppContext;
use crate::bot::reply::Keyboard;
use crate::bot::reply::Reply;
use crate::bot::state::Session;
use crate::util::format_rupees;

pub fn main_menu(session: &Session) -> Reply {
  if !session.logged_in {
    return Reply::new("You need to login first.", Keyboard::Welcome);
  }
  Reply::main_menu()
}

#[instrument(skip(ctx, session))]
pub async fn check_balance(ctx: &AppContext, user_id: i64, session: &Session) -> Reply {
  let Some(username) = session.active_username() else {
    return Reply::new("You need to be logged in to check your balance.", Keyboard::Welcome);
  };
  match ctx.db().balance(username).await {
    Ok(balance) => Reply::new(
      format!("Your current balance is: {}", format_rupees(balance)),
      Keyboard::MainMenu,
    ),
    Err(err) => {
      warn!(user_id, error = %err, "balance lookup failed");
      Reply::new(
        format!("Could not fetch your balance: {err}. Please try again."),
        Keyboard::MainMenu,
      )
    },
  }
}

pub fn join_channel(ctx: &AppContext, session: &Session) -> Reply {
  if !session.logged_in {
    return Reply::new("You need to be logged in to join the channel.", Keyboard::Welcome);
  }
  Reply::new(
    format!(
      "To join our channel, please click this link: {}\nThis is where we share important announcements and updates.",
      ctx.settings().channel_link
    ),
    Keyboard::MainMenu,
  )
}

pub fn logged_out() -> Reply {
  Reply::new("You have been logged out. Type /start to begin again.", Keyboard::Remove)
}

pub fn not_understood(session: &Session) -> Reply {
  let keyboard = if session.logged_in {
    Keyboard::MainMenu
  } else {
    Keyboard::Welcome
  };
  Reply::new("I didn't understand that. Please use the menu options.", keyboard)
}
