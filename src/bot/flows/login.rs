use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::bot::context::AppContext;
use crate::bot::reply::Keyboard;
use crate::bot::reply::Reply;
use crate::bot::state::Session;

pub fn prompt(session: &mut Session) -> Reply {
  session.login_pending = true;
  Reply::new("Please enter your username:", Keyboard::Remove)
}

#[instrument(skip(ctx, session))]
pub async fn handle(ctx: &AppContext, user_id: i64, session: &mut Session, username: &str) -> Reply {
  session.login_pending = false;
  match ctx.db().find_user(username).await {
    Ok(Some((record, _))) => {
      info!(user_id, username = %record.username, "user logged in");
      session.log_in(record.username);
      Reply::new(
        format!("Login successful! Welcome back, {username}."),
        Keyboard::MainMenu,
      )
    },
    Ok(None) => {
      info!(user_id, "login with unknown username");
      Reply::new("Login failed. Username not found.", Keyboard::Welcome)
    },
    Err(err) => {
      warn!(user_id, error = %err, "username lookup failed during login");
      Reply::new(format!("Login failed: {err}. Please try again."), Keyboard::Welcome)
    },
  }
}
