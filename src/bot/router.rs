use tracing::debug;
use tracing::info;
use tracing::instrument;

use crate::bot::context::AppContext;
use crate::bot::flows::login;
use crate::bot::flows::menu;
use crate::bot::flows::profile;
use crate::bot::flows::registration;
use crate::bot::flows::withdrawal;
use crate::bot::reply::Reply;
use crate::bot::state::ProfileUpdate;
use crate::bot::state::Registration;
use crate::bot::state::Session;
use crate::bot::state::Withdrawal;

/// Handler chosen for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  StartRegistration,
  PromptLogin,
  Logout,
  CheckBalance,
  StartWithdrawal,
  JoinChannel,
  StartProfileUpdate,
  BackToMainMenu,
  Registration(Registration),
  Login,
  Withdrawal(Withdrawal),
  ProfileUpdate(ProfileUpdate),
  NotUnderstood,
}

/// Picks the handler for `text`. Menu keywords win over any flow in
/// progress, so a flow interrupted by a main-menu choice keeps its step.
pub fn route(text: &str, session: &Session) -> Route {
  match text {
    "1. Signup" | "Signup" => return Route::StartRegistration,
    "2. Login" | "Login" => return Route::PromptLogin,
    "Logout" => return Route::Logout,
    _ => {},
  }

  if session.logged_in {
    let menu_route = match text {
      "1. Check Balance" | "Check Balance" => Some(Route::CheckBalance),
      "2. Withdraw Funds" | "Withdraw Funds" => Some(Route::StartWithdrawal),
      "3. Join Channel" | "Join Channel" => Some(Route::JoinChannel),
      "4. Update Profile" | "Update Profile" => Some(Route::StartProfileUpdate),
      profile::BACK_TO_MAIN_MENU => Some(Route::BackToMainMenu),
      _ => None,
    };
    if let Some(route) = menu_route {
      return route;
    }
  }

  if let Some(step) = &session.registration {
    return Route::Registration(step.clone());
  }
  if !session.logged_in && session.login_pending {
    return Route::Login;
  }
  if let Some(step) = &session.withdrawal {
    return Route::Withdrawal(step.clone());
  }
  if let Some(step) = session.profile_update {
    return Route::ProfileUpdate(step);
  }
  Route::NotUnderstood
}

/// Handles `/start`: makes sure a session exists and shows the welcome menu.
pub async fn start(ctx: &AppContext, user_id: i64) -> Reply {
  ctx.sessions().start(user_id).await;
  info!(user_id, "session started");
  Reply::welcome()
}

/// Runs one conversational turn for `user_id`.
#[instrument(skip(ctx, text))]
pub async fn handle_text(ctx: &AppContext, user_id: i64, text: &str) -> Reply {
  let sessions = ctx.sessions();
  if !sessions.contains(user_id).await {
    debug!(user_id, "creating session on first message");
    sessions.start(user_id).await;
  }
  let mut session = sessions.get(user_id).await;
  let route = route(text, &session);
  debug!(user_id, ?route, "routing message");

  let reply = match route {
    Route::StartRegistration => registration::start(&mut session),
    Route::PromptLogin => login::prompt(&mut session),
    Route::Logout => {
      sessions.end(user_id).await;
      info!(user_id, "user logged out");
      return menu::logged_out();
    },
    Route::CheckBalance => menu::check_balance(ctx, user_id, &session).await,
    Route::StartWithdrawal => withdrawal::start(&mut session),
    Route::JoinChannel => menu::join_channel(ctx, &session),
    Route::StartProfileUpdate => profile::start(&mut session),
    Route::BackToMainMenu => {
      session.profile_update = None;
      menu::main_menu(&session)
    },
    Route::Registration(step) => registration::handle(ctx, user_id, &mut session, step, text).await,
    Route::Login => login::handle(ctx, user_id, &mut session, text).await,
    Route::Withdrawal(step) => withdrawal::handle(ctx, user_id, &mut session, step, text).await,
    Route::ProfileUpdate(step) => profile::handle(ctx, user_id, &mut session, step, text).await,
    Route::NotUnderstood => menu::not_understood(&session),
  };

  sessions.set(user_id, session).await;
  reply
}
