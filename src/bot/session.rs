use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::bot::state::Session;

/// Sessions keyed by chat user id. Lives only as long as the process.
#[derive(Default, Clone)]
pub struct SessionStore {
  sessions: Arc<RwLock<HashMap<i64, Session>>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a fresh session unless one already exists.
  pub async fn start(&self, user_id: i64) {
    self.sessions.write().await.entry(user_id).or_default();
  }

  pub async fn end(&self, user_id: i64) {
    self.sessions.write().await.remove(&user_id);
  }

  pub async fn contains(&self, user_id: i64) -> bool {
    self.sessions.read().await.contains_key(&user_id)
  }

  /// Copy of the session, or an empty default for unknown ids.
  pub async fn get(&self, user_id: i64) -> Session {
    self.sessions.read().await.get(&user_id).cloned().unwrap_or_default()
  }

  /// Stores `session`; ignored when the id has no session.
  pub async fn set(&self, user_id: i64, session: Session) {
    if let Some(slot) = self.sessions.write().await.get_mut(&user_id) {
      *slot = session;
    }
  }
}
