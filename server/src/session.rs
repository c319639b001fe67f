use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "todo_session";

/// In-memory store mapping opaque session ids to user ids. Sessions live
/// until logout or process restart; the app runs as a single instance so
/// nothing is persisted.
pub struct SessionHandler {
    sessions: RwLock<HashMap<String, i64>>,
}

impl SessionHandler {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Establishes a session for the given user and returns its id.
    pub async fn login(&self, user_id: i64) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), user_id);
        info!("established session for user {}", user_id);

        session_id
    }

    pub async fn logout(&self, session_id: &str) -> bool {
        match self.sessions.write().await.remove(session_id) {
            Some(user_id) => {
                info!("terminated session for user {}", user_id);
                true
            }
            None => false,
        }
    }

    pub async fn current_user(&self, session_id: &str) -> Option<i64> {
        self.sessions.read().await.get(session_id).copied()
    }
}
