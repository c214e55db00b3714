//! Trading sessions
//!
//! One background trade loop per chat. A session ends when its loop hits a
//! fatal error, when the chat sends `/stop`, or at shutdown.

use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, JoinHandle<()>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `session` for `chat_id` unless one is still running there
    pub async fn start<F>(&self, chat_id: i64, session: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, handle| !handle.is_finished());
        if sessions.contains_key(&chat_id) {
            return false;
        }
        sessions.insert(chat_id, tokio::spawn(session));
        info!("▶️ Trading session started for chat {}", chat_id);
        true
    }

    /// Abort the chat's session; `false` when none was running
    pub async fn stop(&self, chat_id: i64) -> bool {
        let Some(handle) = self.sessions.lock().await.remove(&chat_id) else {
            return false;
        };
        let was_running = !handle.is_finished();
        handle.abort();
        if was_running {
            info!("⏹️ Trading session stopped for chat {}", chat_id);
        }
        was_running
    }

    pub async fn is_running(&self, chat_id: i64) -> bool {
        self.sessions
            .lock()
            .await
            .get(&chat_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort every session, returning how many were still running
    pub async fn shutdown(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let mut stopped = 0;
        for (_, handle) in sessions.drain() {
            if !handle.is_finished() {
                stopped += 1;
            }
            handle.abort();
        }
        stopped
    }
}
