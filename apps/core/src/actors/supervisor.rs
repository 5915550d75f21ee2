use crate::actors::messages::{ActorError, AppError, SupervisorMessage};
use crate::actors::session::{HistoryEntry, SessionHandle, SessionSettings, SessionSnapshot};
use crate::actors::traits::ProfileExtractionDelegate;
use crate::brain::{CounselorEngine, TurnResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const REGISTRY_TIMEOUT: Duration = Duration::from_secs(5);

/// A handle to the `SupervisorActor`.
///
/// This is the entry point for the session API. The supervisor owns the
/// registry of live sessions; each session is its own actor, so work for one
/// conversation never waits on another.
#[derive(Clone)]
pub struct SupervisorHandle {
    sender: mpsc::Sender<SupervisorMessage>,
}

impl SupervisorHandle {
    /// Spawns the supervisor. `delegate` is shared by every session it creates.
    pub fn new(
        engine: Arc<CounselorEngine>,
        delegate: Option<Arc<dyn ProfileExtractionDelegate>>,
        settings: SessionSettings,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(64);
        let actor = SupervisorRunner::new(receiver, engine, delegate, settings);
        tokio::spawn(async move { actor.run().await });
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SupervisorMessage,
    ) -> Result<T, AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(build(send))
            .await
            .map_err(|e| ActorError::MailboxClosed(format!("supervisor: {}", e)))?;
        let reply = timeout(REGISTRY_TIMEOUT, recv)
            .await?
            .map_err(|e| ActorError::ResponseDropped(format!("supervisor: {}", e)))?;
        Ok(reply)
    }

    async fn lookup(&self, session_id: Uuid) -> Result<SessionHandle, AppError> {
        self.request(|responder| SupervisorMessage::Lookup {
            session_id,
            responder,
        })
        .await?
        .ok_or(AppError::SessionNotFound(session_id))
    }

    /// Creates a session and returns its id with the opening greeting.
    ///
    /// Fails with [`AppError::SessionLimitReached`] once `max_sessions` are live.
    #[instrument(skip(self))]
    pub async fn start_session(&self) -> Result<(Uuid, TurnResponse), AppError> {
        let (session_id, session) = self
            .request(|responder| SupervisorMessage::StartSession { responder })
            .await??;
        let greeting = session.open().await?;
        Ok((session_id, greeting))
    }

    /// Processes one student utterance.
    #[instrument(skip(self, utterance))]
    pub async fn send_turn(
        &self,
        session_id: Uuid,
        utterance: String,
    ) -> Result<TurnResponse, AppError> {
        self.lookup(session_id).await?.turn(utterance).await
    }

    /// Clears profile, state and history, then greets again.
    #[instrument(skip(self))]
    pub async fn reset_session(&self, session_id: Uuid) -> Result<TurnResponse, AppError> {
        self.lookup(session_id).await?.open().await
    }

    pub async fn get_profile(&self, session_id: Uuid) -> Result<SessionSnapshot, AppError> {
        self.lookup(session_id).await?.snapshot().await
    }

    pub async fn get_history(&self, session_id: Uuid) -> Result<Vec<HistoryEntry>, AppError> {
        self.lookup(session_id).await?.history().await
    }

    #[instrument(skip(self))]
    pub async fn end_session(&self, session_id: Uuid) -> Result<(), AppError> {
        let removed = self
            .request(|responder| SupervisorMessage::EndSession {
                session_id,
                responder,
            })
            .await?;
        if removed {
            Ok(())
        } else {
            Err(AppError::SessionNotFound(session_id))
        }
    }

    pub async fn session_count(&self) -> Result<usize, AppError> {
        self.request(|responder| SupervisorMessage::Count { responder })
            .await
    }
}

// --- Actor Runner ---
struct SupervisorRunner {
    receiver: mpsc::Receiver<SupervisorMessage>,
    engine: Arc<CounselorEngine>,
    delegate: Option<Arc<dyn ProfileExtractionDelegate>>,
    settings: SessionSettings,
    sessions: HashMap<Uuid, SessionHandle>,
}

impl SupervisorRunner {
    fn new(
        receiver: mpsc::Receiver<SupervisorMessage>,
        engine: Arc<CounselorEngine>,
        delegate: Option<Arc<dyn ProfileExtractionDelegate>>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            receiver,
            engine,
            delegate,
            settings,
            sessions: HashMap::new(),
        }
    }

    async fn run(mut self) {
        info!(
            "Supervisor started (extraction delegate: {})",
            if self.delegate.is_some() { "enabled" } else { "disabled" }
        );
        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg);
        }
        info!("Supervisor stopped");
    }

    fn handle_message(&mut self, msg: SupervisorMessage) {
        match msg {
            SupervisorMessage::StartSession { responder } => {
                let limit = self.settings.max_sessions;
                if self.sessions.len() >= limit {
                    warn!("Refusing new session, {} already live", limit);
                    let _ = responder.send(Err(AppError::SessionLimitReached(limit)));
                    return;
                }
                let session_id = Uuid::new_v4();
                let session = SessionHandle::spawn(
                    session_id,
                    self.engine.clone(),
                    self.delegate.clone(),
                    self.settings.clone(),
                );
                self.sessions.insert(session_id, session.clone());
                info!("Session {} created ({} live)", session_id, self.sessions.len());
                let _ = responder.send(Ok((session_id, session)));
            }
            SupervisorMessage::Lookup {
                session_id,
                responder,
            } => {
                let _ = responder.send(self.sessions.get(&session_id).cloned());
            }
            SupervisorMessage::EndSession {
                session_id,
                responder,
            } => {
                let removed = self.sessions.remove(&session_id).is_some();
                if removed {
                    info!("Session {} ended ({} live)", session_id, self.sessions.len());
                }
                let _ = responder.send(removed);
            }
            SupervisorMessage::Count { responder } => {
                let _ = responder.send(self.sessions.len());
            }
        }
    }
}
