use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::actors::session::{HistoryEntry, SessionHandle, SessionSnapshot};
use crate::brain::{ProfileDelta, TurnResponse};
use crate::models::StudentProfile;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// The target actor's mailbox is closed; it has stopped.
    #[error("Actor mailbox closed: {0}")]
    MailboxClosed(String),
    /// The actor dropped the responder without answering.
    #[error("Actor dropped the response: {0}")]
    ResponseDropped(String),
    /// A generic internal error within an actor.
    #[error("Internal system error: {0}")]
    Internal(String),
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the `LlmActor`.
#[derive(Debug)]
pub enum LlmMessage {
    /// Ask the model to pull profile fields out of one utterance.
    Extract {
        utterance: String,
        profile: StudentProfile,
        responder: oneshot::Sender<Result<ProfileDelta, AppError>>,
    },
}

/// Messages that can be sent to a `SessionActor`. One actor per conversation.
#[derive(Debug)]
pub enum SessionMessage {
    /// Clear the session and emit the greeting. Used on start and on reset.
    Open {
        responder: oneshot::Sender<Result<TurnResponse, AppError>>,
    },
    /// One student utterance.
    Turn {
        utterance: String,
        responder: oneshot::Sender<Result<TurnResponse, AppError>>,
    },
    Snapshot {
        responder: oneshot::Sender<SessionSnapshot>,
    },
    History {
        responder: oneshot::Sender<Vec<HistoryEntry>>,
    },
}

/// Messages that can be sent to the `SupervisorActor`.
#[derive(Debug)]
pub enum SupervisorMessage {
    /// Spawn a new session actor and register it under a fresh id.
    StartSession {
        responder: oneshot::Sender<Result<(Uuid, SessionHandle), AppError>>,
    },
    /// Resolve a session id to its actor handle.
    Lookup {
        session_id: Uuid,
        responder: oneshot::Sender<Option<SessionHandle>>,
    },
    /// Forget a session. Its actor stops once the last handle is dropped.
    EndSession {
        session_id: Uuid,
        responder: oneshot::Sender<bool>,
    },
    /// Number of live sessions.
    Count {
        responder: oneshot::Sender<usize>,
    },
}
