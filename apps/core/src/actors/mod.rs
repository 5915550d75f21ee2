//! Actor layer: one supervisor owning the session registry, one actor per
//! session, and an optional LLM actor used as an extraction delegate.

pub mod llm;
pub mod messages;
pub mod session;
pub mod supervisor;
pub mod traits;

pub use llm::LlmActorHandle;
pub use messages::ActorError;
pub use session::{HistoryEntry, Role, SessionHandle, SessionSettings, SessionSnapshot, ThinkingDelay};
pub use supervisor::SupervisorHandle;
pub use traits::ProfileExtractionDelegate;
