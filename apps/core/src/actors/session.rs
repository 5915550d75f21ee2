use crate::actors::messages::{ActorError, AppError, SessionMessage};
use crate::actors::traits::ProfileExtractionDelegate;
use crate::brain::{CounselorEngine, ProfileDelta, SessionState, TurnResponse};
use crate::models::StudentProfile;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Simulated typing pause before each reply. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThinkingDelay {
    min: Duration,
    max: Duration,
}

impl ThinkingDelay {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.max.is_zero()
    }

    fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    async fn pause(&self) {
        if self.is_none() {
            return;
        }
        let wait = self.sample();
        tokio::time::sleep(wait).await;
    }
}

/// Time kept back from the turn timeout for the engine and the reply.
const DELEGATE_HEADROOM: Duration = Duration::from_millis(250);

/// Knobs shared by the supervisor and every session it spawns.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub thinking_delay: ThinkingDelay,
    pub max_history: usize,
    pub turn_timeout: Duration,
    /// Live sessions the supervisor accepts before refusing new ones.
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            thinking_delay: ThinkingDelay::none(),
            max_history: 10,
            turn_timeout: Duration::from_secs(30),
            max_sessions: 1000,
        }
    }
}

impl SessionSettings {
    /// Longest the extraction delegate may take so the turn still answers
    /// inside `turn_timeout` after the longest thinking delay.
    pub fn delegate_budget(&self) -> Duration {
        self.turn_timeout
            .saturating_sub(self.thinking_delay.max)
            .saturating_sub(DELEGATE_HEADROOM)
    }
}

impl From<&crate::config::AppConfig> for SessionSettings {
    fn from(config: &crate::config::AppConfig) -> Self {
        Self {
            thinking_delay: ThinkingDelay::new(
                Duration::from_millis(config.thinking_delay_min_ms),
                Duration::from_millis(config.thinking_delay_max_ms),
            ),
            max_history: config.max_history,
            turn_timeout: config.turn_timeout(),
            max_sessions: config.max_sessions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Counselor,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Conversation state after the turn this entry belongs to.
    pub state: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub profile: StudentProfile,
    pub state: &'static str,
    pub turn_counter: u32,
    pub recommendations_given: bool,
}

/// A handle to one `SessionActor`.
///
/// The actor owns the session's state outright, so turns for one session are
/// applied strictly in arrival order while different sessions run in parallel.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    sender: mpsc::Sender<SessionMessage>,
    turn_timeout: Duration,
}

impl SessionHandle {
    /// Spawns the actor for `id`. The session starts empty; call [`open`](Self::open).
    pub fn spawn(
        id: Uuid,
        engine: Arc<CounselorEngine>,
        delegate: Option<Arc<dyn ProfileExtractionDelegate>>,
        settings: SessionSettings,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(16);
        let turn_timeout = settings.turn_timeout;
        let actor = SessionRunner::new(id, receiver, engine, delegate, settings);
        tokio::spawn(async move { actor.run().await });
        Self {
            id,
            sender,
            turn_timeout,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(build(send))
            .await
            .map_err(|_| ActorError::MailboxClosed(format!("session {}", self.id)))?;
        let reply = timeout(self.turn_timeout, recv)
            .await?
            .map_err(|_| ActorError::ResponseDropped(format!("session {}", self.id)))?;
        Ok(reply)
    }

    /// Clears the session and returns the greeting.
    pub async fn open(&self) -> Result<TurnResponse, AppError> {
        self.request(|responder| SessionMessage::Open { responder })
            .await?
    }

    pub async fn turn(&self, utterance: String) -> Result<TurnResponse, AppError> {
        self.request(|responder| SessionMessage::Turn {
            utterance,
            responder,
        })
        .await?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, AppError> {
        self.request(|responder| SessionMessage::Snapshot { responder })
            .await
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, AppError> {
        self.request(|responder| SessionMessage::History { responder })
            .await
    }
}

// --- Actor Runner ---
struct SessionRunner {
    id: Uuid,
    receiver: mpsc::Receiver<SessionMessage>,
    engine: Arc<CounselorEngine>,
    delegate: Option<Arc<dyn ProfileExtractionDelegate>>,
    settings: SessionSettings,
    state: SessionState,
    history: VecDeque<HistoryEntry>,
}

impl SessionRunner {
    fn new(
        id: Uuid,
        receiver: mpsc::Receiver<SessionMessage>,
        engine: Arc<CounselorEngine>,
        delegate: Option<Arc<dyn ProfileExtractionDelegate>>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            id,
            receiver,
            engine,
            delegate,
            settings,
            state: SessionState::default(),
            history: VecDeque::new(),
        }
    }

    async fn run(mut self) {
        debug!("Session {} started", self.id);
        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }
        debug!("Session {} stopped", self.id);
    }

    async fn handle_message(&mut self, msg: SessionMessage) {
        match msg {
            SessionMessage::Open { responder } => {
                let result = self.handle_open();
                let _ = responder.send(result);
            }
            SessionMessage::Turn {
                utterance,
                responder,
            } => {
                let (next, response) = self.compute_turn(&utterance).await;
                // A caller that timed out never sees this reply, so the
                // session must not move on without it.
                if responder.is_closed() {
                    warn!("Session {} caller gave up, discarding turn", self.id);
                    return;
                }
                self.commit_turn(utterance, next, &response);
                let _ = responder.send(Ok(response));
            }
            SessionMessage::Snapshot { responder } => {
                let _ = responder.send(self.snapshot());
            }
            SessionMessage::History { responder } => {
                let _ = responder.send(self.history.iter().cloned().collect());
            }
        }
    }

    fn handle_open(&mut self) -> Result<TurnResponse, AppError> {
        let (state, response) = self.engine.open();
        self.state = state;
        self.history.clear();
        self.record(Role::Counselor, response.text.clone());
        info!("Session {} opened", self.id);
        Ok(response)
    }

    #[instrument(skip(self, utterance), fields(session_id = %self.id))]
    async fn compute_turn(&self, utterance: &str) -> (SessionState, TurnResponse) {
        self.settings.thinking_delay.pause().await;

        let delegated = if self.state.conversation.is_greeting() {
            None
        } else {
            self.consult_delegate(utterance).await
        };

        self.engine
            .process_turn(&self.state, utterance, delegated.as_ref())
    }

    fn commit_turn(&mut self, utterance: String, next: SessionState, response: &TurnResponse) {
        self.state = next;
        self.record(Role::Student, utterance);
        self.record(Role::Counselor, response.text.clone());

        info!(
            "Turn {} answered with {:?} ({} profile entries)",
            self.state.turn_counter(),
            response.kind,
            self.state.profile.total_info_count()
        );
    }

    async fn consult_delegate(&self, utterance: &str) -> Option<ProfileDelta> {
        let delegate = self.delegate.as_ref()?;
        let budget = self.settings.delegate_budget();
        if budget.is_zero() {
            debug!("No time left for the extraction delegate, skipping it");
            return None;
        }

        let call = delegate.extract(utterance.to_string(), self.state.profile.clone());
        match timeout(budget, call).await {
            Ok(Ok(delta)) => Some(delta),
            Ok(Err(e)) => {
                warn!("Extraction delegate failed, keeping rule-based result: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "Extraction delegate exceeded {:?}, keeping rule-based result",
                    budget
                );
                None
            }
        }
    }

    fn record(&mut self, role: Role, content: String) {
        self.history.push_back(HistoryEntry {
            role,
            content,
            timestamp: Utc::now(),
            state: self.state.conversation.label(),
        });
        while self.history.len() > self.settings.max_history {
            self.history.pop_front();
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            profile: self.state.profile.clone(),
            state: self.state.conversation.label(),
            turn_counter: self.state.turn_counter(),
            recommendations_given: self.state.recommendations_given(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::TurnKind;
    use async_trait::async_trait;

    struct FailingDelegate;

    #[async_trait]
    impl ProfileExtractionDelegate for FailingDelegate {
        async fn extract(
            &self,
            _utterance: String,
            _profile: StudentProfile,
        ) -> Result<ProfileDelta, AppError> {
            Err(AppError::Extraction("provider unavailable".to_string()))
        }
    }

    /// Answers long after any sensible turn timeout.
    struct StalledDelegate;

    #[async_trait]
    impl ProfileExtractionDelegate for StalledDelegate {
        async fn extract(
            &self,
            _utterance: String,
            _profile: StudentProfile,
        ) -> Result<ProfileDelta, AppError> {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            Ok(ProfileDelta::default())
        }
    }

    fn spawn_session(
        delegate: Option<Arc<dyn ProfileExtractionDelegate>>,
        max_history: usize,
    ) -> SessionHandle {
        spawn_with(
            delegate,
            SessionSettings {
                max_history,
                ..SessionSettings::default()
            },
        )
    }

    fn spawn_with(
        delegate: Option<Arc<dyn ProfileExtractionDelegate>>,
        settings: SessionSettings,
    ) -> SessionHandle {
        SessionHandle::spawn(
            Uuid::new_v4(),
            Arc::new(CounselorEngine::default()),
            delegate,
            settings,
        )
    }

    #[tokio::test]
    async fn test_open_leaves_session_gathering() {
        // 1. Arrange
        let session = spawn_session(None, 10);

        // 2. Act
        let greeting = session.open().await.unwrap();
        let snapshot = session.snapshot().await.unwrap();

        // 3. Assert
        assert_eq!(greeting.kind, TurnKind::Greeting);
        assert_eq!(snapshot.state, "gathering");
        assert_eq!(snapshot.turn_counter, 0);
        assert_eq!(snapshot.session_id, session.id());
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        // 1. Arrange
        let session = spawn_session(None, 3);
        session.open().await.unwrap();

        // 2. Act
        session.turn("hello".to_string()).await.unwrap();
        session.turn("I like physics".to_string()).await.unwrap();
        let history = session.history().await.unwrap();

        // 3. Assert
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::Counselor);
        assert_eq!(history[1].role, Role::Student);
        assert_eq!(history[1].content, "I like physics");
        assert_eq!(history[2].role, Role::Counselor);
    }

    #[tokio::test]
    async fn test_failing_delegate_keeps_rule_result() {
        // 1. Arrange
        let session = spawn_session(Some(Arc::new(FailingDelegate) as Arc<dyn ProfileExtractionDelegate>), 10);
        session.open().await.unwrap();

        // 2. Act
        let response = session.turn("I love biology and art".to_string()).await.unwrap();

        // 3. Assert
        assert_eq!(response.kind, TurnKind::Recommendations);
        assert_eq!(response.profile.subjects(), &["Biology".to_string()]);
        assert_eq!(response.profile.interests(), &["Art".to_string()]);
    }

    #[tokio::test]
    async fn test_stalled_delegate_still_answers_in_time() {
        // 1. Arrange
        let session = spawn_with(
            Some(Arc::new(StalledDelegate) as Arc<dyn ProfileExtractionDelegate>),
            SessionSettings {
                turn_timeout: Duration::from_secs(1),
                ..SessionSettings::default()
            },
        );
        session.open().await.unwrap();

        // 2. Act
        let response = session
            .turn("I love biology and art".to_string())
            .await
            .unwrap();

        // 3. Assert
        assert_eq!(response.kind, TurnKind::Recommendations);
        assert_eq!(response.profile.subjects(), &["Biology".to_string()]);
        assert_eq!(response.profile.interests(), &["Art".to_string()]);
        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.state, "discussing");
        assert_eq!(session.history().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_abandoned_turn_is_not_committed() {
        // 1. Arrange
        let fixed = Duration::from_millis(1500);
        let session = spawn_with(
            None,
            SessionSettings {
                thinking_delay: ThinkingDelay::new(fixed, fixed),
                turn_timeout: Duration::from_secs(1),
                ..SessionSettings::default()
            },
        );
        session.open().await.unwrap();

        // 2. Act
        let result = session.turn("I love biology and art".to_string()).await;

        // 3. Assert
        assert!(matches!(result, Err(AppError::Timeout(_))));
        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.state, "gathering");
        assert_eq!(snapshot.turn_counter, 0);
        assert!(snapshot.profile.is_empty());
        assert_eq!(session.history().await.unwrap().len(), 1);
    }

    #[test]
    fn test_delegate_budget_leaves_room_for_delay() {
        let settings = SessionSettings {
            thinking_delay: ThinkingDelay::new(Duration::from_millis(500), Duration::from_secs(2)),
            turn_timeout: Duration::from_secs(5),
            ..SessionSettings::default()
        };
        assert_eq!(settings.delegate_budget(), Duration::from_millis(2750));
        assert!(settings.delegate_budget() < settings.turn_timeout - Duration::from_secs(2));

        let starved = SessionSettings {
            thinking_delay: ThinkingDelay::new(Duration::from_secs(3), Duration::from_secs(3)),
            turn_timeout: Duration::from_secs(2),
            ..SessionSettings::default()
        };
        assert!(starved.delegate_budget().is_zero());
    }

    #[tokio::test]
    async fn test_reopen_clears_history_and_profile() {
        // 1. Arrange
        let session = spawn_session(None, 10);
        session.open().await.unwrap();
        session.turn("I like chemistry".to_string()).await.unwrap();

        // 2. Act
        session.open().await.unwrap();

        // 3. Assert
        let snapshot = session.snapshot().await.unwrap();
        assert!(snapshot.profile.is_empty());
        assert!(!snapshot.recommendations_given);
        assert_eq!(session.history().await.unwrap().len(), 1);
    }

    #[test]
    fn test_thinking_delay_bounds() {
        let delay = ThinkingDelay::new(Duration::from_millis(50), Duration::from_millis(10));
        for _ in 0..20 {
            let wait = delay.sample();
            assert!(wait >= Duration::from_millis(10) && wait <= Duration::from_millis(50));
        }
        assert!(ThinkingDelay::none().is_none());
    }
}
