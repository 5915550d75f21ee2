use crate::actors::messages::{ActorError, AppError, LlmMessage};
use crate::actors::traits::ProfileExtractionDelegate;
use crate::brain::ProfileDelta;
use crate::config::DelegateConfig;
use crate::models::StudentProfile;
use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// A handle to the `LlmActor`.
///
/// Cloneable front for the task that talks to an OpenAI-compatible chat
/// completion API (Groq by default) and turns replies into profile deltas.
#[derive(Clone)]
pub struct LlmActorHandle {
    sender: mpsc::Sender<LlmMessage>,
}

impl LlmActorHandle {
    /// Spawns the `LlmActorRunner` in a new Tokio task and returns its handle.
    pub fn new(config: DelegateConfig) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let actor = LlmActorRunner::new(receiver, config);
        tokio::spawn(async move { actor.run().await });
        Self { sender }
    }
}

#[async_trait]
impl ProfileExtractionDelegate for LlmActorHandle {
    async fn extract(
        &self,
        utterance: String,
        profile: StudentProfile,
    ) -> Result<ProfileDelta, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = LlmMessage::Extract {
            utterance,
            profile,
            responder: send,
        };

        self.sender
            .send(msg)
            .await
            .map_err(|e| ActorError::MailboxClosed(e.to_string()))?;
        timeout(HANDLE_TIMEOUT, recv)
            .await?
            .map_err(|e| ActorError::ResponseDropped(e.to_string()))?
    }
}

// --- Constants ---
const HANDLE_TIMEOUT: Duration = Duration::from_secs(30);
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(20);
const EXTRACTION_TEMPERATURE: f32 = 0.1;
const EXTRACTION_MAX_TOKENS: u32 = 1000;

const SYSTEM_PROMPT: &str =
    "You are an expert at extracting structured information from natural language. Always return valid JSON.";

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid regex: JSON_OBJECT"));

fn extraction_prompt(utterance: &str, profile: &StudentProfile) -> String {
    format!(
        "You are an expert career counselor analyzing a student's message.\n\n\
Student's message: \"{utterance}\"\n\n\
Already known about the student:\n\
- Interests: {interests}\n\
- Hobbies: {hobbies}\n\
- Favorite subjects: {subjects}\n\
- Strengths: {strengths}\n\n\
Extract only new information that is clearly stated or strongly implied. \
Return JSON in exactly this format:\n\
{{\"interests\": [], \"hobbies\": [], \"favorite_subjects\": [], \"academic_strengths\": []}}",
        utterance = utterance,
        interests = or_none(profile.interests()),
        hobbies = or_none(profile.hobbies()),
        subjects = or_none(profile.subjects()),
        strengths = or_none(profile.strengths()),
    )
}

fn or_none(entries: &[String]) -> String {
    if entries.is_empty() {
        "none yet".to_string()
    } else {
        entries.join(", ")
    }
}

/// Pulls the first `{...}` span out of a model reply and decodes it.
pub fn parse_delta(content: &str) -> Result<ProfileDelta, AppError> {
    let json = JSON_OBJECT
        .find(content)
        .ok_or_else(|| AppError::Extraction("No JSON object in model reply".to_string()))?;
    serde_json::from_str(json.as_str())
        .map_err(|e| AppError::Extraction(format!("Malformed extraction JSON: {}", e)))
}

// --- Actor Runner (Internal Logic) ---
struct LlmActorRunner {
    receiver: mpsc::Receiver<LlmMessage>,
    client: Client,
    config: DelegateConfig,
    limiter: RateLimiter,
}

impl LlmActorRunner {
    fn new(receiver: mpsc::Receiver<LlmMessage>, config: DelegateConfig) -> Self {
        let limiter = RateLimiter::per_minute(config.requests_per_minute);
        Self {
            receiver,
            client: Client::new(),
            config,
            limiter,
        }
    }

    async fn run(mut self) {
        info!("LlmActor started (model: {})", self.config.model);
        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg);
        }
        info!("LlmActor stopped");
    }

    fn handle_message(&mut self, msg: LlmMessage) {
        match msg {
            LlmMessage::Extract {
                utterance,
                profile,
                responder,
            } => {
                if !self.limiter.check(&self.config.model) {
                    let wait = self.limiter.retry_after(&self.config.model);
                    warn!("Extraction budget exhausted, retry in {:?}", wait);
                    let _ = responder.send(Err(AppError::RateLimited));
                    return;
                }

                // Requests run off the mailbox loop so a slow provider does not
                // stall the budget check for other sessions.
                let client = self.client.clone();
                let config = self.config.clone();
                tokio::spawn(async move {
                    let result = request_extraction(&client, &config, &utterance, &profile).await;
                    let _ = responder.send(result);
                });
            }
        }
    }
}

#[instrument(skip_all, fields(model = %config.model))]
async fn request_extraction(
    client: &Client,
    config: &DelegateConfig,
    utterance: &str,
    profile: &StudentProfile,
) -> Result<ProfileDelta, AppError> {
    let payload = serde_json::json!({
        "model": config.model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": extraction_prompt(utterance, profile) }
        ],
        "temperature": EXTRACTION_TEMPERATURE,
        "max_tokens": EXTRACTION_MAX_TOKENS
    });

    let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
    let request_future = client
        .post(url)
        .bearer_auth(&config.api_key)
        .json(&payload)
        .send();

    let res = timeout(COMPLETION_TIMEOUT, request_future).await??;
    let status = res.status();

    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AppError::Extraction(format!(
            "Completion request failed with status {}: {}",
            status, body
        )));
    }

    let json: serde_json::Value = res.json().await?;
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default();

    let delta = parse_delta(content)?;
    debug!(
        "Delegate returned {} interests, {} hobbies, {} subjects, {} strengths",
        delta.interests.len(),
        delta.hobbies.len(),
        delta.favorite_subjects.len(),
        delta.academic_strengths.len()
    );
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn setup_test_actor(server_url: String, requests_per_minute: usize) -> LlmActorHandle {
        LlmActorHandle::new(DelegateConfig {
            api_key: "gsk_test".to_string(),
            base_url: server_url,
            model: "llama-3.1-8b-instant".to_string(),
            requests_per_minute,
        })
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
    }

    #[tokio::test]
    async fn test_extract_success() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(mock_server.uri(), 10);

        let reply = "Here is the analysis:\n{\"interests\": [\"robotics\"], \"hobbies\": [\"chess\"], \"confidence_level\": 0.8}";
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(reply)))
            .mount(&mock_server)
            .await;

        // 2. Act
        let result = handle
            .extract("I build robots and play chess".to_string(), StudentProfile::new())
            .await;

        // 3. Assert
        let delta = result.unwrap();
        assert_eq!(delta.interests, vec!["robotics".to_string()]);
        assert_eq!(delta.hobbies, vec!["chess".to_string()]);
        assert!(delta.favorite_subjects.is_empty());
    }

    #[tokio::test]
    async fn test_extract_server_error() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(mock_server.uri(), 10);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        // 2. Act
        let result = handle
            .extract("I like math".to_string(), StudentProfile::new())
            .await;

        // 3. Assert
        if let Err(AppError::Extraction(err_msg)) = result {
            assert!(err_msg.contains("status 500"));
            assert!(err_msg.contains("Internal Server Error"));
        } else {
            panic!("Expected AppError::Extraction, got {:?}", result);
        }
    }

    #[tokio::test]
    async fn test_extract_rate_limited() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let handle = setup_test_actor(mock_server.uri(), 1);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{}")))
            .expect(1)
            .mount(&mock_server)
            .await;

        // 2. Act
        let first = handle.extract("hi".to_string(), StudentProfile::new()).await;
        let second = handle.extract("hi again".to_string(), StudentProfile::new()).await;

        // 3. Assert
        assert!(first.unwrap().is_empty());
        assert!(matches!(second, Err(AppError::RateLimited)));
    }

    #[test]
    fn test_parse_delta_without_json() {
        let err = parse_delta("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_extraction_prompt_lists_known_profile() {
        let profile = StudentProfile::new().with(crate::models::ProfileField::Subjects, "Biology");
        let prompt = extraction_prompt("I like hiking", &profile);
        assert!(prompt.contains("\"I like hiking\""));
        assert!(prompt.contains("Favorite subjects: Biology"));
        assert!(prompt.contains("Hobbies: none yet"));
    }
}
