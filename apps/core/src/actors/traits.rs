use crate::actors::messages::AppError;
use crate::brain::ProfileDelta;
use crate::models::StudentProfile;
use async_trait::async_trait;

/// Optional second opinion on profile extraction.
///
/// Implementations typically call a hosted language model. Whatever they
/// return is merged on top of the rule-based pass; errors are logged by the
/// caller and never reach the student.
#[async_trait]
pub trait ProfileExtractionDelegate: Send + Sync + 'static {
    async fn extract(
        &self,
        utterance: String,
        profile: StudentProfile,
    ) -> Result<ProfileDelta, AppError>;
}
