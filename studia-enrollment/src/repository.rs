use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::activator::ActivationOutcome;
use crate::models::{AccessTier, Enrollment};

/// Repository trait for enrollment data access. The (user, course) key is
/// unique by construction; `upsert_active` is a true upsert, not
/// find-then-create, so concurrent activations collapse instead of racing.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Create the enrollment if absent, otherwise ensure its status is
    /// active without touching progress. Returns what happened.
    async fn upsert_active(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        access_tier: AccessTier,
        now: DateTime<Utc>,
    ) -> Result<ActivationOutcome, Box<dyn std::error::Error + Send + Sync>>;

    async fn find(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Enrollment>, Box<dyn std::error::Error + Send + Sync>>;
}
