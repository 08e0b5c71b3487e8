use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use studia_enrollment::{
    AccessTier, ActivationOutcome, Enrollment, EnrollmentRepository, EnrollmentStatus,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory enrollment store keyed by (user, course). The map key is the
/// uniqueness constraint; upsert happens under one write lock, so
/// concurrent activations for the same pair collapse instead of
/// duplicating.
pub struct MemEnrollmentRepository {
    enrollments: RwLock<HashMap<(Uuid, Uuid), Enrollment>>,
}

impl MemEnrollmentRepository {
    pub fn new() -> Self {
        Self {
            enrollments: RwLock::new(HashMap::new()),
        }
    }

    /// Test/seeding helper: count all rows.
    pub async fn len(&self) -> usize {
        self.enrollments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.enrollments.read().await.is_empty()
    }
}

impl Default for MemEnrollmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnrollmentRepository for MemEnrollmentRepository {
    async fn upsert_active(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        access_tier: AccessTier,
        now: DateTime<Utc>,
    ) -> Result<ActivationOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let mut enrollments = self.enrollments.write().await;
        match enrollments.get_mut(&(user_id, course_id)) {
            None => {
                enrollments.insert(
                    (user_id, course_id),
                    Enrollment::new(user_id, course_id, access_tier, now),
                );
                Ok(ActivationOutcome::Created)
            }
            Some(existing) if existing.status == EnrollmentStatus::Active => {
                Ok(ActivationOutcome::AlreadyActive)
            }
            Some(existing) => {
                existing.status = EnrollmentStatus::Active;
                existing.updated_at = now;
                Ok(ActivationOutcome::Reactivated)
            }
        }
    }

    async fn find(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .enrollments
            .read()
            .await
            .get(&(user_id, course_id))
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Enrollment>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .enrollments
            .read()
            .await
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}
