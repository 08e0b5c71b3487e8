use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::AccessTier;
use crate::repository::EnrollmentRepository;

#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("Enrollment storage failure: {0}")]
    Storage(String),
}

/// What the upsert did for one course.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationOutcome {
    /// No enrollment existed; a fresh one was created.
    Created,
    /// A lapsed or cancelled enrollment was set back to active.
    Reactivated,
    /// An active enrollment already existed; nothing changed.
    AlreadyActive,
}

/// One course access to grant, extracted from a paid order's line items.
#[derive(Debug, Clone)]
pub struct CourseGrant {
    pub course_id: Uuid,
    pub access_tier: AccessTier,
}

/// Grants course access for paid orders. Activation is idempotent: the
/// (user, course) uniqueness lives in the repository upsert, so a retried
/// payment callback can never produce a duplicate enrollment.
pub struct EnrollmentActivator {
    repo: Arc<dyn EnrollmentRepository>,
}

impl EnrollmentActivator {
    pub fn new(repo: Arc<dyn EnrollmentRepository>) -> Self {
        Self { repo }
    }

    /// Upsert one enrollment per granted course. Existing progress is never
    /// touched; only the status is forced back to active.
    pub async fn activate(
        &self,
        user_id: Uuid,
        grants: &[CourseGrant],
        now: DateTime<Utc>,
    ) -> Result<Vec<(Uuid, ActivationOutcome)>, EnrollmentError> {
        let mut outcomes = Vec::with_capacity(grants.len());
        for grant in grants {
            let outcome = self
                .repo
                .upsert_active(user_id, grant.course_id, grant.access_tier, now)
                .await
                .map_err(|e| EnrollmentError::Storage(e.to_string()))?;
            tracing::info!(%user_id, course_id = %grant.course_id, ?outcome, "enrollment activated");
            outcomes.push((grant.course_id, outcome));
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Enrollment, EnrollmentStatus};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubRepo {
        rows: Mutex<HashMap<(Uuid, Uuid), Enrollment>>,
    }

    #[async_trait]
    impl EnrollmentRepository for StubRepo {
        async fn upsert_active(
            &self,
            user_id: Uuid,
            course_id: Uuid,
            access_tier: AccessTier,
            now: DateTime<Utc>,
        ) -> Result<ActivationOutcome, Box<dyn std::error::Error + Send + Sync>> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&(user_id, course_id)) {
                None => {
                    rows.insert(
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
            Ok(self.rows.lock().unwrap().get(&(user_id, course_id)).cloned())
        }

        async fn list_for_user(
            &self,
            user_id: Uuid,
        ) -> Result<Vec<Enrollment>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn double_activation_creates_one_row() {
        let repo = Arc::new(StubRepo::default());
        let activator = EnrollmentActivator::new(repo.clone());
        let user = Uuid::new_v4();
        let grants = vec![CourseGrant {
            course_id: Uuid::new_v4(),
            access_tier: AccessTier::Standard,
        }];
        let now = Utc::now();

        let first = activator.activate(user, &grants, now).await.unwrap();
        assert_eq!(first[0].1, ActivationOutcome::Created);

        let second = activator.activate(user, &grants, now).await.unwrap();
        assert_eq!(second[0].1, ActivationOutcome::AlreadyActive);

        assert_eq!(repo.list_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repurchase_reactivates_without_resetting_progress() {
        let repo = Arc::new(StubRepo::default());
        let activator = EnrollmentActivator::new(repo.clone());
        let user = Uuid::new_v4();
        let course = Uuid::new_v4();
        let now = Utc::now();

        // Seed a cancelled enrollment with existing progress
        {
            let mut lapsed = Enrollment::new(user, course, AccessTier::Standard, now);
            lapsed.status = EnrollmentStatus::Cancelled;
            lapsed.progress_percent = 40;
            repo.rows.lock().unwrap().insert((user, course), lapsed);
        }

        let grants = vec![CourseGrant {
            course_id: course,
            access_tier: AccessTier::Standard,
        }];
        let outcomes = activator.activate(user, &grants, now).await.unwrap();
        assert_eq!(outcomes[0].1, ActivationOutcome::Reactivated);

        let row = repo.find(user, course).await.unwrap().unwrap();
        assert_eq!(row.status, EnrollmentStatus::Active);
        assert_eq!(row.progress_percent, 40);
    }
}
