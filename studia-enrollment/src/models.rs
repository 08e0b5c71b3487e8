use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessTier {
    Standard,
    Premium,
    Lifetime,
}

/// Watch progress for one video within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoProgress {
    pub video_id: Uuid,
    pub watched_seconds: u32,
    pub completed: bool,
    pub last_watched_at: DateTime<Utc>,
}

/// Access grant for one (user, course) pair. That composite key is unique;
/// a second purchase of the same course updates this row in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub access_tier: AccessTier,
    pub status: EnrollmentStatus,
    /// 0-100.
    pub progress_percent: u8,
    pub video_progress: Vec<VideoProgress>,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(user_id: Uuid, course_id: Uuid, access_tier: AccessTier, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            course_id,
            access_tier,
            status: EnrollmentStatus::Active,
            progress_percent: 0,
            video_progress: Vec::new(),
            enrolled_at: at,
            updated_at: at,
        }
    }
}
