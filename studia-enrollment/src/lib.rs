pub mod activator;
pub mod models;
pub mod repository;

pub use activator::{ActivationOutcome, CourseGrant, EnrollmentActivator, EnrollmentError};
pub use models::{AccessTier, Enrollment, EnrollmentStatus, VideoProgress};
pub use repository::EnrollmentRepository;
