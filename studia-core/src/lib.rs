pub mod clock;
pub mod notify;
pub mod payment;
pub mod rejection;

pub use clock::{Clock, FixedClock, SystemClock};
pub use notify::{NotificationDispatcher, NotificationEvent, TracingDispatcher};
pub use payment::{PaymentAdapter, PaymentDetails, PaymentMethod, PaymentStatus};
pub use rejection::RejectionReason;
