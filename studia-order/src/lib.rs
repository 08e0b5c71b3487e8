pub mod gateway;
pub mod ledger;
pub mod models;
pub mod repository;

pub use gateway::SimulatedGateway;
pub use ledger::{CartLine, CompletionOutcome, CompletionSource, OrderError, OrderLedger, PricingPolicy};
pub use models::{Order, OrderItem, OrderStatus};
pub use repository::{OrderRepository, TransitionOutcome};
