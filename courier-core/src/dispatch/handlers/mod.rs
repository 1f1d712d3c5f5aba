//! Built-in handlers
//!
//! Each handler owns the protocol plumbing of its message types and delegates the business
//! decisions to a collaborator trait implemented by the agent.
mod discovery;
pub use discovery::{DiscoveryHandler, FEATURE_TYPE_ACCEPT, FEATURE_TYPE_PROTOCOL};

mod revocation;
pub use revocation::{RevocationStatusHandler, RevocationStatusProvider};

mod authorization;
pub use authorization::{AuthorizationHandler, AuthorizationResponder, AuthorizationVerifier};

mod payment;
pub use payment::{PaymentHandler, PaymentProcessor};

mod problem_report;
pub use problem_report::ProblemReportHandler;
