//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the scheduler/harness into the application
//! - Outbound: Called by application into infrastructure (store, mail)

pub mod inbound;
pub mod outbound;

pub use inbound::{DigestTrigger, InvocationBody, InvocationResult};
pub use outbound::{ContentStore, MailPort};
