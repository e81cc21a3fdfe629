//! CTAS Roles - Access control for the fund request workflow
//!
//! One owner administers two membership sets:
//! - fund managers, who decide on and release requests
//! - whitelisted implementing partners (IPs), who submit requests
//!
//! The owner is not implicitly a member of either set.

pub mod error;
pub mod guard;
pub mod registry;

pub use error::AccessError;
pub use guard::{require_fund_manager, require_owner, require_whitelisted_ip};
pub use registry::{Role, RoleRegistry};
