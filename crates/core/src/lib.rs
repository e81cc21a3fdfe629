//! CTAS Core - Domain types
//!
//! This crate contains the fundamental types shared by every CTAS crate:
//! - `Amount`: Non-negative decimal wrapper for treasury amounts
//! - `AccountId`: Opaque account address used for roles and requesters
//! - `RequestId` / `RequestStatus`: Fund request identity and lifecycle
//! - `Clock`: Source of "now" for deadline validation

pub mod account;
pub mod amount;
pub mod clock;
pub mod request;

pub use account::{AccountId, AccountIdError};
pub use amount::{Amount, AmountError};
pub use clock::{Clock, FixedClock, SystemClock, Timestamp};
pub use request::{RequestId, RequestStatus};
