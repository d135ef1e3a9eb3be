//! v1 API Data Transfer Objects.
//!
//! Request bodies and the response shapes that have no direct counterpart in
//! the domain types. Domain types that already carry `ToSchema` (session
//! snapshots, ranked symptoms, remedies) go on the wire as they are.

pub mod remedies;
pub mod sessions;

pub use remedies::*;
pub use sessions::*;
