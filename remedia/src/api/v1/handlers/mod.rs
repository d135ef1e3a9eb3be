pub(crate) mod health;
pub mod remedies;
pub mod report;
pub mod sessions;

pub use health::health_check;
