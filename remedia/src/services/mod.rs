mod accumulator;
mod classifier;
pub mod report;
mod session;
mod sessions;
mod triage;

pub use accumulator::ResultAccumulator;
pub use classifier::Classifier;
pub use session::{InFlight, Operation, ResetScope, Session, SessionSnapshot, SessionStep};
pub use sessions::{SessionHandle, SessionRegistry};
pub use triage::{AddedRemedies, RemovedRemedies, TriageService};
