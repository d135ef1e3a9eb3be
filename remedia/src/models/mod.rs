mod classification;
mod conversation;
mod corpus;
mod remedy;

pub use classification::*;
pub use conversation::*;
pub use corpus::*;
pub use remedy::*;
