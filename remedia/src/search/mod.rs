mod corpus;
mod engine;
pub mod similarity;

pub use corpus::SymptomCorpus;
pub use engine::{SimilaritySearchEngine, MAX_TOP_N};
pub use similarity::{filter_by_keywords, normalize_keywords};
