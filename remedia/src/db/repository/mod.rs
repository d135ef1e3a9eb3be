mod remedies;
mod symptoms;

pub use remedies::RemedyRepository;
pub use symptoms::SymptomRepository;
