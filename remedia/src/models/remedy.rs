use serde::{Deserialize, Serialize};

/// Row returned by the remedy lookup store for one symptom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RemedyRecord {
    pub abbreviation: String,
    pub description: String,
    pub degree: i64,
}

impl RemedyRecord {
    pub fn tagged(self, symptom_id: i64) -> Remedy {
        Remedy {
            abbreviation: self.abbreviation,
            description: self.description,
            degree: self.degree,
            symptom_id,
        }
    }
}

/// A remedy carrying the id of the symptom it was selected for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Remedy {
    pub abbreviation: String,
    pub description: String,
    pub degree: i64,
    pub symptom_id: i64,
}

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AggregatedRemedy {
    pub abbreviation: String,
    pub description: String,
    pub total_occurrence: u32,
    pub total_degree: i64,
}
