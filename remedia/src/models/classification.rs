use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{RemediaError, Result};
use crate::taxonomy::{SubCategory, UpperCategory};

/// Name of the strict response schema sent with every classification request.
pub const CLASSIFICATION_SCHEMA_NAME: &str = "kategorie_schema";

/// Wire shape of a classification answer, exactly as the model must emit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawClassification {
    #[serde(rename = "Symptom")]
    pub symptom: String,
    #[serde(rename = "oberKategorie")]
    pub ober_kategorie: UpperCategory,
    #[serde(rename = "unterKategorie")]
    pub unter_kategorie: SubCategory,
    #[serde(rename = "Suchpfad")]
    pub suchpfad: String,
    #[serde(rename = "Begründung")]
    pub begruendung: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub symptom_echo: String,
    pub upper_category: UpperCategory,
    pub sub_category: SubCategory,
    pub search_path: String,
    pub rationale: String,
}

/// A validated result together with the raw assistant content that produced it.
/// The raw text is what goes back into the conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationOutcome {
    pub result: ClassificationResult,
    pub raw: String,
}

impl From<RawClassification> for ClassificationResult {
    fn from(raw: RawClassification) -> Self {
        Self {
            symptom_echo: raw.symptom,
            upper_category: raw.ober_kategorie,
            sub_category: raw.unter_kategorie,
            search_path: raw.suchpfad.trim().to_string(),
            rationale: raw.begruendung,
        }
    }
}

impl ClassificationResult {
    /// Parse and validate raw model output.
    ///
    /// Unknown fields, values outside the enumerations and broken cross-field
    /// rules all yield [`RemediaError::SchemaViolation`].
    pub fn parse(content: &str) -> Result<Self> {
        let body = strip_code_fence(content);
        let raw: RawClassification = serde_json::from_str(body).map_err(|e| {
            tracing::warn!(
                response_preview = %content.chars().take(100).collect::<String>(),
                error = %e,
                "Classification response does not match schema"
            );
            RemediaError::SchemaViolation(e.to_string())
        })?;

        let result = Self::from(raw);
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<()> {
        let violation = |message: String| Err(RemediaError::SchemaViolation(message));

        if self.upper_category.is_body() {
            if !self.sub_category.is_applicable() {
                return violation(format!(
                    "upper category '{}' requires a concrete sub category",
                    self.upper_category
                ));
            }
        } else if self.sub_category.is_applicable() {
            return violation(format!(
                "upper category '{}' must use sub category '{}', got '{}'",
                self.upper_category,
                SubCategory::NOT_APPLICABLE_LABEL,
                self.sub_category
            ));
        }

        if self.search_path.is_empty() {
            return violation("search path is empty".to_string());
        }

        if self.search_path.starts_with(UpperCategory::BODY_LABEL) {
            return violation(format!(
                "search path must not begin with '{}': '{}'",
                UpperCategory::BODY_LABEL,
                self.search_path
            ));
        }

        if self.upper_category.is_body() {
            if !self.search_path.starts_with(self.sub_category.as_str()) {
                return violation(format!(
                    "search path must begin with sub category '{}': '{}'",
                    self.sub_category, self.search_path
                ));
            }

            if self
                .search_path
                .split(',')
                .any(|segment| segment.trim() == UpperCategory::BODY_LABEL)
            {
                return violation(format!(
                    "search path must not contain '{}': '{}'",
                    UpperCategory::BODY_LABEL,
                    self.search_path
                ));
            }
        }

        Ok(())
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Strict JSON schema constraining the classification answer.
pub fn classification_schema() -> Value {
    let upper: Vec<&str> = UpperCategory::ALL.iter().map(|c| c.as_str()).collect();
    let sub: Vec<&str> = SubCategory::ALL.iter().map(|c| c.as_str()).collect();

    json!({
        "type": "object",
        "properties": {
            "Symptom": {
                "type": "string",
                "description": "Gib den Input also das Symptom wieder."
            },
            "oberKategorie": {
                "type": "string",
                "description": "Die gewählte Oberkategorie auf Basis des Symptoms.",
                "enum": upper
            },
            "unterKategorie": {
                "type": "string",
                "description": "Die spezifische Unterkategorie, falls 'Körper' als Oberkategorie gewählt wird. Sonst 'Nicht anwendbar'.",
                "enum": sub
            },
            "Suchpfad": {
                "type": "string",
                "description": "Suchpfad im Synthesis. Bei Körper-Symptomen beginnt er mit der Unterkategorie; das Wort 'Körper' steht nie im Suchpfad."
            },
            "Begründung": {
                "type": "string",
                "description": "Kurze Begründung für diese Einordnung."
            }
        },
        "required": ["Symptom", "oberKategorie", "unterKategorie", "Suchpfad", "Begründung"],
        "additionalProperties": false
    })
}
