use crate::error::{RemediaError, Result};
use crate::models::AggregatedRemedy;

/// Render the aggregated report as a delimited table with a header row.
pub fn to_csv(rows: &[AggregatedRemedy], delimiter: char) -> Result<String> {
    if !delimiter.is_ascii() {
        return Err(RemediaError::Validation(format!(
            "Report delimiter must be a single ASCII character, got '{delimiter}'"
        )));
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(["abbreviation", "description", "total_occurrence", "total_degree"])?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RemediaError::Internal(format!("Failed to flush report: {e}")))?;

    String::from_utf8(bytes)
        .map_err(|e| RemediaError::Internal(format!("Report is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(abbreviation: &str, description: &str, occurrence: u32, degree: i64) -> AggregatedRemedy {
        AggregatedRemedy {
            abbreviation: abbreviation.to_string(),
            description: description.to_string(),
            total_occurrence: occurrence,
            total_degree: degree,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let csv = to_csv(&[row("Ars.", "Arsenicum album", 2, 5)], ',').unwrap();
        assert_eq!(
            csv,
            "abbreviation,description,total_occurrence,total_degree\nArs.,Arsenicum album,2,5\n"
        );
    }

    #[test]
    fn empty_report_has_only_header() {
        let csv = to_csv(&[], ',').unwrap();
        assert_eq!(csv, "abbreviation,description,total_occurrence,total_degree\n");
    }

    #[test]
    fn custom_delimiter_and_quoting() {
        let csv = to_csv(&[row("Nux-v.", "Nux vomica; Brechnuss", 1, 3)], ';').unwrap();
        assert_eq!(
            csv,
            "abbreviation;description;total_occurrence;total_degree\nNux-v.;\"Nux vomica; Brechnuss\";1;3\n"
        );
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        assert!(matches!(
            to_csv(&[], '§').unwrap_err(),
            RemediaError::Validation(_)
        ));
    }
}
