use log::info;
use serde::Serialize;
use std::path::Path;

use super::{write_output, DocumentRenderer, FontFace, RenderError};
use crate::domain::models::report::ReportDocument;

/// Writes the document model itself as pretty-printed JSON
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

#[derive(Serialize)]
struct JsonReport<'a> {
    font_family: &'a str,
    document: &'a ReportDocument,
}

impl DocumentRenderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(
        &self,
        document: &ReportDocument,
        font: &FontFace,
        path: &Path,
    ) -> Result<(), RenderError> {
        let report = JsonReport {
            font_family: &font.family,
            document,
        };
        let json = serde_json::to_string_pretty(&report)?;
        write_output(path, json.as_bytes())?;

        info!("Wrote {} report to {}", document.kind, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::report::{Block, PageSize};
    use shared::ReportKind;
    use tempfile::TempDir;

    #[test]
    fn test_json_report_contains_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        let mut document =
            ReportDocument::new(ReportKind::CarSummary, "Car report: Lada Vesta", PageSize::A4, 56.0);
        document.push(Block::Paragraph {
            text: "Plate: A123BC77".to_string(),
            font_size: 10.0,
        });

        JsonRenderer
            .render(&document, &FontFace::fallback("DejaVu Sans"), &path)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["font_family"], "DejaVu Sans");
        assert_eq!(value["document"]["title"], "Car report: Lada Vesta");
        assert_eq!(value["document"]["kind"], "CarSummary");
    }
}
