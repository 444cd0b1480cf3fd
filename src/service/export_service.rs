//! Export service: renders attendee lists to CSV, PDF, or Excel files.
//!
//! Formats are a closed enum dispatched to pure render functions that
//! produce byte buffers; only the final write touches the filesystem.
//! Generated filenames embed the event id and a millisecond timestamp
//! so concurrent exports do not collide. The caller owns the produced
//! file and triggers [`ExportService::cleanup`] once it has been
//! delivered.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use genpdf::elements::{Break, Paragraph, TableLayout};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventId, ParticipantRecord};
use crate::error::ApiError;

/// Column headers shared by all three renderers.
const HEADER: [&str; 8] = [
    "First name",
    "Last name",
    "Email",
    "Phone",
    "Organization",
    "Age",
    "Gender",
    "Registered at",
];

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// PDF document with a participant table.
    Pdf,
    /// Excel workbook (xlsx).
    Excel,
}

impl ExportFormat {
    /// All supported formats, for the catalog endpoint.
    pub const ALL: [Self; 3] = [Self::Csv, Self::Pdf, Self::Excel];

    /// Parses a caller-supplied format string.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for unsupported formats.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            "excel" | "xlsx" => Ok(Self::Excel),
            other => Err(ApiError::InvalidRequest(format!(
                "unsupported export format: {other}"
            ))),
        }
    }

    /// File extension for the format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Excel => "xlsx",
        }
    }

    /// MIME type for download responses.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Pdf => "application/pdf",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Renders participant lists to files in the export directory.
#[derive(Debug, Clone)]
pub struct ExportService {
    export_dir: PathBuf,
    pdf_font_dir: PathBuf,
    pdf_font_family: String,
}

impl ExportService {
    /// Creates a new `ExportService`.
    #[must_use]
    pub fn new(export_dir: PathBuf, pdf_font_dir: PathBuf, pdf_font_family: String) -> Self {
        Self {
            export_dir,
            pdf_font_dir,
            pdf_font_family,
        }
    }

    /// Renders the given participants and writes the artifact to disk,
    /// returning its path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EmptyExport`] if the participant list is
    /// empty (no file is created), or [`ApiError::ExportFailure`] if
    /// rendering or writing fails.
    pub async fn export(
        &self,
        participants: &[ParticipantRecord],
        event_id: EventId,
        format: ExportFormat,
    ) -> Result<PathBuf, ApiError> {
        if participants.is_empty() {
            return Err(ApiError::EmptyExport(event_id.to_string()));
        }

        let bytes = match format {
            ExportFormat::Csv => render_csv(participants)?,
            ExportFormat::Pdf => {
                render_pdf(participants, &self.pdf_font_dir, &self.pdf_font_family)?
            }
            ExportFormat::Excel => render_xlsx(participants)?,
        };

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| ApiError::ExportFailure(format!("create export dir: {e}")))?;

        let file_name = format!(
            "event-{event_id}-participants-{}.{}",
            Utc::now().timestamp_millis(),
            format.extension()
        );
        let path = self.export_dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ApiError::ExportFailure(format!("write {}: {e}", path.display())))?;

        tracing::info!(%event_id, %format, path = %path.display(), rows = participants.len(), "participant list exported");
        Ok(path)
    }

    /// Best-effort removal of a delivered export file.
    pub async fn cleanup(&self, path: &Path) {
        if let Err(err) = tokio::fs::remove_file(path).await
            && err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), %err, "export cleanup failed");
        }
    }
}

/// One output row per participant; missing optionals render as `N/A`.
fn row_values(participant: &ParticipantRecord) -> [String; 8] {
    [
        participant.first_name.clone(),
        participant.last_name.clone(),
        participant.email.clone(),
        participant.phone.clone(),
        participant
            .organization
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        participant
            .age
            .map_or_else(|| "N/A".to_string(), |age| age.to_string()),
        participant
            .gender
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        participant.created_at.format("%Y-%m-%d").to_string(),
    ]
}

fn render_csv(participants: &[ParticipantRecord]) -> Result<Vec<u8>, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| ApiError::ExportFailure(e.to_string()))?;
    for participant in participants {
        writer
            .write_record(row_values(participant))
            .map_err(|e| ApiError::ExportFailure(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ApiError::ExportFailure(e.to_string()))
}

fn render_pdf(
    participants: &[ParticipantRecord],
    font_dir: &Path,
    font_family: &str,
) -> Result<Vec<u8>, ApiError> {
    let family = genpdf::fonts::from_files(font_dir, font_family, None)
        .map_err(|e| ApiError::ExportFailure(format!("font load: {e}")))?;

    let mut doc = genpdf::Document::new(family);
    doc.set_title("Participant list");

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(12);
    doc.set_page_decorator(decorator);
    doc.set_font_size(10);

    doc.push(Paragraph::new(format!(
        "Registered participants: {}",
        participants.len()
    )));
    doc.push(Break::new(1));

    let mut table = TableLayout::new(vec![2, 2, 3, 2, 2, 1, 1, 2]);
    let mut row = table.row();
    for header in HEADER {
        row.push_element(Paragraph::new(header));
    }
    row.push()
        .map_err(|e| ApiError::ExportFailure(e.to_string()))?;

    for participant in participants {
        let mut row = table.row();
        for value in row_values(participant) {
            row.push_element(Paragraph::new(value));
        }
        row.push()
            .map_err(|e| ApiError::ExportFailure(e.to_string()))?;
    }
    doc.push(table);

    let mut bytes = Vec::new();
    doc.render(&mut bytes)
        .map_err(|e| ApiError::ExportFailure(e.to_string()))?;
    Ok(bytes)
}

fn render_xlsx(participants: &[ParticipantRecord]) -> Result<Vec<u8>, ApiError> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in HEADER.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| ApiError::ExportFailure(e.to_string()))?;
    }
    for (row, participant) in participants.iter().enumerate() {
        for (col, value) in row_values(participant).iter().enumerate() {
            worksheet
                .write_string(row as u32 + 1, col as u16, value)
                .map_err(|e| ApiError::ExportFailure(e.to_string()))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ApiError::ExportFailure(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::participant::NewParticipant;
    use std::collections::HashSet;

    fn make_participant(email: &str, organization: Option<&str>) -> ParticipantRecord {
        ParticipantRecord::new(
            NewParticipant {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                email: email.to_string(),
                phone: "+33612345678".to_string(),
                organization: organization.map(str::to_string),
                age: Some(30),
                gender: None,
            },
            HashSet::new(),
        )
    }

    fn make_service(dir: &Path) -> ExportService {
        ExportService::new(
            dir.to_path_buf(),
            PathBuf::from("/nonexistent/fonts"),
            "LiberationSans".to_string(),
        )
    }

    #[test]
    fn format_parse_accepts_aliases() {
        assert_eq!(ExportFormat::parse("csv").ok(), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("PDF").ok(), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("xlsx").ok(), Some(ExportFormat::Excel));
        assert_eq!(ExportFormat::parse("excel").ok(), Some(ExportFormat::Excel));
        assert!(matches!(
            ExportFormat::parse("docx"),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn empty_list_fails_without_creating_a_file() {
        let dir = tempfile::tempdir().ok();
        let Some(dir) = dir else {
            panic!("tempdir failed");
        };
        let service = make_service(dir.path());

        let result = service.export(&[], EventId::new(), ExportFormat::Csv).await;
        assert!(matches!(result, Err(ApiError::EmptyExport(_))));

        let entries = std::fs::read_dir(dir.path()).ok().map(Iterator::count);
        assert_eq!(entries, Some(0));
    }

    #[tokio::test]
    async fn csv_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().ok();
        let Some(dir) = dir else {
            panic!("tempdir failed");
        };
        let service = make_service(dir.path());
        let event_id = EventId::new();
        let participants = vec![
            make_participant("a@example.com", Some("Acme")),
            make_participant("b@example.com", None),
        ];

        let result = service
            .export(&participants, event_id, ExportFormat::Csv)
            .await;
        let Ok(path) = result else {
            panic!("export failed");
        };
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        assert!(file_name.contains(&event_id.to_string()));
        assert!(file_name.ends_with(".csv"));

        let content = std::fs::read_to_string(&path).unwrap_or_default();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("First name"));
        assert!(content.contains("a@example.com"));
        assert!(content.contains("N/A"));
    }

    #[tokio::test]
    async fn excel_export_writes_a_workbook() {
        let dir = tempfile::tempdir().ok();
        let Some(dir) = dir else {
            panic!("tempdir failed");
        };
        let service = make_service(dir.path());
        let participants = vec![make_participant("a@example.com", None)];

        let result = service
            .export(&participants, EventId::new(), ExportFormat::Excel)
            .await;
        let Ok(path) = result else {
            panic!("export failed");
        };
        let metadata = std::fs::metadata(&path).ok();
        let Some(metadata) = metadata else {
            panic!("missing file");
        };
        assert!(metadata.len() > 0);
        assert!(path.extension().is_some_and(|ext| ext == "xlsx"));
    }

    #[tokio::test]
    async fn cleanup_removes_the_file_and_tolerates_misses() {
        let dir = tempfile::tempdir().ok();
        let Some(dir) = dir else {
            panic!("tempdir failed");
        };
        let service = make_service(dir.path());
        let participants = vec![make_participant("a@example.com", None)];

        let result = service
            .export(&participants, EventId::new(), ExportFormat::Csv)
            .await;
        let Ok(path) = result else {
            panic!("export failed");
        };
        assert!(path.exists());

        service.cleanup(&path).await;
        assert!(!path.exists());

        // A second cleanup of the same path is a silent no-op.
        service.cleanup(&path).await;
    }
}
