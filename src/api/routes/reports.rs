//! Report handler: fetch a student record and stream it back as a PDF.

use crate::api::AppState;
use crate::error::Result;
use crate::report::report_filename;
use crate::types::StudentId;
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

/// GET /api/v1/students/:id/report - Download a student's report
///
/// The id is validated before any upstream traffic. The report is stamped
/// with the server's local date.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/report",
    tag = "reports",
    params(
        ("id" = String, Path, description = "Student id, a positive integer")
    ),
    responses(
        (status = 200, description = "PDF report", content_type = "application/pdf"),
        (status = 400, description = "Invalid student ID", content_type = "text/plain"),
        (status = 404, description = "Student not found", content_type = "text/plain"),
        (status = 500, description = "Error fetching student data or generating PDF", content_type = "text/plain")
    )
)]
pub async fn student_report(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: StudentId = raw_id.parse()?;

    let student = state.fetcher.fetch(id).await?;

    let generated_on = chrono::Local::now().date_naive();
    let document = state.renderer.render(&student, generated_on)?;

    tracing::info!(student_id = %id, bytes = document.len(), "report generated");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, state.renderer.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", report_filename(id.get())),
            ),
        ],
        document,
    ))
}
