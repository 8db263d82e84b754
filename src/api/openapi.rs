//! OpenAPI documentation for the report service

use utoipa::OpenApi;

/// OpenAPI documentation for the student-report REST API
///
/// Served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "student-report REST API",
        version = "0.1.0",
        description = "PDF report generation for student records held by the school management API",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5008", description = "Local development server")
    ),
    paths(
        crate::api::routes::student_report,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::HealthStatus,
    )),
    tags(
        (name = "reports", description = "Student report documents"),
        (name = "system", description = "System endpoints - Health checks and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
