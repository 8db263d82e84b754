use super::*;
use crate::config::{Config, UpstreamConfig};
use crate::error::Error;
use crate::report::{PdfReportRenderer, ReportRenderer};
use crate::session::SessionStore;
use crate::types::StudentDetail;
use crate::ReportService;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::{MockServer, ResponseTemplate};


/// Renderer that always fails, for exercising the render error path
struct FailingRenderer;

impl ReportRenderer for FailingRenderer {
    fn render(
        &self,
        _student: &StudentDetail,
        _generated_on: chrono::NaiveDate,
    ) -> crate::Result<Vec<u8>> {
        Err(Error::Render("layout exploded".into()))
    }
}

fn config_for(server: &MockServer) -> Config {
    Config {
        upstream: UpstreamConfig {
            backend_url: format!("{}/api/v1", server.uri()),
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Service wired against a mock upstream, plus its session store
fn service_for(
    server: &MockServer,
    renderer: Arc<dyn ReportRenderer>,
) -> (ReportService, Arc<SessionStore>) {
    let service = ReportService::with_renderer(config_for(server), renderer).unwrap();
    let store = service.session_store().clone();
    (service, store)
}

fn pdf_service_for(server: &MockServer) -> (ReportService, Arc<SessionStore>) {
    service_for(server, Arc::new(PdfReportRenderer))
}

fn login_ok(access: &str, refresh: &str, csrf: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header("Set-Cookie", format!("accessToken={access}; Path=/; HttpOnly"))
        .append_header("Set-Cookie", format!("refreshToken={refresh}; Path=/; HttpOnly"))
        .append_header("Set-Cookie", format!("csrfToken={csrf}; Path=/"))
        .set_body_json(serde_json::json!({
            "accessToken": access,
            "user": {"id": 1, "name": "Admin", "role": "admin"}
        }))
}

fn student_json(id: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": "Ada Lovelace",
        "email": "ada@school.example",
        "systemAccess": true,
        "phone": "555-0100",
        "gender": "Female",
        "dob": "2012-12-10",
        "class": "Grade 5",
        "section": "A",
        "roll": "12",
        "fatherName": "George Byron",
        "motherName": "Anne Milbanke",
        "currentAddress": "12 Park Lane",
        "permanentAddress": "12 Park Lane",
        "admissionDate": "2020-09-01",
        "reporterName": "Principal Skinner"
    })
}

async fn get(service: &ReportService, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let app = create_router(service.state());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = MockServer::start().await;
    let (service, _) = pdf_service_for(&server);

    let (status, _, _) = get(&service, "/api/v1/teachers/1/report").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_serves_on_bound_listener_and_shuts_down() {
    let server = MockServer::start().await;
    let (service, _) = pdf_service_for(&server);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(serve(listener, service.state(), async move {
        stop_rx.await.ok();
    }));

    let response = reqwest::get(format!("http://{address}/health")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not shut down")
        .unwrap();
    assert!(result.is_ok());
}
