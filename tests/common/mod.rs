//! Shared helpers for end-to-end tests: a mock upstream and a running service

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use student_report::config::{Config, UpstreamConfig};
use student_report::{ReportService, api};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Service bound to an ephemeral local port
pub struct RunningService {
    pub service: ReportService,
    pub address: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<student_report::Result<()>>,
}

impl RunningService {
    /// Base URL of the running service
    pub fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.address, route)
    }

    /// Trigger graceful shutdown and wait for the server task to finish
    pub async fn shutdown(mut self) -> student_report::Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not shut down in time")
            .expect("server task panicked")
    }
}

/// Configuration pointing at the mock upstream
pub fn config_for(upstream: &MockServer) -> Config {
    Config {
        upstream: UpstreamConfig {
            backend_url: format!("{}/api/v1", upstream.uri()),
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Build the service, perform the startup login, and serve on 127.0.0.1:0
pub async fn start_service(upstream: &MockServer) -> RunningService {
    let service = ReportService::new(config_for(upstream)).expect("service builds");
    service.authenticate().await.expect("startup login succeeds");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = listener.local_addr().expect("local address");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(api::serve(listener, service.state(), async move {
        stop_rx.await.ok();
    }));

    RunningService {
        service,
        address,
        stop: Some(stop_tx),
        handle,
    }
}

/// Successful login response setting all three session cookies
pub fn login_ok(access: &str, refresh: &str, csrf: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header("Set-Cookie", format!("accessToken={access}; Path=/; HttpOnly"))
        .append_header("Set-Cookie", format!("refreshToken={refresh}; Path=/; HttpOnly"))
        .append_header("Set-Cookie", format!("csrfToken={csrf}; Path=/"))
        .set_body_json(serde_json::json!({
            "accessToken": access,
            "user": {"id": 1, "name": "Admin", "role": "admin"}
        }))
}

/// Mount a login endpoint that always succeeds with the given tokens
pub async fn mount_login(upstream: &MockServer, access: &str, refresh: &str, csrf: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(login_ok(access, refresh, csrf))
        .mount(upstream)
        .await;
}

/// A complete upstream student record
pub fn student_json(id: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": "Grace Hopper",
        "email": "grace@school.example",
        "systemAccess": false,
        "phone": "555-0199",
        "gender": "Female",
        "dob": "2011-12-09",
        "class": "Grade 6",
        "section": "B",
        "roll": 4,
        "fatherName": "Walter Murray",
        "fatherPhone": "555-0101",
        "motherName": "Mary Campbell",
        "motherPhone": "555-0102",
        "guardianName": null,
        "currentAddress": "1 Harbor Road",
        "permanentAddress": "1 Harbor Road",
        "admissionDate": "2019-09-01",
        "reporterName": "Vice Principal"
    })
}
