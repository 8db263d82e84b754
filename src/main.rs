use std::process::ExitCode;
use student_report::{Config, ReportService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "student-report exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> student_report::Result<()> {
    let config = Config::from_env()?;
    tracing::info!(
        bind_address = %config.api.bind_address,
        backend_url = %config.upstream.backend_url,
        admin = %config.admin.email,
        "configuration loaded"
    );

    let service = ReportService::new(config)?;

    // Without an initial session the service cannot serve anything
    service.authenticate().await?;

    service.serve().await
}
