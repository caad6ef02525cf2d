use clap::Parser;

use forgeseed_cli::Cli;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    forgeseed_observability::init(cli.log_format);

    // Ctrl-C stops any step that has not started yet.
    let token = forgeseed_infra::CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling");
            on_interrupt.cancel();
        }
    });

    match forgeseed_cli::run(&cli, token).await {
        Ok(report) => {
            tracing::info!(
                created = report.result.created,
                entity_id = %report.result.entity_id,
                warnings = report.result.warnings.len(),
                "seed applied"
            );
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "seed failed");
            std::process::ExitCode::from(err.exit_code())
        }
    }
}
