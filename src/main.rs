use clap::Parser;
use hetzbot::utils::logger;
use hetzbot::{
    CliConfig, HcloudClient, LocalStorage, RotationEngine, RotationError, RotationOutcome,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.log_format, config.verbose);

    match run(config).await {
        Ok(outcome) => {
            let certificates: Vec<i64> = outcome.certificates.iter().map(|c| c.id).collect();
            tracing::info!(
                state = ?outcome.state,
                load_balancer_id = outcome.load_balancer_id,
                listen_port = outcome.listen_port,
                new_certificate_id = outcome.new_certificate.id,
                new_certificate_name = %outcome.new_certificate.name,
                retired_certificate_id = ?outcome.retired_certificate.as_ref().map(|c| c.id),
                certificates = ?certificates,
                "✅ Certificate rotation completed"
            );
        }
        Err(e) => {
            // 單一筆結構化錯誤記錄，之後以非零碼結束
            tracing::error!(
                step = e.step(),
                kind = ?e.kind(),
                error = %e,
                suggestion = e.recovery_suggestion(),
                "❌ Certificate rotation failed"
            );
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(config: CliConfig) -> hetzbot::Result<RotationOutcome> {
    let settings = config.into_settings()?;
    tracing::debug!("Settings: {:?}", settings);

    let api = HcloudClient::new(
        &settings.api_endpoint,
        &settings.token,
        settings.request_timeout,
    )
    .map_err(|source| RotationError::ClientError { source })?;
    let storage = LocalStorage::new(settings.lineage_path.clone());

    let engine = RotationEngine::new(api, storage, settings);
    engine.run().await
}
