mod api;
mod db;
mod issue;
mod metrics;
mod pdf;
mod render;
mod state;
mod storage;
mod store;
#[cfg(test)]
mod testing;

use crate::db::init_db;
use crate::pdf::ChromiumEngine;
use crate::render::TemplateAssets;
use crate::state::AppState;
use crate::storage::{ArtifactLocator, S3ArtifactStore};
use crate::store::SeaOrmCertificateStore;
use anyhow::{Result, anyhow};
use aws_config::BehaviorVersion;
use certify_common::config::AppConfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;

    let db = init_db(&config.database_url).await?;
    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3 = aws_sdk_s3::Client::new(&aws);

    let state = AppState {
        records: Arc::new(SeaOrmCertificateStore::new(db)),
        artifacts: Arc::new(S3ArtifactStore::new(s3, config.bucket.clone())),
        renderer: Arc::new(ChromiumEngine::new(
            config.launch.clone(),
            config.chrome_executable.clone(),
        )),
        assets: TemplateAssets::new(config.templates_dir.clone()),
        locator: ArtifactLocator::new(
            config.public_base_url.clone(),
            config.artifact_extension.clone(),
        ),
        debug_output: config.launch.local_debug_output.clone(),
    };
    info!(
        offline = config.is_offline,
        bucket = %config.bucket,
        templates = %config.templates_dir.display(),
        "certificate functions configured"
    );

    let app = api::router(state);

    if config.lambda_runtime {
        info!("serving through the lambda runtime");
        return lambda_http::run(app)
            .await
            .map_err(|err| anyhow!("lambda runtime exited: {}", err));
    }

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("certificate functions listening on {}", config.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;

    Ok(())
}
