//! Background worker mode.

use mindia::Mindia;
use mindia_error::MindiaResult;

/// Run the scheduler and collector until Ctrl-C, then stop them between
/// ticks.
pub async fn serve(mindia: &Mindia) -> MindiaResult<()> {
    let workers = mindia.start();
    tracing::info!("Running, press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C, stopping");
    }

    workers.stop().await?;
    let snapshot = mindia.metrics().snapshot();
    tracing::info!(
        requests = snapshot.media_requests,
        bandwidth = snapshot.bandwidth_bytes,
        data_bytes = snapshot.data_storage_bytes,
        cache_bytes = snapshot.cache_storage_bytes,
        "Shut down"
    );
    Ok(())
}
