//! Serve loop with graceful shutdown.

use crate::router::build_router;
use crate::AppState;
use log::{info, warn};
use std::future::Future;
use tokio::net::TcpListener;

/// Serves the router on `listener` until `shutdown` resolves.
///
/// In-flight requests are drained before this returns.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("event=server_start module=api status=ok addr={addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("event=server_stop module=api status=ok addr={addr}");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("event=shutdown_signal module=api status=ok signal=ctrl_c"),
        Err(err) => warn!(
            "event=shutdown_signal module=api status=error error_code=signal_listen_failed error={}",
            err
        ),
    }
}
