//! Web form surface.
//!
//! A single HTML page plus a small JSON API over the same [`Interaction`]
//! the CLI uses. Memory is kept per session id; the query log is shared.

mod page;
pub mod routes;

pub use routes::{AppState, router};

use std::sync::Arc;

use tracing::info;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 8501;

/// Serves the web form until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let router = router(state);
    let addr = format!("{host}:{port}");
    let tcp_listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "web form listening");

    // stdout stays free for command output
    #[allow(clippy::print_stderr)]
    {
        eprintln!("research-assistant listening on http://{addr}/");
    }

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
