//! HTTP side of the mock collector.
//!
//! Every request, whatever its method or path, is answered with the same
//! 1x1 transparent GIF so the tracker never enters its retry path. Only `GET`
//! requests are recorded; a query string that cannot be decoded is answered
//! but not recorded.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use beacon_core::RequestLog;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::CollectorConfig;
use crate::error::{CollectorError, CollectorResult};
use crate::query::parse_query;

/// 1x1 transparent GIF served for every request.
pub const TRANSPARENT_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xdb, 0xdf,
    0xef, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

/// Router recording into `log`.
pub fn router(log: RequestLog) -> Router {
    Router::new().fallback(collect).with_state(log)
}

async fn collect(State(log): State<RequestLog>, method: Method, uri: Uri) -> impl IntoResponse {
    if method == Method::GET {
        match parse_query(uri.query().unwrap_or_default()) {
            Ok(entry) => {
                tracing::debug!(path = uri.path(), params = entry.len(), "captured request");
                log.append(entry);
            }
            Err(err) => {
                tracing::warn!(path = uri.path(), error = %err, "request not logged");
            }
        }
    } else {
        tracing::debug!(%method, path = uri.path(), "acknowledged without logging");
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/gif")],
        TRANSPARENT_GIF,
    )
}

/// Entry point for starting a collector.
#[derive(Debug, Default)]
pub struct MockCollector;

impl MockCollector {
    /// Bind `config.bind` and serve in a background task.
    ///
    /// Port 0 picks a free port; see [`CollectorHandle::local_addr`].
    ///
    /// # Errors
    /// Returns `CollectorError::Bind` if the socket cannot be bound.
    pub async fn start(config: &CollectorConfig, log: RequestLog) -> CollectorResult<CollectorHandle> {
        let addr = config.bind;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| CollectorError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| CollectorError::Bind { addr, source })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(log.clone());
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .map_err(CollectorError::Serve)
        });

        tracing::info!(%local_addr, "collector mock running");
        Ok(CollectorHandle {
            local_addr,
            log,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// Running collector.
#[derive(Debug)]
pub struct CollectorHandle {
    local_addr: SocketAddr,
    log: RequestLog,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<CollectorResult<()>>,
}

impl CollectorHandle {
    /// Address actually bound.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://host:port` of the collector.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// The log this collector appends to.
    #[must_use]
    pub const fn log(&self) -> &RequestLog {
        &self.log
    }

    /// Stop accepting requests and wait for the server task.
    ///
    /// # Errors
    /// Returns `CollectorError::Serve` if the server failed or panicked.
    pub async fn shutdown(self) -> CollectorResult<()> {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(CollectorError::Serve(std::io::Error::other(err))),
        }
    }
}
