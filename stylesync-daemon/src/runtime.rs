use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http_body::{Frame, SizeHint};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use stylesync_core::{Git, Revision, ServerConfig, SyncConfig, VersionControl};
use stylesync_sync::{pipeline, PushReport, PushRequest};

use crate::error::{io_err, DaemonError};
use crate::webhook::{evaluate, Outcome};

/// Body of every webhook response.
const RESPONSE_BODY: &str = "\n";

/// One accepted webhook request, waiting for the sync worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub revision: Revision,
}

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    secret: Option<Arc<str>>,
    jobs: mpsc::UnboundedSender<SyncJob>,
}

impl AppState {
    pub fn new(secret: Option<String>, jobs: mpsc::UnboundedSender<SyncJob>) -> Self {
        Self {
            secret: secret.map(Arc::from),
            jobs,
        }
    }

}

/// Response body that hands its job to the sync worker once hyper is done
/// with it, so the 200 goes out before the sync starts.
struct ScheduleAfterSend {
    chunk: Option<Bytes>,
    job: Option<(SyncJob, mpsc::UnboundedSender<SyncJob>)>,
}

impl ScheduleAfterSend {
    fn new(job: SyncJob, jobs: mpsc::UnboundedSender<SyncJob>) -> Self {
        Self {
            chunk: Some(Bytes::from_static(RESPONSE_BODY.as_bytes())),
            job: Some((job, jobs)),
        }
    }
}

impl http_body::Body for ScheduleAfterSend {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.chunk.take().map(|chunk| Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.chunk.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.chunk.as_ref().map_or(0, |chunk| chunk.len() as u64))
    }
}

impl Drop for ScheduleAfterSend {
    fn drop(&mut self) {
        let Some((job, jobs)) = self.job.take() else {
            return;
        };
        if jobs.send(job).is_err() {
            let err = DaemonError::ChannelClosed("sync worker");
            tracing::error!(error = %err, "webhook accepted but sync was not scheduled");
        }
    }
}

/// `GET /health` plus the webhook on every other method and path.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(webhook)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let (status, body) = match evaluate(authorization, state.secret.as_deref(), &body) {
        Outcome::Accepted(revision) => {
            tracing::info!(revision = %revision, "Updating styles to {revision}");
            let job = ScheduleAfterSend::new(SyncJob { revision }, state.jobs.clone());
            (StatusCode::OK, Body::new(job))
        }
        Outcome::Rejected(reason) => {
            tracing::warn!(reason = %reason, "webhook request rejected");
            (StatusCode::BAD_REQUEST, Body::from(RESPONSE_BODY))
        }
    };

    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

/// Start the webhook server and block the current thread until it exits.
pub fn start_blocking(config: ServerConfig) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Run the webhook server, the sync worker and the ctrl-c handler until one
/// of them stops.
pub async fn run(config: ServerConfig) -> Result<(), DaemonError> {
    config.sync.validate()?;
    if config.secret.is_none() {
        tracing::warn!("no webhook secret configured; every request will be rejected");
    }

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|e| io_err(config.listen.to_string(), e))?;
    tracing::info!(listen = %config.listen, "webhook server listening");

    let (jobs_tx, jobs_rx) = mpsc::unbounded_channel::<SyncJob>();
    let (shutdown_tx, _) = broadcast::channel::<()>(16);
    let app = router(AppState::new(config.secret.clone(), jobs_tx));
    let sync_config = Arc::new(config.sync);
    let vcs: Arc<dyn VersionControl> = Arc::new(Git::new());

    let http_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result = http_server_task(listener, app, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let worker_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result = sync_worker_task(sync_config, vcs, jobs_rx, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let mut shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down webhook server");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Task(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (http_result, worker_result, signal_result) =
        tokio::join!(http_handle, worker_handle, signal_handle);

    handle_join("http_server", http_result)?;
    handle_join("sync_worker", worker_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

async fn http_server_task(
    listener: TcpListener,
    app: Router,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let addr = listener
        .local_addr()
        .map_err(|e| io_err("tcp-listener", e))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            tracing::info!("stopping webhook server");
        })
        .await
        .map_err(|e| io_err(addr.to_string(), e))
}

/// Run queued jobs one at a time. A failed job is logged and the worker moves
/// on to the next one.
async fn sync_worker_task(
    config: Arc<SyncConfig>,
    vcs: Arc<dyn VersionControl>,
    mut jobs_rx: mpsc::UnboundedReceiver<SyncJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = jobs_rx.recv() => {
                let Some(job) = maybe_job else { break };
                let revision = job.revision.clone();
                let started = Instant::now();
                match run_job(config.clone(), vcs.clone(), job).await {
                    Ok(report) => tracing::info!(
                        revision = %revision,
                        source_commit = %report.source_commit,
                        added = report.added,
                        updated = report.updated,
                        skipped = report.skipped,
                        deleted = report.deleted,
                        pushed = report.pushed,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "sync completed"
                    ),
                    Err(err) => tracing::error!(revision = %revision, error = %err, "sync failed"),
                }
            }
        }
    }

    Ok(())
}

/// Run one non-dry-run push cycle on the blocking pool.
async fn run_job(
    config: Arc<SyncConfig>,
    vcs: Arc<dyn VersionControl>,
    job: SyncJob,
) -> Result<PushReport, DaemonError> {
    let request = PushRequest {
        revision: job.revision,
        dry_run: false,
    };
    let report = tokio::task::spawn_blocking(move || pipeline::run(&config, vcs.as_ref(), &request))
        .await
        .map_err(|err| DaemonError::Task(format!("sync task join error: {err}")))??;
    Ok(report)
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task(format!("{task} task join failure: {err}"))),
    }
}

/// Install the `tracing` subscriber on stderr; `RUST_LOG` overrides the `info`
/// default. Records from the `log` facade are forwarded to it as well.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
