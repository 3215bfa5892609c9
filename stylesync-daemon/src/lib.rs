//! Webhook server: accepts push notifications over HTTP and runs the sync
//! pipeline on a background worker.

mod error;
mod runtime;
pub mod webhook;

pub use error::DaemonError;
pub use runtime::{init_tracing, router, run, start_blocking, AppState, SyncJob};
pub use webhook::{authorize, evaluate, parse_target, Outcome};
