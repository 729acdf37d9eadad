//! Speech enhancement with a pluggable external backend and a deterministic fallback.
//!
//! Mode selection happens once per call, no retries:
//! - **Backend mode** when both a credential and a backend are configured: the noisy signal
//!   is submitted to the backend under a timeout and its output returned directly.
//! - **Fallback mode** otherwise, and whenever the backend errors or times out: a linear
//!   blend between the noisy signal and the clean reference.
//!
//! The fallback is a first-class branch on the backend's `Result`, not an incidental
//! catch-all, and every transition into it is logged. Enhancement never fails the
//! user-visible pipeline.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::opts::Opts;

/// Pluggable enhancement backend used by [`Enhancer`].
///
/// The contract is fixed at integration time: a single method taking float samples and a
/// credential, returning float samples of the same length. Implementations may block; the
/// enhancer runs them on a worker thread bounded by a timeout and treats expiry as failure.
pub trait EnhanceBackend: Send + Sync {
    /// Enhance `samples` toward clean speech.
    fn enhance(&self, samples: &[f32], credential: &str) -> Result<Vec<f32>>;
}

/// Speech enhancer.
///
/// Owns the backend configuration; the clean reference is passed into every call so the
/// enhancer itself carries no hidden signal state.
pub struct Enhancer {
    backend: Option<Arc<dyn EnhanceBackend>>,
    credential: Option<String>,
    backend_timeout: Duration,
}

impl Enhancer {
    /// Build an enhancer from library options, with no backend installed.
    pub fn new(opts: &Opts) -> Self {
        Self {
            backend: None,
            credential: opts.api_credential.clone(),
            backend_timeout: opts.backend_timeout,
        }
    }

    /// Install an external enhancement backend.
    pub fn with_backend(mut self, backend: Arc<dyn EnhanceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Whether the next call will attempt backend mode.
    pub fn backend_mode(&self) -> bool {
        self.backend.is_some() && self.credential.is_some()
    }

    /// Enhance `noisy` toward `clean`. Both signals must share a length.
    ///
    /// In backend mode the backend's output is returned as-is; `enhancement_level` only
    /// shapes the fallback blend, where level 0 reproduces the noisy input exactly and
    /// level 1 reproduces the clean reference exactly.
    ///
    /// Backend errors and timeouts redirect to the fallback; this method never fails.
    pub fn enhance(&self, noisy: &[f32], enhancement_level: f32, clean: &[f32]) -> Vec<f32> {
        if let (Some(backend), Some(credential)) = (&self.backend, &self.credential) {
            match run_backend(
                Arc::clone(backend),
                noisy.to_vec(),
                credential.clone(),
                self.backend_timeout,
            ) {
                Ok(enhanced) => return enhanced,
                Err(err) => {
                    warn!(error = %err, "enhancement backend failed, using fallback blend");
                }
            }
        } else {
            debug!("no enhancement backend configured, using fallback blend");
        }

        blend(noisy, clean, enhancement_level)
    }
}

/// Deterministic fallback: `noisy * (1 - level) + clean * level`, elementwise.
pub fn blend(noisy: &[f32], clean: &[f32], level: f32) -> Vec<f32> {
    noisy
        .iter()
        .zip(clean)
        .map(|(&n, &c)| n * (1.0 - level) + c * level)
        .collect()
}

/// Run one backend call on a worker thread, bounded by `timeout`.
///
/// The backend call itself has no cancellation point; on expiry the worker is abandoned
/// and its eventual result is dropped along with the channel.
fn run_backend(
    backend: Arc<dyn EnhanceBackend>,
    samples: Vec<f32>,
    credential: String,
    timeout: Duration,
) -> Result<Vec<f32>> {
    let (tx, rx) = mpsc::sync_channel(1);

    thread::spawn(move || {
        let result = backend.enhance(&samples, &credential);
        // The receiver may have given up already; a failed send is not an error.
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(Error::msg(format!(
            "enhancement backend timed out after {timeout:?}"
        ))),
    }
}
