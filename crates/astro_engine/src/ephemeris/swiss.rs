use crate::bodies::Body;
use crate::ephemeris::types::{Backend, EphemerisError, EphemerisProvider, PlanetPosition};
use crate::time::JulianDay;
use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use swisseph::swe;
use tokio::sync::{mpsc, oneshot};

/// FLG_SWIEPH: use Swiss Ephemeris files
const FLG_SWIEPH: i32 = 2;
/// FLG_SPEED: also compute daily motion
const FLG_SPEED: i32 = 256;

pub const DEFAULT_EPHEMERIS_PATH: &str = "/usr/local/share/swisseph";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Explicit path, else `SWISS_EPHEMERIS_PATH`, else the system default.
pub fn resolve_ephemeris_path(ephemeris_path: Option<PathBuf>) -> PathBuf {
    ephemeris_path.unwrap_or_else(|| {
        env::var("SWISS_EPHEMERIS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_EPHEMERIS_PATH))
    })
}

/// Check that `path` is a directory holding at least one `.se1` data file.
pub fn validate_ephemeris_dir(path: &Path) -> Result<(), EphemerisError> {
    let unavailable = |message: &str| EphemerisError::Unavailable {
        path: path.display().to_string(),
        message: message.to_string(),
    };

    if !path.is_dir() {
        return Err(unavailable(
            "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.",
        ));
    }
    let entries = path
        .read_dir()
        .map_err(|e| unavailable(&format!("Cannot read ephemeris directory: {}", e)))?;
    let has_data = entries
        .filter_map(Result::ok)
        .any(|entry| entry.path().extension().map_or(false, |ext| ext == "se1"));
    if !has_data {
        return Err(unavailable("No .se1 data files found"));
    }
    Ok(())
}

enum Request {
    Position {
        body: Body,
        julian_day: JulianDay,
        reply: oneshot::Sender<Result<PlanetPosition, EphemerisError>>,
    },
    Shutdown,
}

/// Swiss Ephemeris backed provider.
///
/// The C library keeps global state and is not reentrant, so a single named worker
/// thread owns every call into it, from `swe_set_ephe_path` at start to `swe_close`
/// at exit. Callers queue requests on a channel and await the reply; any number of
/// tasks can share one provider.
pub struct PreciseProvider {
    ephemeris_path: PathBuf,
    timeout: Duration,
    sender: mpsc::UnboundedSender<Request>,
    worker: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl PreciseProvider {
    /// Validate the data directory and start the worker.
    pub fn start(
        ephemeris_path: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, EphemerisError> {
        let path = resolve_ephemeris_path(ephemeris_path);
        validate_ephemeris_dir(&path)?;

        let data_path = path
            .to_str()
            .filter(|p| !p.contains('\0'))
            .map(str::to_string)
            .ok_or_else(|| EphemerisError::Unavailable {
                path: path.display().to_string(),
                message: "Ephemeris path must be UTF-8 without NUL bytes".to_string(),
            })?;

        let (sender, receiver) = mpsc::unbounded_channel::<Request>();
        let worker = thread::Builder::new()
            .name("swisseph".to_string())
            .spawn(move || run_worker(data_path, receiver))
            .map_err(|e| EphemerisError::Unavailable {
                path: path.display().to_string(),
                message: format!("Failed to spawn ephemeris worker: {}", e),
            })?;

        log::info!("Swiss Ephemeris worker started with data path {}", path.display());

        Ok(Self {
            ephemeris_path: path,
            timeout,
            sender,
            worker: Mutex::new(Some(worker)),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn ephemeris_path(&self) -> &Path {
        &self.ephemeris_path
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst) && !self.sender.is_closed()
    }

    /// Stop the worker after it drains queued requests.
    ///
    /// Outside a tokio runtime this blocks until the worker has exited. Inside one,
    /// the join is handed to `spawn_blocking` so no runtime thread is parked on it.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.sender.send(Request::Shutdown);
        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(handle) = handle else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(move || join_worker(handle));
            }
            Err(_) => join_worker(handle),
        }
    }
}

fn join_worker(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        log::error!("Swiss Ephemeris worker panicked");
    }
}

impl Drop for PreciseProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait]
impl EphemerisProvider for PreciseProvider {
    fn name(&self) -> &str {
        "swisseph"
    }

    fn preferred_backend(&self) -> Backend {
        Backend::Precise
    }

    async fn position_of(
        &self,
        body: Body,
        julian_day: JulianDay,
    ) -> Result<PlanetPosition, EphemerisError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(EphemerisError::WorkerStopped);
        }
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Request::Position {
                body,
                julian_day,
                reply,
            })
            .map_err(|_| EphemerisError::WorkerStopped)?;

        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(EphemerisError::WorkerStopped),
            Err(_) => Err(EphemerisError::Timeout {
                body,
                millis: self.timeout.as_millis() as u64,
            }),
        }
    }
}

fn run_worker(data_path: String, mut receiver: mpsc::UnboundedReceiver<Request>) {
    swe::set_ephe_path(&data_path);
    while let Some(request) = receiver.blocking_recv() {
        match request {
            Request::Position {
                body,
                julian_day,
                reply,
            } => {
                // The caller may have timed out and gone away.
                let _ = reply.send(calc_planet_position(body, julian_day));
            }
            Request::Shutdown => break,
        }
    }
    swe::close();
    log::info!("Swiss Ephemeris worker stopped");
}

/// Calculate position for a single body. Must only run on the worker thread.
fn calc_planet_position(
    body: Body,
    julian_day: JulianDay,
) -> Result<PlanetPosition, EphemerisError> {
    let jd = julian_day.value();
    let flags = (FLG_SWIEPH | FLG_SPEED) as u32;
    let result = swe::calc_ut(jd, body.swiss_code() as u32, flags).map_err(|e| {
        EphemerisError::CalculationFailed {
            body,
            julian_day: jd,
            message: format!("Swiss Ephemeris error: {}", e),
        }
    })?;

    let out = result.out;
    if out.iter().take(4).any(|v| !v.is_finite()) {
        return Err(EphemerisError::CalculationFailed {
            body,
            julian_day: jd,
            message: "non-finite result".to_string(),
        });
    }

    Ok(PlanetPosition::new(
        body,
        out[0],
        out[1],
        out[2],
        out[3],
        Backend::Precise,
    ))
}
