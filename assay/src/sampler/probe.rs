use assay_core::{ResourceSample, SamplerError};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use sysinfo::{Pid, System, MINIMUM_CPU_UPDATE_INTERVAL};
#[allow(unused)]
use tracing::{debug, trace};

const BYTES_PER_MB: f64 = 1024. * 1024.;

/// Source of resource usage readings for the sampler.
///
/// Called from a blocking thread, so implementations are free to make syscalls.
pub trait ResourceProbe: Send + Sync {
    fn sample(&self) -> Result<ResourceSample, SamplerError>;
}

/// Reads CPU utilization and resident memory of the current process.
///
/// CPU usage is measured over the window since the previous refresh. The probe refreshes once
/// when it is created, and a reading never covers less than
/// [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`]: a sample requested sooner blocks until the
/// window is long enough.
pub struct ProcessProbe {
    pid: Option<Pid>,
    state: Mutex<ProbeState>,
}

struct ProbeState {
    system: System,
    last_refresh: Option<Instant>,
}

impl ProcessProbe {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(err) => {
                debug!("Unable to determine current pid: {err}");
                None
            }
        };

        let mut state = ProbeState {
            system: System::new(),
            last_refresh: None,
        };
        if let Some(pid) = pid.filter(|_| sysinfo::IS_SUPPORTED_SYSTEM) {
            if state.system.refresh_process(pid) {
                state.last_refresh = Some(Instant::now());
            }
        }

        Self {
            pid,
            state: Mutex::new(state),
        }
    }
}

impl Default for ProcessProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for ProcessProbe {
    fn sample(&self) -> Result<ResourceSample, SamplerError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SamplerError::Unavailable("unsupported platform"));
        }
        let pid = self
            .pid
            .ok_or(SamplerError::Unavailable("current pid unknown"))?;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let last_refresh = match state.last_refresh {
            Some(last) => last,
            None => {
                if !state.system.refresh_process(pid) {
                    return Err(SamplerError::ProcessNotFound);
                }
                Instant::now()
            }
        };
        let remaining = MINIMUM_CPU_UPDATE_INTERVAL.saturating_sub(last_refresh.elapsed());
        if !remaining.is_zero() {
            trace!("Waiting {remaining:?} for a usable CPU window");
            std::thread::sleep(remaining);
        }

        if !state.system.refresh_process(pid) {
            return Err(SamplerError::ProcessNotFound);
        }
        state.last_refresh = Some(Instant::now());
        let process = state
            .system
            .process(pid)
            .ok_or(SamplerError::ProcessNotFound)?;

        let sample = ResourceSample {
            cpu_percent: process.cpu_usage() as f64,
            memory_mb: process.memory() as f64 / BYTES_PER_MB,
        };
        trace!("{sample:?}");
        Ok(sample)
    }
}
