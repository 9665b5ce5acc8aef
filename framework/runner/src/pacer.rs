use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::load::LoadProfile;
use flow_probe_core::prelude::{DelegatedShutdownListener, ShutdownHandle};

const PACER_INTERVAL: Duration = Duration::from_millis(250);

/// Drives the active-VU target along the load profile and ends the run when the profile (or the
/// duration cap) expires.
///
/// VU threads read `active_target` between iterations; a thread whose index is at or above the
/// target idles until the profile admits it again. For a soak run `planned` is `None` and the
/// target is pinned at the profile's peak until something else shuts the run down.
pub(crate) fn start_pacer(
    profile: LoadProfile,
    planned: Option<Duration>,
    active_target: Arc<AtomicUsize>,
    shutdown_handle: ShutdownHandle,
    mut shutdown_listener: DelegatedShutdownListener,
) {
    std::thread::Builder::new()
        .name("pacer".to_string())
        .spawn(move || {
            let started = Instant::now();
            loop {
                if shutdown_listener.should_shutdown() {
                    log::trace!("Pacer thread shutting down");
                    break;
                }

                let elapsed = started.elapsed();
                match planned {
                    Some(planned) if elapsed >= planned => {
                        active_target.store(0, Ordering::SeqCst);
                        log::debug!("Load profile complete, ending the run");
                        shutdown_handle.shutdown();
                        break;
                    }
                    Some(_) => {
                        active_target.store(profile.target_at(elapsed), Ordering::SeqCst);
                    }
                    None => {
                        active_target.store(profile.max_vus(), Ordering::SeqCst);
                    }
                }

                std::thread::sleep(PACER_INTERVAL);
            }
        })
        .expect("Failed to start pacer thread");
}
