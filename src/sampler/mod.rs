//! Adaptive GPS position sampling.
//!
//! This module defines the client-side sampling loop that follows a field
//! technician or team while a route is being executed, plus the traits
//! that platform integrations must fulfill: a [`PositionSource`] that
//! talks to the device's geolocation API and a [`LocationSink`] that
//! carries batches to the ingestion boundary.
//!
//! The loop is deliberately acquire-then-schedule-next: each cycle picks
//! its own delay after the acquisition finishes, so a slow fix can never
//! overlap the next one the way a fixed-period timer would.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SamplerConfig;
use crate::error::Result;
use crate::geo::{haversine_distance_m, Coordinate};
use crate::point::LocationPoint;

/// A single position fix from the device.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    /// Where the device is.
    pub coordinate: Coordinate,
    /// When the fix was taken.
    pub timestamp: DateTime<Utc>,
    /// Reported horizontal accuracy in meters, if available.
    pub accuracy: Option<f64>,
    /// Reported ground speed in meters per second, if available.
    pub speed: Option<f64>,
    /// Reported heading in degrees from true north, if available.
    pub heading: Option<f64>,
    /// Device battery level in percent, if available.
    pub battery_level: Option<u8>,
}

impl PositionFix {
    /// Create a fix with only the required fields set.
    #[must_use]
    pub fn new(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            timestamp,
            accuracy: None,
            speed: None,
            heading: None,
            battery_level: None,
        }
    }

    fn into_point(self, route_id: &str) -> LocationPoint {
        LocationPoint {
            id: None,
            route_id: route_id.to_string(),
            latitude: self.coordinate.latitude,
            longitude: self.coordinate.longitude,
            timestamp: self.timestamp,
            accuracy: self.accuracy,
            speed: self.speed,
            heading: self.heading,
            battery_level: self.battery_level,
        }
    }
}

/// A source of device position fixes.
///
/// Implementations should request the highest accuracy available and must
/// not impose their own deadline; the sampler bounds every acquisition
/// with the configured timeout.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Acquire the current position.
    ///
    /// # Errors
    ///
    /// Returns an error when a fix cannot be obtained, e.g. permission
    /// denied or no signal. The sampler logs it and skips the cycle.
    async fn acquire(&self) -> Result<PositionFix>;
}

/// A best-effort carrier of location batches to the ingestion boundary.
#[async_trait]
pub trait LocationSink: Send + Sync {
    /// Deliver a batch of points.
    ///
    /// # Errors
    ///
    /// Returns an error when delivery fails. The sampler logs it and
    /// drops the batch; there is no retry queue.
    async fn deliver(&self, points: Vec<LocationPoint>) -> Result<()>;
}

/// A lightweight, cloneable handle to a running sampling schedule.
#[derive(Debug, Clone)]
pub struct SamplerHandle {
    route_id: String,
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
    samples: Arc<AtomicU64>,
}

impl SamplerHandle {
    fn new(route_id: &str) -> Self {
        Self {
            route_id: route_id.to_string(),
            stopped: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
            samples: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The route this schedule is tracking.
    #[must_use]
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    /// Signal the schedule to stop at its next suspension point.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Number of successful samples taken so far.
    #[must_use]
    pub fn sample_count(&self) -> u64 {
        self.samples.load(Ordering::SeqCst)
    }

    async fn stop_notified(&self) {
        self.notify.notified().await;
    }

    fn record_sample(&self) {
        self.samples.fetch_add(1, Ordering::SeqCst);
    }
}

/// Periodic position sampler bound to at most one route at a time.
///
/// Owns its own last-known position and stationary counter per schedule
/// (never shared or global), so several samplers can track several
/// devices independently.
pub struct PositionSampler<S, K> {
    source: Arc<S>,
    sink: Arc<K>,
    config: SamplerConfig,
    active: Mutex<Option<ActiveRun>>,
}

#[derive(Debug)]
struct ActiveRun {
    handle: SamplerHandle,
    task: JoinHandle<()>,
}

impl<S, K> std::fmt::Debug for PositionSampler<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let route = self
            .active
            .lock()
            .ok()
            .and_then(|run| run.as_ref().map(|r| r.handle.route_id().to_string()));
        f.debug_struct("PositionSampler")
            .field("config", &self.config)
            .field("active_route", &route)
            .finish_non_exhaustive()
    }
}

impl<S, K> PositionSampler<S, K>
where
    S: PositionSource + 'static,
    K: LocationSink + 'static,
{
    /// Create a sampler over the given source and sink.
    #[must_use]
    pub fn new(source: Arc<S>, sink: Arc<K>, config: SamplerConfig) -> Self {
        Self {
            source,
            sink,
            config,
            active: Mutex::new(None),
        }
    }

    /// Start tracking a route.
    ///
    /// Idempotent: calling `start` again for the route already being
    /// tracked is a no-op and returns the existing handle. Starting a
    /// different route replaces the current schedule. The first sample is
    /// taken immediately, then the loop self-reschedules.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn start(&self, route_id: &str) -> SamplerHandle {
        let mut active = self.active.lock().expect("sampler lock poisoned");

        if let Some(run) = active.as_ref() {
            if run.handle.route_id() == route_id && !run.handle.is_stopped() {
                debug!("Already tracking route {route_id}, ignoring start");
                return run.handle.clone();
            }
            run.handle.stop();
        }

        info!("Starting position tracking for route {route_id}");
        let handle = SamplerHandle::new(route_id);
        let task = tokio::spawn(run_schedule(
            Arc::clone(&self.source),
            Arc::clone(&self.sink),
            self.config.clone(),
            handle.clone(),
        ));

        *active = Some(ActiveRun {
            handle: handle.clone(),
            task,
        });
        handle
    }

    /// Stop tracking and clear the start state.
    ///
    /// The pending schedule is cancelled promptly; an in-flight delivery
    /// is left to complete or fail on its own. After `stop`, a `start`
    /// for the same route begins a fresh schedule.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn stop(&self) {
        let mut active = self.active.lock().expect("sampler lock poisoned");
        if let Some(run) = active.take() {
            info!("Stopping position tracking for route {}", run.handle.route_id());
            run.handle.stop();
            drop(run.task);
        }
    }

    /// Whether a schedule is currently active.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.active
            .lock()
            .expect("sampler lock poisoned")
            .as_ref()
            .is_some_and(|run| !run.handle.is_stopped())
    }

    /// Handle of the active schedule, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn handle(&self) -> Option<SamplerHandle> {
        self.active
            .lock()
            .expect("sampler lock poisoned")
            .as_ref()
            .map(|run| run.handle.clone())
    }
}

impl<S, K> Drop for PositionSampler<S, K> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(run) = active.take() {
                run.handle.stop();
            }
        }
    }
}

/// The sampling loop itself: immediate sample, then acquire-then-schedule.
async fn run_schedule<S, K>(
    source: Arc<S>,
    sink: Arc<K>,
    config: SamplerConfig,
    handle: SamplerHandle,
) where
    S: PositionSource + 'static,
    K: LocationSink + 'static,
{
    // Instance-scoped movement state: each schedule owns its own.
    let mut last_position: Option<Coordinate> = None;
    let mut stationary_checks: u32 = 0;
    let route_id = handle.route_id().to_string();

    loop {
        if handle.is_stopped() {
            break;
        }

        let acquisition = tokio::select! {
            () = handle.stop_notified() => break,
            res = tokio::time::timeout(config.acquire_timeout(), source.acquire()) => res,
        };

        match acquisition {
            Ok(Ok(fix)) => {
                if let Some(last) = last_position {
                    let displacement = haversine_distance_m(last, fix.coordinate);
                    if displacement < config.stationary_threshold_m {
                        stationary_checks += 1;
                    } else {
                        stationary_checks = 0;
                    }
                }
                last_position = Some(fix.coordinate);
                handle.record_sample();

                // Fire-and-forget: a failed send drops the point and never
                // blocks the schedule or its cancellation.
                let point = fix.into_point(&route_id);
                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    if let Err(e) = sink.deliver(vec![point]).await {
                        warn!("Dropping location point: {e}");
                    }
                });
            }
            Ok(Err(e)) => {
                warn!("Skipping sample cycle for route {route_id}: {e}");
            }
            Err(_) => {
                warn!(
                    "Skipping sample cycle for route {route_id}: no fix within {:?}",
                    config.acquire_timeout()
                );
            }
        }

        let delay = next_delay(&config, stationary_checks);
        tokio::select! {
            () = handle.stop_notified() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    debug!("Sampling schedule for route {route_id} ended");
}

/// Pick the delay before the next cycle from the stationary counter.
fn next_delay(config: &SamplerConfig, stationary_checks: u32) -> Duration {
    if stationary_checks >= config.stationary_checks_before_slowdown {
        config.stationary_interval()
    } else {
        config.moving_interval()
    }
}
