use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Deserialize;

use crate::geometry::Point;

pub const ZOOM_REPEAT_INTERVAL: Duration = Duration::from_millis(40);
pub const ZOOM_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    pub const fn step(self) -> f32 {
        match self {
            Self::In => ZOOM_STEP,
            Self::Out => -ZOOM_STEP,
        }
    }
}

/// Paces repeated zoom steps while a zoom control is held.
///
/// The worker thread only emits ticks; the owner drains them with
/// [`ZoomRepeat::poll`] or [`ZoomRepeat::wait`] and applies each step itself.
/// At most one tick is pending, so a late owner never applies a burst.
#[derive(Debug)]
pub struct ZoomRepeat {
    direction: ZoomDirection,
    anchor: Point,
    stop: Arc<AtomicBool>,
    wake: Option<mpsc::Sender<()>>,
    ticks: mpsc::Receiver<()>,
    worker: Option<JoinHandle<()>>,
}

impl ZoomRepeat {
    /// Starts ticking immediately, then every `interval`. `anchor` is the
    /// image point kept under the view centre.
    pub fn start(direction: ZoomDirection, anchor: Point, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, ticks) = mpsc::sync_channel::<()>(1);
        let (wake, asleep) = mpsc::channel::<()>();
        let worker_stop = Arc::clone(&stop);
        let worker = std::thread::spawn(move || {
            while !worker_stop.load(Ordering::Acquire) {
                match tx.try_send(()) {
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Disconnected(())) => break,
                }
                // Dropping the wake sender ends the wait at once.
                match asleep.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        tracing::debug!(?direction, interval_ms = interval.as_millis() as u64, "zoom repeat started");
        Self {
            direction,
            anchor,
            stop,
            wake: Some(wake),
            ticks,
            worker: Some(worker),
        }
    }

    pub fn direction(&self) -> ZoomDirection {
        self.direction
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn is_active(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
    }

    /// Ticks received since the last call, without blocking.
    pub fn poll(&self) -> usize {
        if !self.is_active() {
            return 0;
        }
        self.ticks.try_iter().count()
    }

    /// Blocks for up to `timeout` until at least one tick arrives.
    pub fn wait(&self, timeout: Duration) -> usize {
        if !self.is_active() {
            return 0;
        }
        match self.ticks.recv_timeout(timeout) {
            Ok(()) => 1 + self.ticks.try_iter().count(),
            Err(_) => 0,
        }
    }

    /// Stops the worker; called when the control is released or the scale
    /// clamp is reached.
    pub fn release(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.wake.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("zoom repeat worker panicked");
            }
            tracing::debug!(direction = ?self.direction, "zoom repeat stopped");
        }
    }
}

impl Drop for ZoomRepeat {
    fn drop(&mut self) {
        self.release();
    }
}
