use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use super::sim_error::SimError;

/// Drives the render loop: calls a frame callback at a fixed real-time period
/// on its own thread until stopped.
pub struct FrameTimer {
    frame_period: Duration,
    running: AtomicBool,
}

impl FrameTimer {
    /// Creates new frame timer
    pub fn new(frame_millis: u64) -> Arc<Self> {
        Arc::new(Self {
            frame_period: Duration::from_millis(frame_millis),
            running: AtomicBool::new(true),
        })
    }

    /// Stops the timer after the frame in progress
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts the frame thread. The callback receives the real instant of the
    /// frame and the frame count.
    pub fn start(
        self: Arc<Self>,
        mut on_frame: impl FnMut(Instant, usize) + Send + 'static,
    ) -> Result<JoinHandle<()>, SimError> {
        thread::Builder::new()
            .name("frame-thread".to_string())
            .spawn(move || {
                let mut frame_count = 0;
                while self.running.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    frame_count += 1;

                    on_frame(now, frame_count);

                    let elapsed = now.elapsed();
                    thread::sleep(self.frame_period.saturating_sub(elapsed));
                }
            })
            .map_err(|_| {
                SimError::FrameTimerStartError("Failed to start the frame thread.".to_string())
            })
    }
}
