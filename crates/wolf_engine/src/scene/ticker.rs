//! Simulation and render tickers
//!
//! Neither ticker owns a thread or a timer. The host wakes them with the
//! current clock reading and they answer how much work is due:
//!
//! - [`FixedTicker`] counts the fixed-length ticks that should have elapsed
//!   since it was started and reports the ones not yet run, so the tick count
//!   tracks wall time however late the wake-up comes.
//! - [`FrameTicker`] paces frames at the display refresh interval and hands
//!   out the wall time since the previous frame.
//!
//! A stopped ticker reports no work, so a wake-up scheduled before `stop`
//! does nothing.

use std::time::Duration;

use crate::config::{RenderConfig, SimulationConfig};

/// Fixed-step simulation clock with catch-up
#[derive(Debug, Clone)]
pub struct FixedTicker {
    tick_duration: Duration,
    poll_divisor: u32,
    running: bool,
    started: Duration,
    ticks_run: u64,
}

impl FixedTicker {
    /// Ticker with the given tick length, woken `poll_divisor` times per tick
    pub fn new(tick_duration: Duration, poll_divisor: u32) -> Self {
        Self {
            tick_duration: tick_duration.max(Duration::from_nanos(1)),
            poll_divisor: poll_divisor.max(1),
            running: false,
            started: Duration::ZERO,
            ticks_run: 0,
        }
    }

    /// Ticker matching a simulation config
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.tick_duration(), config.poll_divisor)
    }

    /// Start counting from `now`
    pub fn start(&mut self, now: Duration) {
        self.running = true;
        self.started = now;
        self.ticks_run = 0;
    }

    /// Stop; pending wake-ups find nothing due
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the ticker is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Length of one tick
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Length of one tick in seconds
    pub fn delta_time(&self) -> f32 {
        self.tick_duration.as_secs_f32()
    }

    /// Time between wake-ups, a fraction of the tick length
    pub fn poll_interval(&self) -> Duration {
        self.tick_duration / self.poll_divisor
    }

    /// Ticks run since the last start
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Ticks that should have run by `now` but have not
    pub fn due(&self, now: Duration) -> u64 {
        if !self.running {
            return 0;
        }
        let elapsed = now.saturating_sub(self.started);
        let expected = elapsed.as_nanos() / self.tick_duration.as_nanos();
        u64::try_from(expected)
            .unwrap_or(u64::MAX)
            .saturating_sub(self.ticks_run)
    }

    /// Count one tick as run and return its number, starting at 1
    pub fn advance(&mut self) -> u64 {
        self.ticks_run += 1;
        self.ticks_run
    }
}

/// Display-rate frame clock
#[derive(Debug, Clone)]
pub struct FrameTicker {
    frame_interval: Duration,
    running: bool,
    last_frame: Option<Duration>,
}

impl FrameTicker {
    /// Ticker producing at most one frame per `frame_interval`
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            running: false,
            last_frame: None,
        }
    }

    /// Ticker matching a render config
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.frame_interval())
    }

    /// Start; the first poll yields a frame with zero delta
    pub fn start(&mut self) {
        self.running = true;
        self.last_frame = None;
    }

    /// Stop; pending wake-ups find no frame due
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the ticker is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Refresh interval
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Seconds since the previous frame if a frame is due at `now`
    pub fn poll(&mut self, now: Duration) -> Option<f32> {
        if !self.running {
            return None;
        }
        let delta = match self.last_frame {
            None => Duration::ZERO,
            Some(last) => {
                let delta = now.saturating_sub(last);
                if delta < self.frame_interval {
                    return None;
                }
                delta
            }
        };
        self.last_frame = Some(now);
        Some(delta.as_secs_f32())
    }

    /// Time left until the next frame is due
    pub fn until_next(&self, now: Duration) -> Duration {
        self.last_frame.map_or(Duration::ZERO, |last| {
            (last + self.frame_interval).saturating_sub(now)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const D: Duration = Duration::from_millis(20);

    #[test]
    fn test_fixed_ticker_counts_from_start() {
        let mut ticker = FixedTicker::new(D, 4);
        assert_eq!(ticker.due(D * 10), 0);

        ticker.start(Duration::from_secs(3));
        assert_eq!(ticker.due(Duration::from_secs(3)), 0);
        assert_eq!(ticker.due(Duration::from_secs(3) + D * 5), 5);
        assert_eq!(ticker.poll_interval(), Duration::from_millis(5));
    }

    #[test]
    fn test_fixed_ticker_catches_up_exactly() {
        let mut ticker = FixedTicker::new(D, 4);
        ticker.start(Duration::ZERO);
        assert_eq!(ticker.due(D + D / 2), 1);
        ticker.advance();

        let due = ticker.due(D * 6 + D / 2);
        assert_eq!(due, 5);
        let numbers: Vec<u64> = (0..due).map(|_| ticker.advance()).collect();
        assert_eq!(numbers, vec![2, 3, 4, 5, 6]);
        assert_eq!(ticker.due(D * 6 + D / 2), 0);
    }

    #[test]
    fn test_stopped_fixed_ticker_has_nothing_due() {
        let mut ticker = FixedTicker::new(D, 4);
        ticker.start(Duration::ZERO);
        ticker.stop();
        assert_eq!(ticker.due(D * 100), 0);
    }

    #[test]
    fn test_frame_ticker_paces_frames() {
        let mut ticker = FrameTicker::new(Duration::from_millis(16));
        assert_eq!(ticker.poll(Duration::ZERO), None);

        ticker.start();
        assert_eq!(ticker.poll(Duration::from_millis(100)), Some(0.0));
        assert_eq!(ticker.poll(Duration::from_millis(110)), None);
        assert_eq!(ticker.until_next(Duration::from_millis(110)), Duration::from_millis(6));

        let delta = ticker.poll(Duration::from_millis(125)).unwrap();
        assert_relative_eq!(delta, 0.025, epsilon = 1e-6);

        ticker.stop();
        assert_eq!(ticker.poll(Duration::from_secs(10)), None);
    }
}
