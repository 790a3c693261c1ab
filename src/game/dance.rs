//! Dancer animation for rhythm dance mode
//!
//! Idle loops forever; a judgment plays its frames once, holds the last
//! frame, and falls back to idle one second after it started.

use super::rhythm::Judgment;
use std::time::{Duration, Instant};

/// Time between two frames
const FRAME_INTERVAL: Duration = Duration::from_millis(200);

/// How long a judgment animation lasts before returning to idle
const JUDGMENT_HOLD: Duration = Duration::from_secs(1);

const IDLE_FRAMES: [&str; 2] = ["  o\n /|\\\n / \\", "  o\n \\|/\n / \\"];

const PERFECT_FRAMES: [&str; 3] = [" \\o/\n  |\n / \\", "  o\n /|\\\n  ^", " \\o/\n  |\n / \\"];

const NICE_FRAMES: [&str; 2] = ["  o\n /|\n / \\", "  o\n  |\\\n / \\"];

const OK_FRAMES: [&str; 2] = ["  o\n /|\\\n / \\", "  .\n /|\\\n / \\"];

const MISS_FRAMES: [&str; 2] = [" _o_\n  |\n / \\", "  o\n_/|\\_\n / \\"];

/// Which animation is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanceMove {
    Idle,
    Judged(Judgment),
}

impl DanceMove {
    fn frames(&self) -> &'static [&'static str] {
        match self {
            DanceMove::Idle => &IDLE_FRAMES,
            DanceMove::Judged(Judgment::Perfect) => &PERFECT_FRAMES,
            DanceMove::Judged(Judgment::Nice) => &NICE_FRAMES,
            DanceMove::Judged(Judgment::Ok) => &OK_FRAMES,
            DanceMove::Judged(Judgment::Miss) => &MISS_FRAMES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DanceAnimation {
    current: DanceMove,
    frame_index: usize,
    last_update: Instant,
    started_at: Instant,
}

impl DanceAnimation {
    pub fn new(now: Instant) -> Self {
        Self {
            current: DanceMove::Idle,
            frame_index: 0,
            last_update: now,
            started_at: now,
        }
    }

    /// Start the animation for a judgment from its first frame
    pub fn trigger(&mut self, judgment: Judgment, now: Instant) {
        self.current = DanceMove::Judged(judgment);
        self.frame_index = 0;
        self.started_at = now;
    }

    /// Shift the frame clocks forward after a pause
    pub fn postpone(&mut self, by: Duration) {
        self.last_update += by;
        self.started_at += by;
    }

    /// Advance at most one frame per interval
    pub fn update(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_update) < FRAME_INTERVAL {
            return;
        }
        self.last_update = now;

        if self.current != DanceMove::Idle
            && now.saturating_duration_since(self.started_at) >= JUDGMENT_HOLD
        {
            self.current = DanceMove::Idle;
            self.frame_index = 0;
            return;
        }

        let count = self.current.frames().len();
        self.frame_index += 1;
        if self.frame_index >= count {
            self.frame_index = match self.current {
                DanceMove::Idle => 0,
                DanceMove::Judged(_) => count - 1,
            };
        }
    }

    /// ASCII art of the frame to draw
    pub fn frame(&self) -> &'static str {
        let frames = self.current.frames();
        frames[self.frame_index.min(frames.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_idle_loops() {
        let t0 = Instant::now();
        let mut anim = DanceAnimation::new(t0);
        assert_eq!(anim.frame(), IDLE_FRAMES[0]);

        anim.update(t0 + ms(200));
        assert_eq!(anim.frame_index, 1);
        anim.update(t0 + ms(400));
        assert_eq!(anim.frame_index, 0);
    }

    #[test]
    fn test_updates_throttled() {
        let t0 = Instant::now();
        let mut anim = DanceAnimation::new(t0);
        anim.update(t0 + ms(100));
        assert_eq!(anim.frame_index, 0);
    }

    #[test]
    fn test_judgment_holds_last_frame_then_idles() {
        let t0 = Instant::now();
        let mut anim = DanceAnimation::new(t0);
        anim.trigger(Judgment::Perfect, t0);
        assert_eq!(anim.current, DanceMove::Judged(Judgment::Perfect));

        for step in 1..=4 {
            anim.update(t0 + ms(200 * step));
        }
        assert_eq!(anim.frame_index, 2);
        assert_eq!(anim.frame(), PERFECT_FRAMES[2]);

        anim.update(t0 + ms(1000));
        assert_eq!(anim.current, DanceMove::Idle);
        assert_eq!(anim.frame(), IDLE_FRAMES[0]);
    }

    #[test]
    fn test_postpone_keeps_judgment_on_screen() {
        let t0 = Instant::now();
        let mut anim = DanceAnimation::new(t0);
        anim.trigger(Judgment::Miss, t0);
        anim.postpone(Duration::from_secs(5));

        anim.update(t0 + ms(5100));
        assert_eq!(anim.frame_index, 0);
        anim.update(t0 + ms(5200));
        assert_eq!(anim.current, DanceMove::Judged(Judgment::Miss));
        assert_eq!(anim.frame_index, 1);
    }
}
