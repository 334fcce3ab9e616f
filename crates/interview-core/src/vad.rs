//! Energy-threshold voice activity detection.
//!
//! Audio is cut into fixed analysis frames; each frame's RMS level in dBFS is
//! compared against the threshold, and edges are debounced over a short
//! history of voiced/unvoiced decisions.

use std::collections::VecDeque;
use std::time::Duration;

/// Level reported for digital silence.
pub const DBFS_FLOOR: f32 = -100.0;

/// Frames remembered for debouncing. A stop needs all of them quiet.
const HISTORY_LEN: usize = 10;
/// Recent frames inspected before a start.
const ATTACK_WINDOW: usize = 3;
/// Voiced frames required inside the attack window.
const ATTACK_VOICED: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadEdge {
    SpeakingStarted,
    SpeakingStopped,
}

/// RMS level of `samples` in dBFS, clamped to [`DBFS_FLOOR`].
pub fn rms_dbfs(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return DBFS_FLOOR;
    }
    let mean_square = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    let rms = mean_square.sqrt();
    if rms <= 0.0 {
        return DBFS_FLOOR;
    }
    (20.0 * rms.log10()).max(DBFS_FLOOR)
}

#[derive(Debug)]
pub struct EnergyVad {
    threshold_db: f32,
    frame: Duration,
    history: VecDeque<bool>,
    pending: Vec<f32>,
    speaking: bool,
}

impl EnergyVad {
    pub fn new(threshold_db: f32, frame: Duration) -> Self {
        Self {
            threshold_db,
            frame,
            history: VecDeque::from(vec![false; HISTORY_LEN]),
            pending: Vec::new(),
            speaking: false,
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Forgets buffered audio and history and returns to not-speaking.
    ///
    /// No edge is emitted for the forced stop.
    pub fn reset(&mut self) {
        self.history.iter_mut().for_each(|voiced| *voiced = false);
        self.pending.clear();
        self.speaking = false;
    }

    /// Feeds mono samples and returns the edges they complete, in order.
    pub fn push(&mut self, samples: &[f32], sample_rate: u32) -> Vec<VadEdge> {
        let frame_len = ((sample_rate as f64 * self.frame.as_secs_f64()).round() as usize).max(1);
        self.pending.extend_from_slice(samples);

        let mut edges = Vec::new();
        let mut consumed = 0;
        while self.pending.len() - consumed >= frame_len {
            let level = rms_dbfs(&self.pending[consumed..consumed + frame_len]);
            consumed += frame_len;
            if let Some(edge) = self.analyze(level) {
                edges.push(edge);
            }
        }
        self.pending.drain(..consumed);
        edges
    }

    /// Runs one frame through the debouncer. The history is consulted before
    /// the current decision is recorded.
    fn analyze(&mut self, level_db: f32) -> Option<VadEdge> {
        let voiced = level_db > self.threshold_db;
        let mut edge = None;

        if voiced && !self.speaking {
            let recent = self
                .history
                .iter()
                .rev()
                .take(ATTACK_WINDOW)
                .filter(|v| **v)
                .count();
            if recent >= ATTACK_VOICED {
                self.speaking = true;
                edge = Some(VadEdge::SpeakingStarted);
            }
        } else if !voiced && self.speaking && self.history.iter().all(|v| !*v) {
            self.speaking = false;
            edge = Some(VadEdge::SpeakingStopped);
        }

        self.history.pop_front();
        self.history.push_back(voiced);
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 16_000;
    // 50 ms at 16 kHz.
    const FRAME: usize = 800;

    fn loud(frames: usize) -> Vec<f32> {
        vec![0.5; FRAME * frames]
    }

    fn quiet(frames: usize) -> Vec<f32> {
        vec![0.0; FRAME * frames]
    }

    fn vad() -> EnergyVad {
        EnergyVad::new(-50.0, Duration::from_millis(50))
    }

    #[test]
    fn test_rms_dbfs() {
        assert_eq!(rms_dbfs(&[]), DBFS_FLOOR);
        assert_eq!(rms_dbfs(&[0.0; 64]), DBFS_FLOOR);
        assert!((rms_dbfs(&[1.0; 64])).abs() < 1e-4);
        assert!((rms_dbfs(&[0.1, -0.1, 0.1, -0.1]) + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_start_needs_sustained_energy() {
        let mut vad = vad();

        // A single loud frame is not enough.
        assert!(vad.push(&loud(1), RATE).is_empty());
        assert!(vad.push(&quiet(1), RATE).is_empty());
        assert!(!vad.is_speaking());

        // Only one voiced frame among the last three.
        assert!(vad.push(&loud(1), RATE).is_empty());
        // Two of the last three were voiced.
        assert_eq!(vad.push(&loud(1), RATE), vec![VadEdge::SpeakingStarted]);
        assert!(vad.is_speaking());
    }

    #[test]
    fn test_stop_needs_a_fully_quiet_history() {
        let mut vad = vad();
        assert_eq!(vad.push(&loud(3), RATE), vec![VadEdge::SpeakingStarted]);

        // The history still remembers voiced frames for ten frames.
        assert!(vad.push(&quiet(10), RATE).is_empty());
        assert_eq!(vad.push(&quiet(1), RATE), vec![VadEdge::SpeakingStopped]);
        assert!(!vad.is_speaking());
    }

    #[test]
    fn test_partial_frames_are_buffered() {
        let mut vad = vad();
        let audio = loud(3);
        let (head, tail) = audio.split_at(FRAME * 2 + FRAME / 2);

        assert!(vad.push(head, RATE).is_empty());
        assert_eq!(vad.push(tail, RATE), vec![VadEdge::SpeakingStarted]);
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut vad = vad();
        vad.push(&loud(3), RATE);
        vad.reset();

        assert!(!vad.is_speaking());
        // Two loud frames after a reset are not enough to start again.
        assert!(vad.push(&loud(2), RATE).is_empty());
    }
}
