//! Per-session target state: sample windows, debounce, convergence streaks.

use seeker_traits::Axis;

use crate::config::{AxisMask, Bounds};
use crate::window::{OffsetWindow, PresenceWindow};

/// Streaks must exceed this fraction of the window capacity.
const STREAK_NUM: usize = 3;
const STREAK_DEN: usize = 4;

#[derive(Debug, Clone)]
pub struct TargetState {
    capacity: usize,
    bounds: Bounds,
    offsets: [OffsetWindow; 3],
    presence: PresenceWindow,
    frames_seen: u64,
    frames_in_session: usize,
    correctionless_frames: usize,
    rotationless_frames: usize,
    has_initial_heading: bool,
}

impl TargetState {
    pub fn new(capacity: usize, bounds: Bounds) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            bounds,
            offsets: [
                OffsetWindow::new(capacity),
                OffsetWindow::new(capacity),
                OffsetWindow::new(capacity),
            ],
            presence: PresenceWindow::new(capacity),
            frames_seen: 0,
            frames_in_session: 0,
            correctionless_frames: 0,
            rotationless_frames: 0,
            has_initial_heading: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Ingest one frame. A full session drops its oldest frame from all four
    /// windows first, so every window holds the same frames.
    pub fn put_values(&mut self, offsets: [f64; 3], has_target: bool) {
        if self.frames_in_session >= self.capacity {
            self.evict_oldest();
        }
        for (window, value) in self.offsets.iter_mut().zip(offsets) {
            window.push(value);
        }
        self.presence.push(has_target);
        self.frames_seen += 1;
        self.frames_in_session += 1;
    }

    fn evict_oldest(&mut self) {
        for window in &mut self.offsets {
            window.evict_oldest();
        }
        self.presence.evict_oldest();
        self.frames_in_session = self.frames_in_session.saturating_sub(1);
    }

    /// Median of one axis window.
    ///
    /// # Panics
    /// Before the first frame.
    pub fn filtered(&self, axis: Axis) -> f64 {
        self.offsets[axis.index()].average()
    }

    /// Medians in `Axis::ALL` order.
    ///
    /// # Panics
    /// Before the first frame.
    pub fn filtered_offsets(&self) -> [f64; 3] {
        [
            self.filtered(Axis::Rotational),
            self.filtered(Axis::Lateral),
            self.filtered(Axis::Depth),
        ]
    }

    /// Debounced presence: only reports a lost target once more than half a
    /// window of frames has been seen and most of them had no target.
    pub fn has_target(&self) -> bool {
        let past_debounce = self.frames_in_session * 2 > self.capacity;
        !(past_debounce && !self.presence.average())
    }

    /// Whether the filtered offset on `axis` is outside `tolerance`.
    ///
    /// Rotational and lateral compare `|median| / bound`; depth compares the
    /// distance from the desired area against `tolerance * bound`.
    pub fn needs_correction_on_axis(&self, axis: Axis, tolerance: f64) -> bool {
        let m = self.filtered(axis);
        let bound = self.bounds.get(axis);
        match axis {
            Axis::Rotational | Axis::Lateral => m.abs() / bound > tolerance,
            Axis::Depth => (bound - m).abs() > (bound - (1.0 + tolerance) * bound).abs(),
        }
    }

    #[inline]
    fn streak_met(&self, streak: usize) -> bool {
        streak * STREAK_DEN > self.capacity * STREAK_NUM
    }

    /// Update the convergence streaks and report whether the session converged.
    ///
    /// The streaks and the heading latch track every axis; `enabled` only
    /// decides which axes the final convergence test waits on.
    pub fn has_finished(&mut self, tolerance: f64, enabled: AxisMask) -> bool {
        let needs_rotation = self.needs_correction_on_axis(Axis::Rotational, tolerance);
        let needs_depth = self.needs_correction_on_axis(Axis::Depth, tolerance);

        if needs_rotation {
            self.correctionless_frames = 0;
            self.rotationless_frames = 0;
        } else {
            if !needs_depth {
                self.correctionless_frames += 1;
            }
            self.rotationless_frames += 1;
            if self.streak_met(self.rotationless_frames) {
                self.has_initial_heading = true;
            }
        }

        (!enabled.rotational || !needs_rotation)
            && (!enabled.depth || !needs_depth)
            && self.streak_met(self.correctionless_frames)
    }

    /// Latched once rotation has been stable for most of a window.
    pub fn has_initial_heading(&self) -> bool {
        self.has_initial_heading
    }

    /// Frames ingested over the whole session.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Frames currently held; never exceeds the capacity.
    pub fn frames_in_session(&self) -> usize {
        self.frames_in_session
    }

    pub fn correctionless_frames(&self) -> usize {
        self.correctionless_frames
    }

    pub fn rotationless_frames(&self) -> usize {
        self.rotationless_frames
    }

    pub fn window_len(&self) -> usize {
        self.presence.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered() -> [f64; 3] {
        [0.0, 0.0, Bounds::default().depth]
    }

    #[test]
    fn debounce_keeps_target_for_half_a_window() {
        let mut s = TargetState::new(10, Bounds::default());
        for _ in 0..4 {
            s.put_values([0.0; 3], false);
        }
        assert!(s.has_target());
        for _ in 0..2 {
            s.put_values([0.0; 3], false);
        }
        assert!(!s.has_target());
    }

    #[test]
    fn debounce_still_works_after_window_fills() {
        let mut s = TargetState::new(10, Bounds::default());
        for _ in 0..25 {
            s.put_values(centered(), true);
        }
        assert!(s.has_target());
        assert_eq!(s.frames_in_session(), 10);
        for _ in 0..6 {
            s.put_values([0.0; 3], false);
        }
        assert!(!s.has_target());
        assert_eq!(s.frames_seen(), 31);
        assert_eq!(s.window_len(), 10);
    }

    #[test]
    fn converges_and_latches_on_centered_frames() {
        let mut s = TargetState::new(20, Bounds::default());
        let mut converged_at = None;
        for frame in 1..=16 {
            s.put_values(centered(), true);
            if s.has_finished(0.25, AxisMask::ALL) && converged_at.is_none() {
                converged_at = Some(frame);
            }
        }
        assert_eq!(converged_at, Some(16));
        assert!(s.has_initial_heading());
    }

    #[test]
    fn rotation_error_resets_streaks() {
        let mut s = TargetState::new(4, Bounds::default());
        for _ in 0..3 {
            s.put_values(centered(), true);
            s.has_finished(0.25, AxisMask::ALL);
        }
        assert_eq!(s.rotationless_frames(), 3);
        // Enough large offsets to move the median.
        for _ in 0..3 {
            s.put_values([20.0, 0.0, 0.7], true);
        }
        assert!(!s.has_finished(0.25, AxisMask::ALL));
        assert_eq!(s.rotationless_frames(), 0);
        assert_eq!(s.correctionless_frames(), 0);
    }

    #[test]
    fn depth_error_holds_correctionless_streak_only() {
        let mut s = TargetState::new(4, Bounds::default());
        for _ in 0..4 {
            s.put_values([0.0, 0.0, 0.2], true);
            assert!(!s.has_finished(0.25, AxisMask::ALL));
        }
        assert_eq!(s.rotationless_frames(), 4);
        assert_eq!(s.correctionless_frames(), 0);
        assert!(s.has_initial_heading());
    }

    #[test]
    fn disabled_depth_still_holds_correctionless_streak() {
        let mut s = TargetState::new(4, Bounds::default());
        let mask = AxisMask::ALL.with(Axis::Depth, false);
        for _ in 0..8 {
            s.put_values([0.0, 0.0, 0.2], true);
            assert!(!s.has_finished(0.25, mask));
        }
        assert_eq!(s.correctionless_frames(), 0);
        assert!(s.has_initial_heading());
    }

    #[test]
    fn disabled_rotation_does_not_latch_heading_while_misaimed() {
        let mut s = TargetState::new(4, Bounds::default());
        let mask = AxisMask::ALL.with(Axis::Rotational, false);
        for _ in 0..8 {
            s.put_values([20.0, 0.0, 0.7], true);
            assert!(!s.has_finished(0.25, mask));
        }
        assert_eq!(s.rotationless_frames(), 0);
        assert!(!s.has_initial_heading());
    }

    #[test]
    fn disabled_axis_is_skipped_only_in_final_test() {
        // Depth off but on target: streaks grow and the session converges.
        let mut s = TargetState::new(4, Bounds::default());
        let mask = AxisMask::ALL.with(Axis::Depth, false);
        let mut finished = false;
        for _ in 0..4 {
            s.put_values([0.0, 0.0, 0.7], true);
            finished = s.has_finished(0.25, mask);
        }
        assert!(finished);
    }

    #[test]
    fn depth_band_is_relative_to_bound() {
        let mut s = TargetState::new(1, Bounds::default());
        // Tolerance band is 0.25 * 0.7 = 0.175 either side of the bound.
        s.put_values([0.0, 0.0, 0.6], true);
        assert!(!s.needs_correction_on_axis(Axis::Depth, 0.25));
        s.put_values([0.0, 0.0, 0.5], true);
        assert!(s.needs_correction_on_axis(Axis::Depth, 0.25));
        s.put_values([0.0, 0.0, 0.9], true);
        assert!(s.needs_correction_on_axis(Axis::Depth, 0.25));
    }

    #[test]
    #[should_panic(expected = "empty window")]
    fn filtered_offsets_before_first_frame_panics() {
        let s = TargetState::new(5, Bounds::default());
        let _ = s.filtered_offsets();
    }
}
