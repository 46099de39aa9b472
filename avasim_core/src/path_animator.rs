//! Path Animator - time-based replay of recorded waypoints.
//!
//! A path of N waypoints is flown as N chained segments. Segment 0 runs from
//! wherever the drone was when replay began to waypoint 0; segment i runs
//! from waypoint i-1 to waypoint i. Each segment lasts the same fixed
//! duration regardless of the recorded timestamps.
//!
//! ```text
//!  pre-play ──seg 0──► wp0 ──seg 1──► wp1 ──seg 2──► wp2   (idle)
//!           |<── D ──>|     |<── D ──>|     |<── D ──>|
//! ```
//!
//! Segment i+1 starts exactly when segment i ends (`start + D`), not at the
//! frame that observed the end, so frame jitter does not accumulate.

use crate::transform::{Path, Transform};
use std::time::Duration;

/// Default time spent on each segment.
pub const DEFAULT_SEGMENT_DURATION: Duration = Duration::from_secs(2);

/// Result of advancing the animator by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorStatus {
    /// Still flying toward waypoint `segment` at `fraction` of the segment
    Animating { segment: usize, fraction: f64 },

    /// Final waypoint reached; the transform now equals it
    Finished,
}

/// In-flight replay of one path.
#[derive(Debug, Clone)]
pub struct PathAnimator {
    path: Path,

    segment_duration: Duration,

    /// Waypoint the current segment flies toward (== path.len() once finished)
    target_index: usize,

    /// Transform captured when the current segment began
    segment_start: Transform,

    /// Clock time the current segment began
    segment_started_at: Duration,

    /// Highest fraction reported for the current segment
    last_fraction: f64,
}

impl PathAnimator {
    /// Begins replay of `path` from `from` at clock time `now`.
    ///
    /// Returns None for an empty path: there is nothing to animate.
    pub fn start(
        path: Path,
        from: Transform,
        now: Duration,
        segment_duration: Duration,
    ) -> Option<Self> {
        if path.is_empty() {
            return None;
        }

        Some(Self {
            path,
            segment_duration,
            target_index: 0,
            segment_start: from,
            segment_started_at: now,
            last_fraction: 0.0,
        })
    }

    /// Interpolation fraction of the current segment at `now`, in [0, 1].
    pub fn fraction_at(&self, now: Duration) -> f64 {
        if self.segment_duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.segment_started_at);
        let t = elapsed.as_secs_f64() / self.segment_duration.as_secs_f64();
        t.clamp(0.0, 1.0)
    }

    /// Moves `transform` to where the replay should be at `now`.
    ///
    /// Completes as many segments as fit in the elapsed time, so a long
    /// frame can finish several short segments at once.
    pub fn advance(&mut self, now: Duration, transform: &mut Transform) -> AnimatorStatus {
        loop {
            let Some(target) = self.path.get(self.target_index).map(|wp| wp.transform) else {
                return AnimatorStatus::Finished;
            };

            // Never run backwards within a segment, even if the clock does
            let t = self.fraction_at(now).max(self.last_fraction);

            if t < 1.0 {
                *transform = Transform::lerp(&self.segment_start, &target, t);
                self.last_fraction = t;
                return AnimatorStatus::Animating {
                    segment: self.target_index,
                    fraction: t,
                };
            }

            *transform = target;
            self.target_index += 1;

            if self.target_index >= self.path.len() {
                return AnimatorStatus::Finished;
            }

            self.segment_start = target;
            self.segment_started_at += self.segment_duration;
            self.last_fraction = 0.0;
        }
    }

    /// Index of the waypoint currently being approached.
    pub fn segment_index(&self) -> usize {
        self.target_index
    }

    /// Transform the current segment started from.
    pub fn segment_start(&self) -> &Transform {
        &self.segment_start
    }

    /// Waypoint the current segment flies toward, if any.
    pub fn target(&self) -> Option<&Transform> {
        self.path.get(self.target_index).map(|wp| &wp.transform)
    }

    /// Number of waypoints not yet reached.
    pub fn remaining(&self) -> usize {
        self.path.len().saturating_sub(self.target_index)
    }

    pub fn is_finished(&self) -> bool {
        self.target_index >= self.path.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn segment_duration(&self) -> Duration {
        self.segment_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    const D: Duration = Duration::from_secs(2);

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn path_of(points: &[[f64; 3]]) -> Path {
        Path::from_transforms(
            points
                .iter()
                .map(|p| Transform::at(Vector3::new(p[0], p[1], p[2]))),
        )
    }

    #[test]
    fn test_empty_path_does_not_start() {
        assert!(PathAnimator::start(Path::default(), Transform::default(), ms(0), D).is_none());
    }

    #[test]
    fn test_single_waypoint_takes_one_segment() {
        let start = Transform::at(Vector3::new(0.0, 20.0, 0.0));
        let waypoint = Transform::new(Vector3::new(10.0, 20.0, -10.0), Vector3::new(0.0, 0.3, 0.0));
        let mut animator = PathAnimator::start(
            Path::from_transforms([waypoint]),
            start,
            ms(1000),
            D,
        )
        .unwrap();

        let mut transform = start;

        let status = animator.advance(ms(1000), &mut transform);
        assert_eq!(status, AnimatorStatus::Animating { segment: 0, fraction: 0.0 });
        assert_eq!(transform, start);

        let status = animator.advance(ms(2999), &mut transform);
        assert!(matches!(status, AnimatorStatus::Animating { segment: 0, .. }));

        let status = animator.advance(ms(3000), &mut transform);
        assert_eq!(status, AnimatorStatus::Finished);
        assert_eq!(transform, waypoint);
        assert!(animator.is_finished());
        assert_eq!(animator.remaining(), 0);
    }

    #[test]
    fn test_midpoint_interpolates_position() {
        let mut animator = PathAnimator::start(
            path_of(&[[10.0, 0.0, 0.0]]),
            Transform::default(),
            ms(0),
            D,
        )
        .unwrap();
        let mut transform = Transform::default();

        animator.advance(ms(500), &mut transform);
        assert_relative_eq!(transform.position.x, 2.5);

        animator.advance(ms(1000), &mut transform);
        assert_relative_eq!(transform.position.x, 5.0);
    }

    #[test]
    fn test_fraction_is_clamped_and_monotone() {
        let mut animator = PathAnimator::start(
            path_of(&[[10.0, 0.0, 0.0], [20.0, 0.0, 0.0]]),
            Transform::default(),
            ms(1000),
            D,
        )
        .unwrap();

        assert_eq!(animator.fraction_at(ms(0)), 0.0);
        assert_eq!(animator.fraction_at(ms(10_000)), 1.0);

        let mut transform = Transform::default();
        let mut last = 0.0;
        for millis in (1000..3000).step_by(100) {
            if let AnimatorStatus::Animating { fraction, .. } = animator.advance(ms(millis), &mut transform) {
                assert!((0.0..=1.0).contains(&fraction));
                assert!(fraction >= last);
                last = fraction;
            }
        }

        // Clock going backwards does not rewind the segment
        let before = transform;
        animator.advance(ms(1500), &mut transform);
        assert_eq!(transform, before);
    }

    #[test]
    fn test_segments_are_chained() {
        let mut animator = PathAnimator::start(
            path_of(&[[10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]]),
            Transform::default(),
            ms(0),
            D,
        )
        .unwrap();
        let mut transform = Transform::default();

        // End of segment 0 exactly
        animator.advance(ms(2000), &mut transform);
        assert_eq!(transform.position, Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(animator.segment_index(), 1);
        assert_eq!(animator.segment_start().position, Vector3::new(10.0, 0.0, 0.0));

        // Halfway through segment 1
        let status = animator.advance(ms(3000), &mut transform);
        assert_eq!(status, AnimatorStatus::Animating { segment: 1, fraction: 0.5 });
        assert_relative_eq!(transform.position.y, 5.0);

        let status = animator.advance(ms(6000), &mut transform);
        assert_eq!(status, AnimatorStatus::Finished);
        assert_eq!(transform.position, Vector3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_segment_timing_does_not_drift_with_late_frames() {
        let mut animator = PathAnimator::start(
            path_of(&[[10.0, 0.0, 0.0], [20.0, 0.0, 0.0]]),
            Transform::default(),
            ms(0),
            D,
        )
        .unwrap();
        let mut transform = Transform::default();

        // First frame after segment 0 ended arrives 500ms late
        let status = animator.advance(ms(2500), &mut transform);
        assert_eq!(status, AnimatorStatus::Animating { segment: 1, fraction: 0.25 });
        assert_relative_eq!(transform.position.x, 12.5);
    }

    #[test]
    fn test_long_frame_completes_several_segments() {
        let mut animator = PathAnimator::start(
            path_of(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]),
            Transform::default(),
            ms(0),
            D,
        )
        .unwrap();
        let mut transform = Transform::default();

        let status = animator.advance(ms(5000), &mut transform);
        assert_eq!(status, AnimatorStatus::Animating { segment: 2, fraction: 0.5 });
        assert_relative_eq!(transform.position.x, 2.5);
    }

    #[test]
    fn test_zero_duration_snaps_to_last_waypoint() {
        let mut animator = PathAnimator::start(
            path_of(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]),
            Transform::default(),
            ms(0),
            Duration::ZERO,
        )
        .unwrap();
        let mut transform = Transform::default();

        assert_eq!(animator.advance(ms(0), &mut transform), AnimatorStatus::Finished);
        assert_eq!(transform.position.x, 2.0);
    }

    #[test]
    fn test_advance_after_finish_is_stable() {
        let mut animator = PathAnimator::start(
            path_of(&[[1.0, 0.0, 0.0]]),
            Transform::default(),
            ms(0),
            D,
        )
        .unwrap();
        let mut transform = Transform::default();

        animator.advance(ms(2000), &mut transform);
        assert_eq!(animator.advance(ms(9000), &mut transform), AnimatorStatus::Finished);
        assert_eq!(transform.position.x, 1.0);
        assert!(animator.target().is_none());
    }
}
