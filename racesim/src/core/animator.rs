use crate::core::vehicle::MotionParams;
use helpers::general::{ease_in_out, inverse_ease_in_out};
use serde::Deserialize;

/// * `scale_v` - (ms) Traversal duration per unit of the velocity parameter
/// * `scale_d` - Distance units per percent of the track
/// * `finish_threshold` - (%) Offset beyond which a traversal counts as finished
/// * `clock_period_ms` - (ms) Sampling period of the race clock
/// * `frame_period_ms` - (ms) Period of the host frame loop
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TuningPars {
    pub scale_v: f64,
    pub scale_d: f64,
    pub finish_threshold: f64,
    pub clock_period_ms: u64,
    pub frame_period_ms: u64,
}

impl Default for TuningPars {
    fn default() -> Self {
        TuningPars {
            scale_v: 200.0,
            scale_d: 5000.0,
            finish_threshold: 99.9,
            clock_period_ms: 37,
            frame_period_ms: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Animating,
    Finished,
    Stopped,
}

/// Frame is the outcome of one scheduled frame of an animator.
///
/// * `offset` - (%) Position offset of the vehicle
/// * `completed` - True only for the first frame that crossed the finish threshold
/// * `t_crossing` - (ms) Host timestamp at which the curve crossed the threshold, set on the
///   completing frame
/// * `reschedule` - False once the traversal progress reached 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub offset: f64,
    pub completed: bool,
    pub t_crossing: Option<f64>,
    pub reschedule: bool,
}

/// VehicleAnimator moves one vehicle along the eased position curve. The start instant is taken
/// from the first frame it receives, like a frame callback that records its first timestamp.
#[derive(Debug)]
pub struct VehicleAnimator {
    duration_ms: f64,
    track_share: f64,
    finish_threshold: f64,
    t_start: Option<f64>,
    state: AnimatorState,
    finished: bool,
}

impl VehicleAnimator {
    pub fn new(motion: &MotionParams, tuning: &TuningPars) -> VehicleAnimator {
        VehicleAnimator {
            duration_ms: motion.velocity * tuning.scale_v,
            track_share: motion.distance / tuning.scale_d,
            finish_threshold: tuning.finish_threshold,
            t_start: None,
            state: AnimatorState::Idle,
            finished: false,
        }
    }

    /// start creates an animator that is scheduled for the next frame.
    pub fn start(motion: &MotionParams, tuning: &TuningPars) -> VehicleAnimator {
        let mut animator = VehicleAnimator::new(motion, tuning);
        animator.state = AnimatorState::Animating;
        animator
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// progress returns the traversal progress at time `now`, or zero before the first frame.
    pub fn progress(&self, now: f64) -> f64 {
        match self.t_start {
            Some(t_start) if self.duration_ms > 0.0 => ((now - t_start) / self.duration_ms).max(0.0),
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    pub fn offset_at(&self, p: f64) -> f64 {
        ease_in_out(p) * self.track_share
    }

    /// crossing_time returns the host timestamp at which the offset passes the finish threshold,
    /// or None before the first frame and for tracks too short to ever pass it.
    pub fn crossing_time(&self) -> Option<f64> {
        let t_start = self.t_start?;
        if self.track_share <= self.finish_threshold {
            return None;
        }
        let p_cross = inverse_ease_in_out(self.finish_threshold / self.track_share);
        Some(t_start + p_cross * self.duration_ms)
    }

    /// on_frame advances the animator to `now`. Returns None if the animator is not scheduled.
    pub fn on_frame(&mut self, now: f64) -> Option<Frame> {
        if self.state != AnimatorState::Animating {
            return None;
        }
        if self.t_start.is_none() {
            self.t_start = Some(now);
        }

        // the last frame lands on the end of the curve, however far past p = 1 it is scheduled
        let p = self.progress(now).min(1.0);
        let offset = self.offset_at(p);

        let completed = offset > self.finish_threshold && !self.finished;
        let t_crossing = if completed {
            self.finished = true;
            self.crossing_time().map(|t| t.min(now))
        } else {
            None
        };

        let reschedule = p < 1.0;
        if !reschedule {
            self.state = if self.finished {
                AnimatorState::Finished
            } else {
                AnimatorState::Idle
            };
        }

        Some(Frame {
            offset,
            completed,
            t_crossing,
            reschedule,
        })
    }

    /// cancel unschedules the animator. No further frames are produced afterwards.
    pub fn cancel(&mut self) {
        self.state = AnimatorState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn motion(velocity: f64, distance: f64) -> MotionParams {
        MotionParams { velocity, distance }
    }

    #[test]
    fn offset_at_half_progress_is_half_the_track_share() {
        let tuning = TuningPars::default();
        let mut animator = VehicleAnimator::start(&motion(2.0, 10000.0), &tuning);
        assert_abs_diff_eq!(animator.duration_ms(), 2.0 * tuning.scale_v);

        let first = animator.on_frame(1000.0).unwrap();
        assert_abs_diff_eq!(first.offset, 0.0);

        let mid = animator.on_frame(1000.0 + animator.duration_ms() / 2.0).unwrap();
        assert_abs_diff_eq!(mid.offset, 0.5 * (10000.0 / tuning.scale_d), epsilon = 1e-12);
        assert!(mid.reschedule);
        assert!(!mid.completed);
    }

    #[test]
    fn completion_fires_once() {
        let tuning = TuningPars::default();
        let mut animator = VehicleAnimator::start(&motion(1.0, 500_000.0), &tuning);
        let d = animator.duration_ms();

        animator.on_frame(0.0).unwrap();
        let crossing = animator.on_frame(0.99 * d).unwrap();
        assert!(crossing.offset > tuning.finish_threshold);
        assert!(crossing.completed);

        let later = animator.on_frame(0.995 * d).unwrap();
        assert!(!later.completed);
        assert!(later.reschedule);

        let last = animator.on_frame(1.01 * d).unwrap();
        assert!(!last.completed);
        assert!(!last.reschedule);
        assert_eq!(animator.state(), AnimatorState::Finished);
        assert!(animator.on_frame(1.02 * d).is_none());
    }

    #[test]
    fn coarse_frames_cannot_skip_the_finish() {
        let tuning = TuningPars::default();
        let mut animator = VehicleAnimator::start(&motion(30.0, 500_000.0), &tuning);
        let d = animator.duration_ms();

        animator.on_frame(0.0).unwrap();
        animator.on_frame(0.9 * d).unwrap();
        let last = animator.on_frame(1.5 * d).unwrap();
        assert!(last.completed);
        assert!(!last.reschedule);
        assert_abs_diff_eq!(last.offset, 100.0, epsilon = 1e-9);
        assert_eq!(animator.state(), AnimatorState::Finished);

        let t_crossing = last.t_crossing.unwrap();
        assert!(t_crossing > 0.9 * d && t_crossing < d);
    }

    #[test]
    fn crossing_time_lies_on_the_curve() {
        let tuning = TuningPars::default();
        let mut animator = VehicleAnimator::start(&motion(2.0, 500_000.0), &tuning);
        assert!(animator.crossing_time().is_none());
        animator.on_frame(100.0);

        let t_crossing = animator.crossing_time().unwrap();
        let p = (t_crossing - 100.0) / animator.duration_ms();
        assert_abs_diff_eq!(animator.offset_at(p), tuning.finish_threshold, epsilon = 1e-9);
    }

    #[test]
    fn short_track_runs_out_of_frames_without_finishing() {
        let tuning = TuningPars::default();
        let mut animator = VehicleAnimator::start(&motion(1.0, 10000.0), &tuning);
        animator.on_frame(0.0);
        let last = animator.on_frame(animator.duration_ms()).unwrap();
        assert!(!last.completed);
        assert!(animator.crossing_time().is_none());
        assert_eq!(animator.state(), AnimatorState::Idle);
    }

    #[test]
    fn cancelled_animator_produces_no_frames() {
        let tuning = TuningPars::default();
        let mut animator = VehicleAnimator::start(&motion(1.0, 500_000.0), &tuning);
        animator.on_frame(0.0);
        animator.cancel();
        assert_eq!(animator.state(), AnimatorState::Stopped);
        assert!(animator.on_frame(10.0).is_none());
        assert!(animator.on_frame(1e6).is_none());
    }

    #[test]
    fn new_animator_waits_for_start() {
        let tuning = TuningPars::default();
        let mut animator = VehicleAnimator::new(&motion(1.0, 500_000.0), &tuning);
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert!(animator.on_frame(0.0).is_none());
    }
}
