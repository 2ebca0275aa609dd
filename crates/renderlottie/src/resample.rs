//! Frame rate resampling.
//!
//! Pure frame-selection math: computes the target capture rate from the
//! native rate and the fps-scale multiplier, and the stride at which frame
//! indices are dropped to achieve it. No side effects.

/// Minimum usable capture rate; scaling below this falls back to native fps
pub const MIN_TARGET_FPS: f64 = 20.0;

/// Target capture fps: `floor(native_fps * fps_scale)`, floored at
/// [`MIN_TARGET_FPS`] (never downsample below a usable threshold).
#[must_use]
pub fn target_fps(native_fps: f64, fps_scale: f64) -> f64 {
    let scaled = (native_fps * fps_scale).floor();
    if scaled < MIN_TARGET_FPS {
        native_fps
    } else {
        scaled
    }
}

/// Interval at which frame indices are skipped to reach `target`.
///
/// `None` disables dropping: when the target equals (or exceeds) the native
/// rate the stride formula degenerates to a division by zero, which is
/// treated as "drop nothing".
#[must_use]
pub fn drop_stride(native_fps: f64, target: f64, total_frames: u32) -> Option<u32> {
    if total_frames == 0 || target >= native_fps {
        return None;
    }

    let total = f64::from(total_frames);
    let dropped = total - total * (target / native_fps);
    if dropped <= 0.0 {
        return None;
    }

    let stride = (total / dropped).round();
    if stride.is_finite() && stride >= 1.0 {
        Some(stride as u32)
    } else {
        None
    }
}

/// Frame-count parity fix: odd totals above one are decremented by one.
/// The host renderer produces a flashing artifact on odd frame counts.
#[must_use]
pub const fn effective_total_frames(total_frames: u32) -> u32 {
    if total_frames > 1 && total_frames % 2 == 1 {
        total_frames - 1
    } else {
        total_frames
    }
}

/// The retained-frame plan for one capture session
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    /// Native animation frame rate
    pub native_fps: f64,
    /// Capture/encode frame rate after resampling
    pub fps: f64,
    /// First playable frame index
    pub first_frame: u32,
    /// Frame count after the parity fix
    pub total_frames: u32,
    stride: Option<u32>,
}

impl FramePlan {
    /// Build the plan for a session.
    #[must_use]
    pub fn new(native_fps: f64, fps_scale: f64, total_frames: u32, first_frame: u32) -> Self {
        let total_frames = effective_total_frames(total_frames);
        let fps = target_fps(native_fps, fps_scale);
        let stride = drop_stride(native_fps, fps, total_frames);
        Self {
            native_fps,
            fps,
            first_frame,
            total_frames,
            stride,
        }
    }

    /// Whether the relative index `i` (0-based within the session) is captured.
    /// Index 0 is always retained; later indices falling on the drop stride
    /// are skipped.
    #[must_use]
    pub fn is_retained(&self, i: u32) -> bool {
        match self.stride {
            Some(stride) => i == 0 || i % stride != 0,
            None => true,
        }
    }

    /// Absolute frame indices to capture, in strictly increasing order
    pub fn retained_frames(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.total_frames)
            .filter(|i| self.is_retained(*i))
            .map(|i| self.first_frame + i)
    }

    /// Number of frames that will be captured
    #[must_use]
    pub fn retained_count(&self) -> u32 {
        (0..self.total_frames).filter(|i| self.is_retained(*i)).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_fps_scales_down() {
        assert!(target_fps(60.0, 0.5) == 30.0);
        assert!(target_fps(50.0, 0.6) == 30.0);
    }

    #[test]
    fn test_target_fps_floors_fraction() {
        // 29.97 * 1.0 floors to 29
        assert!(target_fps(29.97, 1.0) == 29.0);
    }

    #[test]
    fn test_target_fps_never_below_threshold() {
        // 30 * 0.5 = 15 < 20 falls back to native
        assert!(target_fps(30.0, 0.5) == 30.0);
        assert!(target_fps(25.0, 0.7) == 25.0);
    }

    #[test]
    fn test_target_fps_low_native_passes_through() {
        // A native rate below 20 is kept as-is
        assert!(target_fps(12.0, 1.0) == 12.0);
    }

    #[test]
    fn test_drop_stride_disabled_at_native_rate() {
        assert_eq!(drop_stride(30.0, 30.0, 120), None);
        assert_eq!(drop_stride(30.0, 60.0, 120), None);
        assert_eq!(drop_stride(30.0, 15.0, 0), None);
    }

    #[test]
    fn test_drop_stride_half_rate() {
        // Keeping half the frames drops every 2nd index
        assert_eq!(drop_stride(60.0, 30.0, 100), Some(2));
    }

    #[test]
    fn test_drop_stride_five_sixths() {
        // 60 -> 50 fps drops one frame in six
        assert_eq!(drop_stride(60.0, 50.0, 120), Some(6));
    }

    #[test]
    fn test_parity_fix() {
        assert_eq!(effective_total_frames(91), 90);
        assert_eq!(effective_total_frames(90), 90);
        assert_eq!(effective_total_frames(1), 1);
        assert_eq!(effective_total_frames(0), 0);
    }

    #[test]
    fn test_plan_no_drop_retains_everything() {
        let plan = FramePlan::new(30.0, 1.0, 90, 0);
        assert!(plan.fps == 30.0);
        assert_eq!(plan.retained_count(), 90);
        let frames: Vec<u32> = plan.retained_frames().collect();
        assert_eq!(frames.len(), 90);
        assert_eq!(frames[0], 0);
        assert_eq!(frames[89], 89);
    }

    #[test]
    fn test_plan_odd_total_is_decremented() {
        let plan = FramePlan::new(30.0, 1.0, 91, 0);
        assert_eq!(plan.total_frames, 90);
        assert_eq!(plan.retained_count(), 90);
    }

    #[test]
    fn test_plan_respects_first_frame() {
        let plan = FramePlan::new(30.0, 1.0, 4, 10);
        let frames: Vec<u32> = plan.retained_frames().collect();
        assert_eq!(frames, vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_plan_drops_on_stride() {
        let plan = FramePlan::new(60.0, 0.5, 10, 0);
        // target 30fps, stride 2: indices 2,4,6,8 are dropped, 0 is kept
        assert!(plan.native_fps == 60.0);
        assert!(plan.fps == 30.0);
        let frames: Vec<u32> = plan.retained_frames().collect();
        assert_eq!(frames, vec![0, 1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_plan_ordering_is_strictly_increasing() {
        let plan = FramePlan::new(60.0, 0.4, 240, 5);
        let frames: Vec<u32> = plan.retained_frames().collect();
        assert!(frames.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let a = FramePlan::new(48.0, 0.75, 181, 2);
        let b = FramePlan::new(48.0, 0.75, 181, 2);
        assert_eq!(a, b);
        assert_eq!(
            a.retained_frames().collect::<Vec<_>>(),
            b.retained_frames().collect::<Vec<_>>()
        );
    }
}
