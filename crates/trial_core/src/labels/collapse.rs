/// Tower collapse: the top object's height compared with its height on the
/// push frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseTracker {
    force_frame: u32,
    warmup: u32,
    settle: u32,
    max_frames: u32,
    initial_height: Option<f64>,
    fallen: bool,
    fall_frame: Option<u32>,
}

impl CollapseTracker {
    pub fn new(force_frame: u32, warmup: u32, settle: u32, max_frames: u32) -> Self {
        Self {
            force_frame,
            warmup,
            settle,
            max_frames,
            initial_height: None,
            fallen: false,
            fall_frame: None,
        }
    }

    /// Feed the top object's height; returns the reported `did_fall`.
    pub fn observe(&mut self, frame: u32, height: Option<f64>) -> bool {
        if frame == self.force_frame {
            self.initial_height = height;
        } else if frame > self.force_frame {
            if let (Some(initial), Some(h)) = (self.initial_height, height) {
                self.fallen = h < 0.5 * initial;
                if self.fallen && self.fall_frame.is_none() {
                    self.fall_frame = Some(frame);
                }
            }
        }
        self.did_fall(frame)
    }

    pub fn did_fall(&self, frame: u32) -> bool {
        frame >= self.force_frame.max(self.warmup) && self.fallen
    }

    /// First frame on which the tower was below half height.
    pub fn fall_frame(&self) -> Option<u32> {
        self.fall_frame
    }

    pub fn is_finished(&self, frame: u32) -> bool {
        frame > self.max_frames
            || self
                .fall_frame
                .map(|f| frame > f.saturating_add(self.settle))
                .unwrap_or(false)
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_until_force_frame() {
        // A tower already lying on the floor before the push.
        let mut t = CollapseTracker::new(15, 0, 60, 600);
        for frame in 0..15 {
            assert!(!t.observe(frame, Some(0.01)));
        }
        assert!(!t.observe(15, Some(1.2)));
        assert!(t.observe(16, Some(0.3)));
        assert_eq!(t.fall_frame(), Some(16));
    }

    #[test]
    fn test_warmup_hides_early_fall() {
        let mut t = CollapseTracker::new(0, 30, 60, 600);
        t.observe(0, Some(1.0));
        assert!(!t.observe(5, Some(0.1)));
        assert_eq!(t.fall_frame(), Some(5));
        assert!(t.observe(30, Some(0.1)));
    }

    #[test]
    fn test_finishes_after_settle_or_ceiling() {
        let mut t = CollapseTracker::new(0, 30, 60, 600);
        t.observe(0, Some(1.0));
        t.observe(40, Some(0.2));
        assert!(!t.is_finished(100));
        assert!(t.is_finished(101));

        let quiet = CollapseTracker::new(0, 30, 60, 600);
        assert!(!quiet.is_finished(600));
        assert!(quiet.is_finished(601));
    }
}
