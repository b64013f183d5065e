//! Sprite-sheet animator
//!
//! Steps through the frames of a sprite sheet at a fixed rate. The current
//! frame index is exposed for whoever maps frames to texture regions.

/// Frame-based animation state
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    frame_count: u32,
    frame_duration: f32,
    looping: bool,
    playing: bool,
    current_frame: u32,
    elapsed: f32,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(1, 0.1)
    }
}

impl Animator {
    /// Looping animation of `frame_count` frames, `frame_duration` seconds each
    pub fn new(frame_count: u32, frame_duration: f32) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_duration: frame_duration.max(f32::EPSILON),
            looping: true,
            playing: true,
            current_frame: 0,
            elapsed: 0.0,
        }
    }

    /// Builder: stop on the last frame instead of wrapping
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Frame currently shown
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Number of frames in the sheet
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Whether frames are advancing
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Resume from the current frame
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Freeze on the current frame
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Back to frame 0 and playing
    pub fn restart(&mut self) {
        self.current_frame = 0;
        self.elapsed = 0.0;
        self.playing = true;
    }

    /// Advance by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        if !self.playing {
            return;
        }
        self.elapsed += delta_time;

        while self.elapsed >= self.frame_duration {
            self.elapsed -= self.frame_duration;
            if self.current_frame + 1 < self.frame_count {
                self.current_frame += 1;
            } else if self.looping {
                self.current_frame = 0;
            } else {
                self.playing = false;
                self.elapsed = 0.0;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_wrap_when_looping() {
        let mut animator = Animator::new(3, 0.1);
        animator.update(0.25);
        assert_eq!(animator.current_frame(), 2);
        animator.update(0.1);
        assert_eq!(animator.current_frame(), 0);
    }

    #[test]
    fn test_one_shot_stops_on_last_frame() {
        let mut animator = Animator::new(2, 0.5).with_looping(false);
        animator.update(5.0);
        assert_eq!(animator.current_frame(), 1);
        assert!(!animator.is_playing());

        animator.restart();
        assert_eq!(animator.current_frame(), 0);
        assert!(animator.is_playing());
    }

    #[test]
    fn test_paused_animator_holds_frame() {
        let mut animator = Animator::new(4, 0.1);
        animator.update(0.15);
        animator.pause();
        animator.update(1.0);
        assert_eq!(animator.current_frame(), 1);
    }
}
