use std::sync::Arc;

use crate::animation::{
    binding::PropertyBinding,
    clip::AnimationClip,
    tracks::KeyframeCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// Playback state of one clip on one model.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    /// For [`LoopMode::Once`]: keep applying the last frame after finishing.
    pub clamp_when_finished: bool,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    running: bool,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            clamp_when_finished: false,
            paused: false,
            enabled: true,
            bindings: Vec::new(),
            running: false,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Whether the action is scheduled and advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running && !self.paused && self.enabled
    }

    /// Whether the mixer should write this action's pose to the scene.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.running && self.enabled && self.weight > 0.0
    }

    /// Restarts from time zero.
    pub fn play(&mut self) {
        self.time = if self.time_scale < 0.0 { self.clip.duration } else { 0.0 };
        self.paused = false;
        self.enabled = true;
        self.running = true;
        self.track_cursors.fill(KeyframeCursor::default());
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.time = 0.0;
    }

    /// Advances time by `dt` seconds. Returns `true` in the update where a
    /// [`LoopMode::Once`] action reaches its end.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.is_running() {
            return false;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            // Nothing to animate: a one-shot finishes immediately.
            return self.finish_once();
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    return self.finish_once();
                }
                if self.time < 0.0 {
                    self.time = 0.0;
                    return self.finish_once();
                }
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                let double_duration = duration * 2.0;
                let t = self.time.rem_euclid(double_duration);
                self.time = if t > duration { double_duration - t } else { t };
            }
        }
        false
    }

    fn finish_once(&mut self) -> bool {
        if self.loop_mode != LoopMode::Once {
            return false;
        }
        self.paused = true;
        if !self.clamp_when_finished {
            self.running = false;
        }
        true
    }
}
