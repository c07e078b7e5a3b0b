use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::animation::action::AnimationAction;
use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, TrackData};
use crate::scene::{NodeHandle, Scene};

new_key_type! {
    pub struct ActionHandle;
}

/// Notifications produced by [`AnimationMixer::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerEvent {
    /// A [`LoopMode::Once`](crate::animation::LoopMode::Once) action reached its end.
    Finished { action: ActionHandle },
}

/// Per-model animation context: owns the actions bound to one model root and
/// writes their sampled values into the scene every update.
pub struct AnimationMixer {
    root: NodeHandle,
    actions: SlotMap<ActionHandle, AnimationAction>,
    by_clip: FxHashMap<String, ActionHandle>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: SlotMap::with_key(),
            by_clip: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Returns the action for `clip`, binding it to the model on first use.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>, scene: &Scene) -> ActionHandle {
        if let Some(&handle) = self.by_clip.get(&clip.name) {
            return handle;
        }

        let mut action = AnimationAction::new(Arc::clone(clip));
        action.bindings = Binder::bind(scene, self.root, clip);
        let handle = self.actions.insert(action);
        self.by_clip.insert(clip.name.clone(), handle);
        handle
    }

    #[must_use]
    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle)
    }

    /// Number of actions currently running (including clamped, finished ones).
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.actions.values().filter(|a| a.is_applied()).count()
    }

    pub fn play(&mut self, handle: ActionHandle) {
        if let Some(action) = self.actions.get_mut(handle) {
            action.play();
        }
    }

    pub fn stop(&mut self, handle: ActionHandle) {
        if let Some(action) = self.actions.get_mut(handle) {
            action.stop();
        }
    }

    pub fn stop_all_action(&mut self) {
        for action in self.actions.values_mut() {
            action.stop();
        }
    }

    /// Advances every action by `dt` seconds and applies the result to `scene`.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) -> SmallVec<[MixerEvent; 2]> {
        let mut events = SmallVec::new();

        for (handle, action) in &mut self.actions {
            if action.update(dt) {
                events.push(MixerEvent::Finished { action: handle });
            }
        }

        for action in self.actions.values_mut() {
            if !action.is_applied() {
                continue;
            }
            apply_action(action, scene);
        }

        events
    }
}

fn apply_action(action: &mut AnimationAction, scene: &mut Scene) {
    let clip = Arc::clone(action.clip());
    let time = action.time;

    for binding in &action.bindings {
        let Some(track) = clip.tracks.get(binding.track_index) else {
            continue;
        };
        let cursor = &mut action.track_cursors[binding.track_index];
        let Some(node) = scene.get_node_mut(binding.node) else {
            continue;
        };

        match (&track.data, binding.target) {
            (TrackData::Vector3(t), TargetPath::Translation) => {
                if let Some(value) = t.sample_with_cursor(time, cursor) {
                    node.transform.position = value;
                }
            }
            (TrackData::Vector3(t), TargetPath::Scale) => {
                if let Some(value) = t.sample_with_cursor(time, cursor) {
                    node.transform.scale = value;
                }
            }
            (TrackData::Quaternion(t), TargetPath::Rotation) => {
                if let Some(value) = t.sample_with_cursor(time, cursor) {
                    node.transform.rotation = value;
                }
            }
            _ => {}
        }
    }
}
