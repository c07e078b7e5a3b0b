//! Animation Player
//!
//! Owns the single mixing context of the avatar and the "current animation"
//! marker. `play` returns a [`PlayHandle`] that resolves once the clip ends:
//!
//! ```rust,ignore
//! let handle = player.play(AnimationKind::Typing, &mut scene)?;
//! // ... frames tick the player ...
//! assert_eq!(handle.await, PlayOutcome::Finished);
//! ```
//!
//! A new `play` supersedes the previous one: its handle resolves with
//! [`PlayOutcome::Superseded`] instead of hanging. `reset_to_rest` resolves
//! it with [`PlayOutcome::Stopped`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::animation::{
    ActionHandle, AnimationKind, AnimationMixer, AnimationSet, LoopMode, MixerEvent,
};
use crate::errors::{Result, StageError};
use crate::scene::{NodeHandle, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing(AnimationKind),
}

/// How a [`PlayHandle`] resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The clip played to its end.
    Finished,
    /// Another `play` started before this one finished.
    Superseded,
    /// Playback was stopped by a reset or the player went away.
    Stopped,
}

/// Resolves when the animation started by [`AnimationPlayer::play`] ends.
#[derive(Debug)]
#[must_use = "a PlayHandle does nothing unless awaited or polled"]
pub struct PlayHandle {
    kind: AnimationKind,
    receiver: oneshot::Receiver<PlayOutcome>,
}

impl PlayHandle {
    fn resolved(kind: AnimationKind, outcome: PlayOutcome) -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(outcome);
        Self { kind, receiver }
    }

    #[must_use]
    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    /// Non-blocking check; `None` while the animation is still running.
    pub fn try_outcome(&mut self) -> Option<PlayOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Some(PlayOutcome::Stopped),
        }
    }
}

impl Future for PlayHandle {
    type Output = PlayOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(PlayOutcome::Stopped))
    }
}

/// The one completion listener allowed at a time.
struct PendingPlay {
    kind: AnimationKind,
    action: ActionHandle,
    sender: oneshot::Sender<PlayOutcome>,
}

impl PendingPlay {
    fn resolve(self, outcome: PlayOutcome) {
        log::debug!("'{}' resolved as {outcome:?}", self.kind);
        // The waiter may have dropped its handle.
        let _ = self.sender.send(outcome);
    }
}

#[derive(Default)]
pub struct AnimationPlayer {
    mixer: Option<AnimationMixer>,
    clips: AnimationSet,
    current: Option<AnimationKind>,
    pending: Option<PendingPlay>,
    transitioning: bool,
}

impl AnimationPlayer {
    /// A player without a model; every operation fails with
    /// [`StageError::NotReady`] until [`AnimationPlayer::bind`] is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the mixing context for the model rooted at `root`.
    pub fn bind(&mut self, root: NodeHandle, clips: AnimationSet) {
        self.unbind();
        log::debug!("Player bound with {} clips", clips.loaded_count());
        self.mixer = Some(AnimationMixer::new(root));
        self.clips = clips;
    }

    /// Drops the mixing context. A pending play resolves as stopped.
    pub fn unbind(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.resolve(PlayOutcome::Stopped);
        }
        self.mixer = None;
        self.clips = AnimationSet::new();
        self.current = None;
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.mixer.is_some()
    }

    #[must_use]
    pub fn clips(&self) -> &AnimationSet {
        &self.clips
    }

    #[must_use]
    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.mixer.as_ref()
    }

    /// The animation marked as current, `None` at rest.
    #[must_use]
    pub fn current(&self) -> Option<AnimationKind> {
        self.current
    }

    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.current.map_or(PlayerState::Idle, PlayerState::Playing)
    }

    /// Observable status only: set while a reset runs. It is never checked
    /// before a reset, so it does not serialize callers.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Stops whatever is playing and starts `kind` once, holding its last
    /// frame when it ends.
    ///
    /// Playing [`AnimationKind::Rest`] resets to the bind pose and returns an
    /// already finished handle.
    ///
    /// # Errors
    /// - [`StageError::NotReady`] without a model/mixer
    /// - [`StageError::ClipMissing`] when `kind` has no clip data
    pub fn play(&mut self, kind: AnimationKind, scene: &mut Scene) -> Result<PlayHandle> {
        if kind.is_rest() {
            self.reset_to_rest(scene)?;
            return Ok(PlayHandle::resolved(kind, PlayOutcome::Finished));
        }
        let Some(mixer) = self.mixer.as_mut() else {
            return Err(StageError::NotReady("animation system not initialized"));
        };
        let clip = self
            .clips
            .get(kind)
            .cloned()
            .ok_or(StageError::ClipMissing(kind))?;

        if let Some(previous) = self.pending.take() {
            previous.resolve(PlayOutcome::Superseded);
        }
        mixer.stop_all_action();

        let action = mixer.clip_action(&clip, scene);
        if let Some(a) = mixer.action_mut(action) {
            a.loop_mode = LoopMode::Once;
            a.clamp_when_finished = true;
        }
        mixer.play(action);

        let (sender, receiver) = oneshot::channel();
        self.pending = Some(PendingPlay {
            kind,
            action,
            sender,
        });
        self.current = Some(kind);
        log::info!("Playing '{kind}' ({:.2}s)", clip.duration);

        Ok(PlayHandle { kind, receiver })
    }

    /// Stops all actions, returns every skinned part of the model to its
    /// bind pose and clears the current animation.
    ///
    /// # Errors
    /// [`StageError::NotReady`] without a model/mixer.
    pub fn reset_to_rest(&mut self, scene: &mut Scene) -> Result<()> {
        let Some(mixer) = self.mixer.as_mut() else {
            return Err(StageError::NotReady("animation system not initialized"));
        };

        self.transitioning = true;
        mixer.stop_all_action();
        scene.pose_skeletons_under(mixer.root());
        if let Some(pending) = self.pending.take() {
            pending.resolve(PlayOutcome::Stopped);
        }
        self.current = None;
        self.transitioning = false;

        log::info!("Reset to rest pose");
        Ok(())
    }

    /// Advances the mixing context by `dt` seconds. Returns the animation
    /// that finished during this tick, if any. Does nothing when unbound.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) -> Option<AnimationKind> {
        let mixer = self.mixer.as_mut()?;
        let events = mixer.update(dt, scene);

        let mut finished = None;
        for MixerEvent::Finished { action } in events {
            if self.pending.as_ref().is_some_and(|p| p.action == action)
                && let Some(pending) = self.pending.take()
            {
                let kind = pending.kind;
                pending.resolve(PlayOutcome::Finished);
                self.current = None;
                finished = Some(kind);
                log::info!("'{kind}' finished");
            }
        }
        finished
    }
}
