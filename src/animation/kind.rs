use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::clip::AnimationClip;
use crate::errors::StageError;

/// The fixed set of animation states shared by the player and the camera presets.
///
/// `Rest` is the neutral bind pose and never has clip data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Rest,
    Climbing,
    Frisbee,
    Gaming,
    Typing,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 5] = [
        AnimationKind::Rest,
        AnimationKind::Climbing,
        AnimationKind::Frisbee,
        AnimationKind::Gaming,
        AnimationKind::Typing,
    ];

    /// Kinds backed by a motion clip.
    pub const PLAYABLE: [AnimationKind; 4] = [
        AnimationKind::Climbing,
        AnimationKind::Frisbee,
        AnimationKind::Gaming,
        AnimationKind::Typing,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationKind::Rest => "rest",
            AnimationKind::Climbing => "climbing",
            AnimationKind::Frisbee => "frisbee",
            AnimationKind::Gaming => "gaming",
            AnimationKind::Typing => "typing",
        }
    }

    /// Human readable label for UI buttons.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AnimationKind::Rest => "Rest",
            AnimationKind::Climbing => "Climbing",
            AnimationKind::Frisbee => "Frisbee",
            AnimationKind::Gaming => "Gaming",
            AnimationKind::Typing => "Typing",
        }
    }

    #[must_use]
    pub fn is_rest(self) -> bool {
        self == AnimationKind::Rest
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationKind {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StageError::UnknownAnimation(s.to_string()))
    }
}

/// One optional clip slot per [`AnimationKind`]. `Rest` is always empty.
#[derive(Debug, Clone, Default)]
pub struct AnimationSet {
    clips: [Option<Arc<AnimationClip>>; 5],
}

impl AnimationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(kind: AnimationKind) -> usize {
        kind as usize
    }

    /// Stores `clip` under `kind`, renaming it to the kind's name.
    /// Storing under `Rest` is ignored.
    pub fn insert(&mut self, kind: AnimationKind, clip: AnimationClip) {
        if kind.is_rest() {
            log::warn!("Ignoring clip '{}' stored under rest", clip.name);
            return;
        }
        self.clips[Self::slot(kind)] = Some(Arc::new(clip.renamed(kind.as_str())));
    }

    #[must_use]
    pub fn get(&self, kind: AnimationKind) -> Option<&Arc<AnimationClip>> {
        self.clips[Self::slot(kind)].as_ref()
    }

    #[must_use]
    pub fn contains(&self, kind: AnimationKind) -> bool {
        self.get(kind).is_some()
    }

    /// Number of kinds that have clip data.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.clips.iter().filter(|c| c.is_some()).count()
    }

    /// Iterates over the kinds with clip data.
    pub fn loaded(&self) -> impl Iterator<Item = (AnimationKind, &Arc<AnimationClip>)> {
        AnimationKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|clip| (kind, clip)))
    }
}
