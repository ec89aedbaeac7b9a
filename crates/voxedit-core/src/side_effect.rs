//! Which world side effects a write should trigger, and when.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A secondary consequence of changing a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Record the change in the edit history.
    History,
    Heightmaps,
    Lighting,
    /// Notify neighboring blocks of the change.
    Neighbors,
    /// Run the block's own placement update.
    Update,
    /// Fix invalid block states after placement.
    Validation,
    EntityAi,
    Events,
    Poi,
    /// Send the change to connected clients.
    Network,
}

impl SideEffect {
    pub const ALL: [Self; 10] = [
        Self::History,
        Self::Heightmaps,
        Self::Lighting,
        Self::Neighbors,
        Self::Update,
        Self::Validation,
        Self::EntityAi,
        Self::Events,
        Self::Poi,
        Self::Network,
    ];

    #[must_use]
    pub const fn default_state(self) -> SideEffectState {
        match self {
            Self::EntityAi | Self::Events => SideEffectState::Off,
            _ => SideEffectState::On,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffectState {
    #[default]
    Off,
    /// Applied once, when the edit commits.
    Delayed,
    On,
}

/// A state for every [`SideEffect`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BTreeMap<SideEffect, SideEffectState>", into = "BTreeMap<SideEffect, SideEffectState>")]
pub struct SideEffectSet {
    states: [SideEffectState; SideEffect::ALL.len()],
}

impl SideEffectSet {
    /// The engine's normal behavior for a single block change.
    #[must_use]
    pub fn defaults() -> Self {
        let mut states = [SideEffectState::Off; SideEffect::ALL.len()];
        for effect in SideEffect::ALL {
            states[effect.index()] = effect.default_state();
        }
        Self { states }
    }

    /// Every effect off.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            states: [SideEffectState::Off; SideEffect::ALL.len()],
        }
    }

    #[must_use]
    pub const fn with(mut self, effect: SideEffect, state: SideEffectState) -> Self {
        self.states[effect.index()] = state;
        self
    }

    #[must_use]
    pub const fn state(&self, effect: SideEffect) -> SideEffectState {
        self.states[effect.index()]
    }

    /// Whether `effect` runs at all, now or deferred.
    #[must_use]
    pub const fn should_apply(&self, effect: SideEffect) -> bool {
        !matches!(self.state(effect), SideEffectState::Off)
    }

    #[must_use]
    pub fn has_delayed(&self) -> bool {
        self.states.contains(&SideEffectState::Delayed)
    }

    /// Effects in a given state.
    pub fn in_state(&self, state: SideEffectState) -> impl Iterator<Item = SideEffect> + '_ {
        SideEffect::ALL
            .into_iter()
            .filter(move |effect| self.state(*effect) == state)
    }
}

impl Default for SideEffectSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl core::fmt::Debug for SideEffectSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(SideEffect::ALL.iter().map(|e| (e, self.state(*e))))
            .finish()
    }
}

impl From<BTreeMap<SideEffect, SideEffectState>> for SideEffectSet {
    /// Missing effects keep their default state.
    fn from(map: BTreeMap<SideEffect, SideEffectState>) -> Self {
        map.into_iter()
            .fold(Self::defaults(), |set, (effect, state)| set.with(effect, state))
    }
}

impl From<SideEffectSet> for BTreeMap<SideEffect, SideEffectState> {
    fn from(set: SideEffectSet) -> Self {
        SideEffect::ALL.into_iter().map(|e| (e, set.state(e))).collect()
    }
}

/// Selects which states of a [`SideEffectSet`] a world should act on.
///
/// A write applies the `immediate` view; a commit replays recorded changes
/// through the `deferred` view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SideEffectApplier {
    set: SideEffectSet,
    accept: Accept,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Accept {
    On,
    Delayed,
    Any,
}

impl SideEffectApplier {
    #[must_use]
    pub const fn immediate(set: SideEffectSet) -> Self {
        Self { set, accept: Accept::On }
    }

    #[must_use]
    pub const fn deferred(set: SideEffectSet) -> Self {
        Self {
            set,
            accept: Accept::Delayed,
        }
    }

    #[must_use]
    pub const fn all(set: SideEffectSet) -> Self {
        Self { set, accept: Accept::Any }
    }

    #[must_use]
    pub const fn should_apply(&self, effect: SideEffect) -> bool {
        match (self.accept, self.set.state(effect)) {
            (_, SideEffectState::Off) => false,
            (Accept::Any, _) | (Accept::On, SideEffectState::On) | (Accept::Delayed, SideEffectState::Delayed) => true,
            _ => false,
        }
    }

    /// Whether this applier would do nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        SideEffect::ALL.iter().all(|e| !self.should_apply(*e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let set = SideEffectSet::defaults();
        assert_eq!(set.state(SideEffect::Lighting), SideEffectState::On);
        assert_eq!(set.state(SideEffect::EntityAi), SideEffectState::Off);
        assert!(!set.has_delayed());
    }

    #[test]
    fn test_applier_views() {
        let set = SideEffectSet::none()
            .with(SideEffect::Lighting, SideEffectState::Delayed)
            .with(SideEffect::Neighbors, SideEffectState::On);

        let now = SideEffectApplier::immediate(set);
        assert!(now.should_apply(SideEffect::Neighbors));
        assert!(!now.should_apply(SideEffect::Lighting));

        let later = SideEffectApplier::deferred(set);
        assert!(later.should_apply(SideEffect::Lighting));
        assert!(!later.should_apply(SideEffect::Neighbors));

        assert!(SideEffectApplier::all(SideEffectSet::none()).is_empty());
    }

    #[test]
    fn test_serde_partial_map() {
        let set: SideEffectSet = serde_json::from_str(r#"{"lighting":"delayed"}"#).unwrap();
        assert_eq!(set.state(SideEffect::Lighting), SideEffectState::Delayed);
        assert_eq!(set.state(SideEffect::Neighbors), SideEffectState::On);
        assert!(set.has_delayed());
    }
}
