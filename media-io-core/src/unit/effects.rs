use std::sync::Arc;

use crate::models::sample_buffer::SampleBuffer;
use crate::traits::effect::Effect;

/// Insertion-ordered set of effect handlers, keyed by handler identity.
///
/// Lives on the owning unit's execution context; registration requests from
/// other contexts arrive as commands, so a buffer traversal always sees a
/// consistent snapshot. New registrations take effect on the next buffer,
/// never mid-traversal.
#[derive(Default)]
pub struct EffectRegistry {
    effects: Vec<Arc<dyn Effect>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an effect. Returns `true` if newly inserted, `false` if the
    /// same handler (by identity) is already registered.
    pub fn register(&mut self, effect: Arc<dyn Effect>) -> bool {
        if self.contains(&effect) {
            return false;
        }
        log::debug!("effect registry: registered {}", effect.name());
        self.effects.push(effect);
        true
    }

    /// Remove an effect by identity. Returns `true` if an entry was removed.
    pub fn unregister(&mut self, effect: &Arc<dyn Effect>) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| !Arc::ptr_eq(e, effect));
        let removed = self.effects.len() != before;
        if removed {
            log::debug!("effect registry: unregistered {}", effect.name());
        }
        removed
    }

    pub fn contains(&self, effect: &Arc<dyn Effect>) -> bool {
        self.effects.iter().any(|e| Arc::ptr_eq(e, effect))
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run the chain over `buffer`, each effect receiving the previous
    /// effect's output, in insertion order.
    pub fn apply(&self, buffer: SampleBuffer) -> SampleBuffer {
        self.effects
            .iter()
            .fold(buffer, |buffer, effect| effect.apply(buffer))
    }
}
