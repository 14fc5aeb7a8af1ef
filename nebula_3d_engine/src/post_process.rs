/// Post-process effect chain.
///
/// Effects run in insertion order after the scene passes of a view. This is
/// the one place where a failure is not absorbed: the first failing effect
/// is logged, wrapped with its name, and returned to the caller.

use crate::error::{Error, Result};
use crate::device::CommandList;
use crate::view::Camera;
use crate::engine_error;

/// A full-screen effect applied after scene rendering
pub trait PostEffect: Send + Sync {
    /// Name used in logs and in `Error::PostProcessFailed`
    fn name(&self) -> &str;

    /// Record the effect's commands
    fn apply(&mut self, cmd: &mut dyn CommandList, camera: &Camera) -> Result<()>;
}

/// Ordered list of post effects
#[derive(Default)]
pub struct PostProcessChain {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostProcessChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an effect to the end of the chain
    pub fn push<E: PostEffect + 'static>(&mut self, effect: E) {
        self.effects.push(Box::new(effect));
    }

    /// Remove every effect named `name`. Returns whether any was removed
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.name() != name);
        self.effects.len() != before
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effect names in execution order
    pub fn names(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    /// Apply every effect in order, stopping at the first failure
    ///
    /// Returns the number of effects applied.
    pub fn run(&mut self, cmd: &mut dyn CommandList, camera: &Camera) -> Result<usize> {
        for (applied, effect) in self.effects.iter_mut().enumerate() {
            if let Err(err) = effect.apply(cmd, camera) {
                let effect_name = effect.name().to_string();
                engine_error!("nebula3d::PostProcessChain",
                    "Post-process effect '{}' failed after {} effect(s): {}", effect_name, applied, err);
                return Err(Error::PostProcessFailed {
                    effect: effect_name,
                    message: err.to_string(),
                });
            }
        }
        Ok(self.effects.len())
    }
}

#[cfg(test)]
#[path = "post_process_tests.rs"]
mod tests;
