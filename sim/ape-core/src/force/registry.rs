use ape_types::{ApeError, ArenaHandle, BodyHandle, GeneratorId, ParticleHandle};
use tracing::{debug, warn};

use super::ForceGenerator;
use crate::arena::Arena;
use crate::particle::Particle;
use crate::rigid_body::RigidBody;

/// Registry over particles.
pub type ParticleForceRegistry = ForceRegistry<Particle, ParticleHandle>;

/// Registry over rigid bodies.
pub type BodyForceRegistry = ForceRegistry<RigidBody, BodyHandle>;

/// One generator paired with one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration<H> {
    /// Generator to run.
    pub generator: GeneratorId,
    /// Target whose accumulator receives the contribution.
    pub target: H,
}

/// Ordered set of (generator, target) pairs.
///
/// The registry owns its generators; targets are referred to by handle and
/// live in an [`Arena`] the caller passes to [`Self::update_forces`].
/// Pairs are never deduplicated: registering the same pair twice applies the
/// generator twice. Pairs persist until removed.
#[derive(Debug)]
pub struct ForceRegistry<T, H> {
    generators: Arena<GeneratorId, Box<dyn ForceGenerator<T>>>,
    registrations: Vec<Registration<H>>,
}

impl<T, H: ArenaHandle> Default for ForceRegistry<T, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H: ArenaHandle> ForceRegistry<T, H> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generators: Arena::new(),
            registrations: Vec::new(),
        }
    }

    // =========================================================================
    // Generators
    // =========================================================================

    /// Take ownership of a generator and return its id.
    pub fn insert_generator<G>(&mut self, generator: G) -> GeneratorId
    where
        G: ForceGenerator<T> + 'static,
    {
        let id = self.generators.insert(Box::new(generator));
        debug!(generator = %id, "inserted force generator");
        id
    }

    /// Drop a generator together with every registration that names it.
    pub fn remove_generator(&mut self, id: GeneratorId) -> Option<Box<dyn ForceGenerator<T>>> {
        let generator = self.generators.remove(id)?;
        let before = self.registrations.len();
        self.registrations.retain(|r| r.generator != id);
        debug!(
            generator = %id,
            dropped = before - self.registrations.len(),
            "removed force generator"
        );
        Some(generator)
    }

    /// Look a generator up by id.
    #[must_use]
    pub fn generator(&self, id: GeneratorId) -> Option<&dyn ForceGenerator<T>> {
        self.generators.get(id).map(|g| &**g)
    }

    /// Number of generators owned by the registry.
    #[must_use]
    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    // =========================================================================
    // Registrations
    // =========================================================================

    /// Append a (generator, target) pair.
    ///
    /// # Errors
    ///
    /// [`ApeError::UnknownGenerator`] if the registry does not own `generator`.
    pub fn add(&mut self, generator: GeneratorId, target: H) -> ape_types::Result<()> {
        if !self.generators.contains(generator) {
            return Err(ApeError::UnknownGenerator(generator.to_string()));
        }
        self.registrations.push(Registration { generator, target });
        debug!(generator = %generator, target = %target, "registered force");
        Ok(())
    }

    /// Remove the first pair matching `(generator, target)`.
    ///
    /// Returns `false`, and changes nothing, when no such pair exists.
    pub fn remove(&mut self, generator: GeneratorId, target: H) -> bool {
        let found = self
            .registrations
            .iter()
            .position(|r| r.generator == generator && r.target == target);

        match found {
            Some(index) => {
                self.registrations.remove(index);
                debug!(generator = %generator, target = %target, "unregistered force");
                true
            }
            None => {
                warn!(
                    generator = %generator,
                    target = %target,
                    "no matching force registration to remove"
                );
                false
            }
        }
    }

    /// Drop every pair whose target is `target`. Returns how many were dropped.
    pub fn remove_target(&mut self, target: H) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.target != target);
        before - self.registrations.len()
    }

    /// Drop every pair. Generators stay owned; targets are not touched.
    pub fn clear(&mut self) {
        debug!(dropped = self.registrations.len(), "cleared force registry");
        self.registrations.clear();
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether no pair is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registered pairs in application order.
    pub fn registrations(&self) -> impl Iterator<Item = &Registration<H>> {
        self.registrations.iter()
    }

    // =========================================================================
    // Application
    // =========================================================================

    /// Run every registered generator against its target, in registration
    /// order. Pairs whose target is no longer in `targets` are skipped.
    ///
    /// Must complete before any target is integrated for the same tick.
    pub fn update_forces(&self, targets: &mut Arena<H, T>, dt: f64) {
        for registration in &self.registrations {
            let Some(generator) = self.generators.get(registration.generator) else {
                continue;
            };
            let Some(target) = targets.get_mut(registration.target) else {
                warn!(
                    generator = %registration.generator,
                    target = %registration.target,
                    "force registration refers to a missing target"
                );
                continue;
            };
            generator.update_force(target, dt);
        }
    }
}
