//! Generational handles for arena-stored simulation objects.
//!
//! A handle is an `(index, generation)` pair. The index names a slot in an
//! arena; the generation is bumped every time the slot is freed, so a handle
//! kept after its object was removed never aliases whatever is stored there
//! next.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Common interface of every handle type stored in an arena.
pub trait ArenaHandle: Copy + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display {
    /// Build a handle from its raw parts.
    fn from_raw_parts(index: u32, generation: u32) -> Self;

    /// Slot index.
    fn index(self) -> u32;

    /// Slot generation at the time the handle was issued.
    fn generation(self) -> u32;
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            /// Create a handle from raw parts.
            #[must_use]
            pub const fn new(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }
        }

        impl ArenaHandle for $name {
            fn from_raw_parts(index: u32, generation: u32) -> Self {
                Self::new(index, generation)
            }

            fn index(self) -> u32 {
                self.index
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}v{})", $label, self.index, self.generation)
            }
        }
    };
}

define_handle!(
    /// Handle to a particle stored in a world.
    ParticleHandle,
    "Particle"
);

define_handle!(
    /// Handle to a rigid body stored in a world.
    BodyHandle,
    "Body"
);

define_handle!(
    /// Identifier of a force generator owned by a registry.
    GeneratorId,
    "Generator"
);
