//! Particle and rigid-body dynamics for real-time simulation.
//!
//! This crate provides the integrators, the force generator machinery and the
//! world that ties them into a fixed two-phase tick. It builds on
//! [`ape_types`] for handles, poses, configuration and errors.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         World                                │
//! │  Owns: particle + body arenas, force registries, config     │
//! │  Tick: update_forces (all) → integrate (all) → time         │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ForceRegistry                            │
//! │  Ordered (generator, target) pairs; gravity, drag, custom   │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Particle / RigidBody                         │
//! │  Force accumulators, damped integration, derived data       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering is not part of this crate. A renderer keeps handles and reads
//! [`World::pose`] or [`World::particle_position`] once per frame.
//!
//! # Quick Start
//!
//! ```
//! use ape_core::force::ConstantAcceleration;
//! use ape_core::{SimulationConfig, World};
//! use nalgebra::Vector3;
//!
//! let mut world = World::new(SimulationConfig::default());
//!
//! let ball = world.new_particle().with_position(Vector3::new(0.0, 10.0, 0.0));
//! let ball = world.add_particle(ball);
//!
//! let gravity = world
//!     .particle_forces_mut()
//!     .insert_generator(ConstantAcceleration::earth());
//! world.register_particle_force(gravity, ball).unwrap();
//!
//! for _ in 0..60 {
//!     world.step_fixed().unwrap();
//! }
//!
//! let y = world.particle_position(ball).unwrap().y;
//! assert!(y < 10.0);
//! ```
//!
//! # Features
//!
//! - `parallel` (default): integrate bodies with rayon when
//!   [`SimulationConfig::parallel_integration`] is set.
//! - `serde`: serialization for bodies and the shared types.

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::many_single_char_names,    // Quaternion components read best as w, x, y, z
)]

pub mod arena;
pub mod force;
pub mod math;
mod particle;
mod rigid_body;
mod world;

pub use force::{
    BodyForceRegistry, ConstantAcceleration, Drag, ForceGenerator, ForceRegistry, ForceTarget,
    ParticleForceRegistry, Registration,
};
pub use particle::{Particle, INFINITE_MASS_THRESHOLD};
pub use rigid_body::RigidBody;
pub use world::World;

// Re-export key types from ape-types for convenience
pub use ape_types::{
    ApeError, ArenaHandle, BodyHandle, GeneratorId, ParticleHandle, Pose, SimulationConfig,
};
