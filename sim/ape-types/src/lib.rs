//! Shared types for the ape physics engine.
//!
//! This crate holds the data that crosses the boundary between the engine
//! and its collaborators:
//!
//! - [`ApeError`] - Every failure the engine reports
//! - [`ParticleHandle`], [`BodyHandle`], [`GeneratorId`] - Generational handles
//! - [`Pose`] - Position/orientation snapshot for renderers
//! - [`SimulationConfig`] - Timestep, default damping, safety checks
//!
//! # Design Philosophy
//!
//! These types are **pure data**. The integrators, force generators and the
//! world live in `ape-core`; a rendering adapter only needs this crate and a
//! handle to look a body up each frame.
//!
//! # Coordinate System
//!
//! Right-handed, Y up (the default gravity points along -Y).
//!
//! # Example
//!
//! ```
//! use ape_types::{BodyHandle, Pose, SimulationConfig};
//! use nalgebra::Vector3;
//!
//! let config = SimulationConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let pose = Pose::from_position(Vector3::new(0.0, 1.0, 0.0));
//! assert_eq!(pose.position.y, 1.0);
//! assert_eq!(BodyHandle::new(0, 0).to_string(), "Body(0v0)");
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod config;
mod error;
mod handle;
mod pose;

pub use config::SimulationConfig;
pub use error::ApeError;
pub use handle::{ArenaHandle, BodyHandle, GeneratorId, ParticleHandle};
pub use pose::Pose;

// Re-export math types for convenience
pub use nalgebra::{Matrix3, Matrix4, Quaternion, UnitQuaternion, Vector3};

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, ApeError>;
