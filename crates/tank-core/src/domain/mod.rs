//! Domain entities for the scanning tank client.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies: nothing in here opens a socket, spawns a task, or reads a
//! file.  Outer layers (the session link, the HTTP side channel, the operator
//! console) depend on these types, never the other way round.

/// Operator commands: directions, validated step sizes, and the command enum.
pub mod command;

/// Rig geometry: positions, axis ranges, and the physical travel envelope.
pub mod geometry;

/// Device-space → normalized-space coordinate transform.
pub mod mapper;

/// Pressure readings and session connectivity state.
pub mod telemetry;
