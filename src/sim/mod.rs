//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG / hash-mix jitter only
//! - One writer: the tick loop owns every mutation
//! - No rendering or platform dependencies

pub mod collision;
pub mod oscillator;
pub mod state;
pub mod tick;

pub use collision::{ImpactSummary, ball_pin_impacts, split_leave, step_pins};
pub use oscillator::Wave;
pub use state::{
    Ball, BallMaterial, DeferredAction, GameEvent, GamePhase, GameState, Handedness, Loadout,
    Particle, ParticleKind, Pin, Player, PlayerKind, RerackDecision, Snapshot, Spectator,
    ThrowMeters, ThrowStep, TrailPoint,
};
pub use tick::{TickInput, launch_throw, rerack_decision, tick};
