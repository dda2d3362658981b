//! Tenpin Alley - arcade ten-pin bowling simulation core
//!
//! Core modules:
//! - `scoring`: Pure bowling scoring engine (frames, spares, strikes, tenth-frame rules)
//! - `sim`: Deterministic simulation (throw sequence, ball physics, pin dynamics)
//! - `tuning`: Data-driven game balance (lane conditions, stages, CPU styles)
//! - `economy`: Per-roll reward hooks for the progression collaborator
//! - `persistence`: Profile/inventory snapshot load/save
//! - `highscores`: Top-10 leaderboard

pub mod economy;
pub mod highscores;
pub mod persistence;
pub mod scoring;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use persistence::{Profile, ProfileStore};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz tick loop)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Lane dimensions. X runs across the lane, Y runs from the foul line
    /// toward the pin deck.
    pub const LANE_WIDTH: f32 = 220.0;
    pub const LANE_LENGTH: f32 = 760.0;
    /// Rest position for a guttered ball, offset outside each lane edge
    pub const GUTTER_DEPTH: f32 = 14.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 22.0;
    pub const BALL_BASE_SPEED: f32 = 340.0;
    /// User-selectable weight range (effective mass/power)
    pub const WEIGHT_MIN: f32 = 1.0;
    pub const WEIGHT_MAX: f32 = 2.5;
    /// Signed curvature bias range
    pub const SPIN_MIN: f32 = -0.5;
    pub const SPIN_MAX: f32 = 0.5;

    /// Pin rack geometry. Spacing keeps the back row spanning most of the
    /// lane width, matching real deck proportions.
    pub const PIN_RADIUS: f32 = 12.0;
    pub const PIN_SPACING: f32 = 63.0;
    /// Down-lane position of the head pin
    pub const PIN_DECK_Y: f32 = 600.0;

    /// Collision radii: ball-to-pin and the tighter pin-to-pin check
    pub const BALL_PIN_RADIUS: f32 = BALL_RADIUS + PIN_RADIUS + 2.0;
    pub const PIN_PIN_RADIUS: f32 = PIN_RADIUS * 2.0 + 1.0;

    /// Pin motion damping, applied multiplicatively each tick
    pub const PIN_DAMPING: f32 = 0.94;
    pub const PIN_ANGULAR_DAMPING: f32 = 0.92;
    /// Below this speed a toppled pin counts as at rest
    pub const PIN_REST_SPEED: f32 = 2.0;
    /// Fraction of a moving pin's velocity passed to a struck pin
    pub const PIN_IMPACT_TRANSFER: f32 = 0.55;

    /// Hook model: zone boundaries as fractions of lane travel
    pub const SKID_ZONE_END: f32 = 1.0 / 3.0;
    pub const BACKEND_ZONE_START: f32 = 2.0 / 3.0;
    /// Hook force multiplier inside the skid zone
    pub const SKID_FACTOR: f32 = 0.15;
    /// Hook force multiplier in the backend (snap zone)
    pub const SNAP_FACTOR: f32 = 2.4;
    /// Scales spin * hook-potential into radians of heading change per tick
    pub const HOOK_SCALE: f32 = 0.004;

    /// Aim sample (-1..1) maps into this narrow launch arc, radians
    pub const LAUNCH_ARC: f32 = 0.26;
    /// Power meter bounds (multiplier on base ball weight)
    pub const POWER_MIN: f32 = 0.6;
    pub const POWER_MAX: f32 = 1.5;

    /// Throw-sequence oscillator steps, per tick
    pub const POSITION_STEP: f32 = 3.2;
    pub const AIM_STEP: f32 = 0.045;
    pub const POWER_STEP: f32 = 0.03;

    /// Dwell times, in ticks
    pub const SETTLE_DWELL_TICKS: u64 = 50;
    pub const BALL_RETURN_TICKS: u64 = 45;
    pub const CPU_THINK_TICKS: u64 = 55;
    pub const CELEBRATE_TICKS: u64 = 70;

    /// Watchdog timeouts, in ticks, for transient phases
    pub const WATCHDOG_ROLLING_TICKS: u64 = 60 * 8;
    pub const WATCHDOG_SETTLE_TICKS: u64 = 60 * 6;
    pub const WATCHDOG_RETURN_TICKS: u64 = 60 * 6;
}

/// Unit direction for a lane heading (0 = straight down-lane, positive = right)
#[inline]
pub fn heading_to_dir(heading: f32) -> Vec2 {
    Vec2::new(heading.sin(), heading.cos())
}

/// Center line of the lane
#[inline]
pub fn lane_center() -> f32 {
    consts::LANE_WIDTH / 2.0
}

/// Deterministic hash mix for per-tick jitter that must not consume RNG state
#[inline]
pub fn mix(seed: u32, salt: u32) -> u32 {
    seed.wrapping_mul(2654435761).wrapping_add(salt.wrapping_mul(7919))
}

/// Hash mix mapped to a unit float in [0, 1)
#[inline]
pub fn mix_unit(seed: u32, salt: u32) -> f32 {
    (mix(seed, salt) % 1000) as f32 / 1000.0
}
