//! Pin collision and chain-reaction dynamics
//!
//! Two contact paths: the ball striking pins, and toppling pins striking
//! each other. Both are radius checks against a flat deck. Keep the chain
//! scan a direct pairwise loop; n never exceeds 10.

use glam::Vec2;

use super::state::{Ball, Pin};
use crate::consts::*;
use crate::mix_unit;

/// Base impulse speed imparted to a struck pin before weight/restitution
/// scaling
const IMPACT_BASE: f32 = 150.0;
/// How much of the ball's spin bleeds into a struck pin's rotation
const SPIN_TO_PIN: f32 = 14.0;
/// Random component of a struck pin's angular velocity
const PIN_SPIN_JITTER: f32 = 9.0;
/// Speed of the sideways scatter added to chained pins
const CHAIN_JITTER: f32 = 22.0;

/// What the ball did to the deck this tick
#[derive(Debug, Clone, Default)]
pub struct ImpactSummary {
    /// Positions of pins struck this tick, for per-pin particle bursts
    pub hits: Vec<Vec2>,
    /// Accumulated impact force, feeds screen shake
    pub total_force: f32,
}

/// Collide the ball against the deck.
///
/// A pin is a valid target while standing, or once it is down and has come
/// to rest; a pin still tumbling is never re-collided by the ball. Struck
/// pins get an impulse directed away from the ball, scaled by effective
/// weight, the inverse of the cover's restitution, and any equipped-item
/// bonus.
pub fn ball_pin_impacts(
    ball: &Ball,
    pins: &mut [Pin],
    tick: u64,
    impact_bonus: f32,
) -> ImpactSummary {
    let mut summary = ImpactSummary::default();
    let force = IMPACT_BASE * ball.weight / ball.material.restitution() * impact_bonus;

    for pin in pins.iter_mut() {
        if pin.is_down && !pin.at_rest() {
            continue;
        }
        if pin.pos.distance_squared(ball.pos) > BALL_PIN_RADIUS * BALL_PIN_RADIUS {
            continue;
        }

        let away = (pin.pos - ball.pos).try_normalize().unwrap_or(Vec2::Y);
        pin.is_down = true;
        pin.vel = away * force;
        pin.angular_vel = (mix_unit(tick as u32, pin.id as u32) - 0.5) * 2.0 * PIN_SPIN_JITTER
            + ball.spin * SPIN_TO_PIN;

        summary.hits.push(pin.pos);
        summary.total_force += force;
    }

    summary
}

/// Advance pin motion one tick and run the chain-reaction scan.
///
/// Every moving pin integrates with multiplicative damping, then checks all
/// other pins within the pin-pin radius: a standing pin caught there topples
/// with a fraction of the mover's velocity plus scatter; a resting downed
/// pin just gets shoved again.
pub fn step_pins(pins: &mut [Pin], dt: f32, tick: u64) {
    for pin in pins.iter_mut() {
        if !pin.is_down || pin.at_rest() {
            continue;
        }
        pin.pos += pin.vel * dt;
        pin.rotation += pin.angular_vel * dt;
        pin.vel *= PIN_DAMPING;
        pin.angular_vel *= PIN_ANGULAR_DAMPING;
        if pin.at_rest() {
            pin.vel = Vec2::ZERO;
        }
    }

    // Pairwise over at most 10 pins; do not replace with spatial partitioning
    for i in 0..pins.len() {
        if !pins[i].is_down || pins[i].at_rest() {
            continue;
        }
        let mover_pos = pins[i].pos;
        let mover_vel = pins[i].vel;
        let mover_ang = pins[i].angular_vel;

        for j in 0..pins.len() {
            if i == j {
                continue;
            }
            if pins[j].pos.distance_squared(mover_pos) > PIN_PIN_RADIUS * PIN_PIN_RADIUS {
                continue;
            }
            let salt = (i as u32) * 31 + (j as u32) * 57;
            let other = &mut pins[j];
            if !other.is_down {
                other.is_down = true;
                let jitter = Vec2::new(
                    mix_unit(tick as u32, salt) - 0.5,
                    mix_unit(tick as u32, salt + 1) - 0.5,
                ) * CHAIN_JITTER;
                other.vel = mover_vel * PIN_IMPACT_TRANSFER + jitter;
                other.angular_vel = -mover_ang * 0.8;
            } else if other.at_rest() {
                other.vel = mover_vel * (PIN_IMPACT_TRANSFER * 0.5);
            }
        }
    }
}

/// Split heuristic: head pin gone, at least two pins standing, and the leave
/// spread across more than half the lane. Presentation only - some bucket
/// and baby-split patterns will be misclassified, and that is fine.
pub fn split_leave(pins: &[Pin]) -> Option<Vec<u8>> {
    let standing: Vec<&Pin> = pins.iter().filter(|p| !p.is_down).collect();
    if standing.len() < 2 {
        return None;
    }
    if standing.iter().any(|p| p.id == 1) {
        return None;
    }
    let min_x = standing.iter().map(|p| p.pos.x).fold(f32::MAX, f32::min);
    let max_x = standing.iter().map(|p| p.pos.x).fold(f32::MIN, f32::max);
    if max_x - min_x > LANE_WIDTH * 0.5 {
        let mut ids: Vec<u8> = standing.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        Some(ids)
    } else {
        None
    }
}
