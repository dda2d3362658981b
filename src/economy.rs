//! Per-roll reward hooks for the progression collaborator
//!
//! The sim exposes a `RollOutcome` after every ball; everything downstream
//! (XP curves, money, daily challenges, achievements) belongs to the
//! economy collaborator and is free to replace this reference curve.

use serde::{Deserialize, Serialize};

/// What one ball did, as the economy sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub player: String,
    pub frame: u8,
    pub pins: u8,
    pub strike: bool,
    pub spare: bool,
    pub split: bool,
    /// Streak count including this roll
    pub consecutive_strikes: u32,
}

/// XP and money awarded for a roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    pub xp: u32,
    pub money: u32,
}

/// Consecutive strikes multiply rewards: x1.0, x1.25, x1.5 ... capped at x2.5
pub fn streak_multiplier(consecutive_strikes: u32) -> f32 {
    (1.0 + consecutive_strikes.saturating_sub(1) as f32 * 0.25).min(2.5)
}

/// Reference reward curve
pub fn roll_reward(outcome: &RollOutcome) -> Reward {
    let mut xp = outcome.pins as u32 * 2;
    let mut money = outcome.pins as u32;

    if outcome.strike {
        xp += 25;
        money += 15;
    } else if outcome.spare {
        xp += 12;
        money += 8;
    }
    // Leaving a split is bad luck, not skill; small consolation only
    if outcome.split {
        xp += 3;
    }

    let mult = if outcome.strike {
        streak_multiplier(outcome.consecutive_strikes)
    } else {
        1.0
    };

    Reward {
        xp: (xp as f32 * mult) as u32,
        money: (money as f32 * mult) as u32,
    }
}

/// Level curve: each level costs progressively more XP
pub fn level_for_xp(xp: u64) -> u32 {
    ((xp as f64 / 100.0).sqrt()) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(pins: u8, strike: bool, spare: bool, streak: u32) -> RollOutcome {
        RollOutcome {
            player: "test".to_string(),
            frame: 1,
            pins,
            strike,
            spare,
            split: false,
            consecutive_strikes: streak,
        }
    }

    #[test]
    fn test_streak_multiplier_ramps_and_caps() {
        assert_eq!(streak_multiplier(0), 1.0);
        assert_eq!(streak_multiplier(1), 1.0);
        assert_eq!(streak_multiplier(2), 1.25);
        assert_eq!(streak_multiplier(3), 1.5);
        assert_eq!(streak_multiplier(100), 2.5);
    }

    #[test]
    fn test_strike_beats_spare_beats_open() {
        let strike = roll_reward(&outcome(10, true, false, 1));
        let spare = roll_reward(&outcome(4, false, true, 0));
        let open = roll_reward(&outcome(4, false, false, 0));
        assert!(strike.xp > spare.xp);
        assert!(spare.xp > open.xp);
    }

    #[test]
    fn test_streak_multiplies_strike_rewards() {
        let first = roll_reward(&outcome(10, true, false, 1));
        let third = roll_reward(&outcome(10, true, false, 3));
        assert_eq!(third.xp, (first.xp as f32 * 1.5) as u32);
    }

    #[test]
    fn test_level_curve() {
        assert_eq!(level_for_xp(0), 0);
        assert_eq!(level_for_xp(99), 0);
        assert_eq!(level_for_xp(100), 1);
        assert_eq!(level_for_xp(400), 2);
        assert_eq!(level_for_xp(10_000), 10);
    }
}
