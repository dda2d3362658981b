//! Data-driven game balance
//!
//! Lane oil conditions, stage presets for arcade progression, and CPU
//! opponent styles. Everything here is plain data consumed by the sim.

use serde::{Deserialize, Serialize};

/// Lane oil condition. Affects ball speed (friction) and hook response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LaneCondition {
    /// Worn, dry lane: slower ball, aggressive hook
    Dry,
    #[default]
    Normal,
    /// Fresh heavy oil: fast ball, muted hook
    Oily,
}

impl LaneCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaneCondition::Dry => "Dry",
            LaneCondition::Normal => "Normal",
            LaneCondition::Oily => "Oily",
        }
    }

    /// Multiplier on base ball speed
    pub fn friction_coeff(&self) -> f32 {
        match self {
            LaneCondition::Dry => 0.92,
            LaneCondition::Normal => 1.0,
            LaneCondition::Oily => 1.08,
        }
    }

    /// Multiplier on hook force
    pub fn hook_mod(&self) -> f32 {
        match self {
            LaneCondition::Dry => 1.35,
            LaneCondition::Normal => 1.0,
            LaneCondition::Oily => 0.65,
        }
    }
}

/// One arcade stage: a lane condition plus stage-wide physics modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub lane: LaneCondition,
    /// Extra multiplier on ball speed for this stage
    pub friction_mod: f32,
    /// Extra multiplier on hook force for this stage
    pub hook_mult: f32,
    /// Flat heading offset added to every launch, radians. Crooked house
    /// lanes on later stages.
    pub accuracy_bias: f32,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            name: "Neighborhood Lanes".to_string(),
            lane: LaneCondition::Normal,
            friction_mod: 1.0,
            hook_mult: 1.0,
            accuracy_bias: 0.0,
        }
    }
}

impl Stage {
    /// Stage progression, in play order
    pub fn roster() -> Vec<Stage> {
        vec![
            Stage::default(),
            Stage {
                name: "Desert Classic".to_string(),
                lane: LaneCondition::Dry,
                friction_mod: 0.97,
                hook_mult: 1.15,
                accuracy_bias: 0.0,
            },
            Stage {
                name: "Midnight Oil".to_string(),
                lane: LaneCondition::Oily,
                friction_mod: 1.05,
                hook_mult: 1.0,
                accuracy_bias: 0.012,
            },
            Stage {
                name: "The Crooked Crown".to_string(),
                lane: LaneCondition::Dry,
                friction_mod: 1.0,
                hook_mult: 1.3,
                accuracy_bias: -0.02,
            },
        ]
    }
}

/// CPU opponent personality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuStyle {
    /// 0..1, scales down the random jitter on every synthesized parameter
    pub difficulty: f32,
    /// Spin the CPU tries to throw with
    pub spin_pref: f32,
    /// Power-meter sample the CPU aims for
    pub power_pref: f32,
}

impl CpuStyle {
    /// Wild throws, low power
    pub fn rookie() -> Self {
        Self {
            difficulty: 0.25,
            spin_pref: 0.05,
            power_pref: 0.85,
        }
    }

    /// Steady mid-tier opponent
    pub fn league_regular() -> Self {
        Self {
            difficulty: 0.6,
            spin_pref: 0.2,
            power_pref: 1.0,
        }
    }

    /// Heavy resin hook, near-perfect timing
    pub fn shark() -> Self {
        Self {
            difficulty: 0.92,
            spin_pref: 0.35,
            power_pref: 1.2,
        }
    }
}
