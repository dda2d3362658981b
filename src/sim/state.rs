//! Match state and core simulation types
//!
//! All mutable match state is owned by `GameState` and mutated only from the
//! tick loop. Render/UI layers read the per-tick `Snapshot` view.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::oscillator::Wave;
use crate::consts::*;
use crate::economy::RollOutcome;
use crate::scoring::{self, Frame};
use crate::tuning::{CpuStyle, LaneCondition, Stage};
use crate::{heading_to_dir, lane_center};

/// Ball coverstock. Drives hook response and how much energy survives
/// into the pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BallMaterial {
    #[default]
    Plastic,
    Urethane,
    Resin,
}

impl BallMaterial {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallMaterial::Plastic => "Plastic",
            BallMaterial::Urethane => "Urethane",
            BallMaterial::Resin => "Resin",
        }
    }

    /// How strongly spin converts into lane hook
    pub fn hook_potential(&self) -> f32 {
        match self {
            BallMaterial::Plastic => 0.4,
            BallMaterial::Urethane => 1.0,
            BallMaterial::Resin => 1.5,
        }
    }

    /// Coefficient of restitution. Impulse into pins scales with its inverse:
    /// a deader cover transfers more energy.
    pub fn restitution(&self) -> f32 {
        match self {
            BallMaterial::Plastic => 1.2,
            BallMaterial::Urethane => 1.0,
            BallMaterial::Resin => 0.85,
        }
    }
}

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub speed: f32,
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 24;

/// The ball, re-created for each throw from the bowler's loadout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub radius: f32,
    /// Heading in radians; 0 points straight down-lane, positive drifts right
    pub heading: f32,
    /// Down-lane speed, units per second
    pub speed: f32,
    /// Effective mass/power: base weight times the locked power sample
    pub weight: f32,
    pub spin: f32,
    pub material: BallMaterial,
    /// Sticky for the remainder of the roll once a lane boundary is crossed
    pub in_gutter: bool,
    /// Trail history for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<TrailPoint>,
}

impl Ball {
    /// Inert ball at the stance position for the given lateral offset
    pub fn at_stance(offset_x: f32, material: BallMaterial) -> Self {
        Self {
            pos: Vec2::new(offset_x, 0.0),
            radius: BALL_RADIUS,
            heading: 0.0,
            speed: 0.0,
            weight: WEIGHT_MIN,
            spin: 0.0,
            material,
            in_gutter: false,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Velocity vector derived from heading and speed
    pub fn vel(&self) -> Vec2 {
        heading_to_dir(self.heading) * self.speed
    }

    /// Fraction of the lane travelled, 0 at the foul line
    pub fn travel(&self) -> f32 {
        (self.pos.y / LANE_LENGTH).clamp(0.0, 1.0)
    }

    /// Record current position to trail (call each tick while rolling)
    pub fn record_trail(&mut self) {
        self.trail.insert(
            0,
            TrailPoint {
                pos: self.pos,
                speed: self.speed,
            },
        );
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }
}

/// One pin on the deck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// 1-10, standard rack numbering
    pub id: u8,
    pub pos: Vec2,
    /// Displaced, not necessarily motionless
    pub is_down: bool,
    pub vel: Vec2,
    pub angular_vel: f32,
    pub rotation: f32,
}

impl Pin {
    fn new(id: u8, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            is_down: false,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            rotation: 0.0,
        }
    }

    /// A toppled pin leaves the motion phase once its speed decays below the
    /// rest threshold
    pub fn at_rest(&self) -> bool {
        self.vel.length_squared() < PIN_REST_SPEED * PIN_REST_SPEED
    }

    /// Full ten-pin rack at fixed triangular offsets.
    ///
    /// Row 0 holds the head pin (1) nearest the bowler; rows widen behind it:
    /// 2-3, 4-5-6, 7-8-9-10.
    pub fn rack() -> Vec<Pin> {
        let row_depth = PIN_SPACING * 0.866;
        let mut pins = Vec::with_capacity(10);
        let mut id = 1u8;
        for row in 0u8..4 {
            let count = row + 1;
            for i in 0..count {
                let x = lane_center() + (i as f32 - row as f32 / 2.0) * PIN_SPACING;
                let y = PIN_DECK_Y + row as f32 * row_depth;
                pins.push(Pin::new(id, Vec2::new(x, y)));
                id += 1;
            }
        }
        pins
    }
}

/// Which hand the bowler throws with; biases the stance position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

impl Handedness {
    /// Stance offset from lane center
    pub fn stance_bias(&self) -> f32 {
        match self {
            Handedness::Left => 18.0,
            Handedness::Right => -18.0,
        }
    }
}

/// Human-controlled or CPU with a personality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerKind {
    Human,
    Cpu(CpuStyle),
}

/// The bowler's equipped ball selection, already clamped to what their
/// inventory unlocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    /// Base ball weight before the power multiplier
    pub weight: f32,
    pub spin: f32,
    pub material: BallMaterial,
    /// Flat impulse multiplier from equipped charms/items
    pub impact_bonus: f32,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            weight: 1.4,
            spin: 0.15,
            material: BallMaterial::Plastic,
            impact_bonus: 1.0,
        }
    }
}

impl Loadout {
    /// Clamp user-supplied parameters into legal ranges. Out-of-range values
    /// are silently clamped, never rejected.
    pub fn clamped(mut self, max_weight: f32) -> Self {
        self.weight = self.weight.clamp(WEIGHT_MIN, max_weight.min(WEIGHT_MAX));
        self.spin = self.spin.clamp(SPIN_MIN, SPIN_MAX);
        self.impact_bonus = self.impact_bonus.clamp(1.0, 2.0);
        self
    }
}

/// One bowler in the match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub kind: PlayerKind,
    pub handedness: Handedness,
    pub loadout: Loadout,
    /// Lifetime-stat strength bonus, 0..1, feeds ball speed
    pub strength: f32,
    /// Pins knocked per ball, append-only; sole input to the scoring engine
    pub rolls: Vec<u8>,
    /// Recomputed in full from `rolls` after every ball
    pub frames: Vec<Frame>,
    /// Running strike streak, feeds reward multipliers
    pub consecutive_strikes: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, kind: PlayerKind, loadout: Loadout) -> Self {
        Self {
            name: name.into(),
            kind,
            handedness: Handedness::default(),
            loadout,
            strength: 0.0,
            rolls: Vec::new(),
            frames: Vec::new(),
            consecutive_strikes: 0,
        }
    }

    /// Latest computable running total
    pub fn score(&self) -> u16 {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.cumulative)
            .unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        scoring::is_game_complete(&self.frames)
    }

    /// The ball number (1 or 2+) the bowler is about to throw in the open
    /// frame, 1 when a fresh frame is starting
    pub fn ball_in_frame(&self) -> u8 {
        match self.frames.last() {
            Some(f) if !f.is_closed() => f.rolls.len() as u8 + 1,
            _ => 1,
        }
    }
}

/// Sub-steps of the throw sequence minigame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThrowStep {
    Position,
    Aim,
    Power,
}

/// Top-level machine state, shared across all players in the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    ReadyToBowl,
    ThrowSequence(ThrowStep),
    Rolling,
    PinSettlement,
    BallReturn,
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::ReadyToBowl => "ReadyToBowl",
            GamePhase::ThrowSequence(_) => "ThrowSequence",
            GamePhase::Rolling => "Rolling",
            GamePhase::PinSettlement => "PinSettlement",
            GamePhase::BallReturn => "BallReturn",
            GamePhase::GameOver => "GameOver",
        }
    }
}

/// The three throw-sequence meters. Only the meter belonging to the current
/// sub-step advances; the others hold their locked samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrowMeters {
    /// Lane offset sweep across the playable width
    pub position: Wave,
    /// Angular bias needle, -1..1
    pub aim: Wave,
    /// Power bar, multiplier on base weight
    pub power: Wave,
}

impl ThrowMeters {
    pub fn reset(stance_x: f32) -> Self {
        Self {
            position: Wave::starting_at(
                BALL_RADIUS,
                LANE_WIDTH - BALL_RADIUS,
                POSITION_STEP,
                stance_x,
            ),
            aim: Wave::new(-1.0, 1.0, AIM_STEP),
            power: Wave::new(POWER_MIN, POWER_MAX, POWER_STEP),
        }
    }
}

/// Visual particle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    PinBurst,
    GutterDust,
    Confetti,
}

/// A particle for visual effects
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// Ambience entity on the rail behind the lane; hops on big rolls
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Spectator {
    pub x: f32,
    /// Hop animation intensity, decays to zero
    pub hop: f32,
}

/// Discrete events for the audio/commentary and UI collaborators.
/// Fire-and-forget: the core never awaits a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStart {
        players: Vec<String>,
        lane: LaneCondition,
    },
    /// First ball of a frame that was not a strike
    FirstBall {
        player: String,
        frame: u8,
        pins: u8,
    },
    Strike {
        player: String,
        frame: u8,
        total: Option<u16>,
        spin: f32,
        weight: f32,
        material: BallMaterial,
    },
    Spare {
        player: String,
        frame: u8,
        total: Option<u16>,
    },
    Gutter {
        player: String,
        frame: u8,
    },
    /// Presentation heuristic only; never affects scoring
    Split {
        player: String,
        frame: u8,
        standing: Vec<u8>,
    },
    /// Pin impact feedback; emitted at most once per tick
    PinImpact {
        force: f32,
    },
    GameOver {
        winner: String,
        totals: Vec<(String, u16)>,
    },
    /// Watchdog recovered a stuck phase; neutral status, not an error
    Recovered {
        phase: String,
    },
}

/// Work scheduled for a later tick. Epoch-stamped: a record whose epoch no
/// longer matches the machine is stale and is dropped unfired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// End the settlement dwell and count the roll
    FinishSettlement,
    /// Ball return done; rack pins and hand off the next throw
    FinishBallReturn,
    /// CPU think-time elapsed; synthesize and trigger the throw
    CpuThrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deferred {
    pub fire_at: u64,
    pub epoch: u32,
    pub action: DeferredAction,
}

/// Full vs partial pin reset ahead of the next ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RerackDecision {
    /// Fresh rack of all ten
    Full,
    /// Standing pins stay; downed pins are swept
    Partial,
}

/// Read-only per-tick view for the rendering collaborator
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub ball: &'a Ball,
    pub pins: &'a [Pin],
    pub trail: &'a [TrailPoint],
    pub particles: &'a [Particle],
    pub spectators: &'a [Spectator],
    pub phase: GamePhase,
    pub throw_step: Option<ThrowStep>,
    pub screen_shake: f32,
}

/// Complete match state. The tick loop is the single writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Bumped on every phase transition; stamps deferred work
    pub epoch: u32,
    pub phase: GamePhase,
    /// Tick the current phase was entered; watchdog input
    pub phase_entered_at: u64,
    pub stage: Stage,
    pub players: Vec<Player>,
    pub current: usize,
    pub ball: Ball,
    pub pins: Vec<Pin>,
    pub meters: ThrowMeters,
    /// Scheduled deferred work, epoch-stamped
    pub pending: Vec<Deferred>,
    /// Pin reset to apply when the ball return finishes
    pub next_rack: RerackDecision,
    /// Set once every player's game is complete; applied at ball return
    pub match_over: bool,
    /// Events accumulated this tick, drained by collaborators
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Per-roll outcomes for the economy collaborator
    #[serde(skip)]
    pub roll_outcomes: Vec<RollOutcome>,
    /// Screen-shake magnitude, decays each tick
    pub screen_shake: f32,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    pub spectators: Vec<Spectator>,
}

impl GameState {
    /// Create a match on the given stage. Players bowl in vec order.
    pub fn new(seed: u64, stage: Stage, players: Vec<Player>) -> Self {
        assert!(!players.is_empty(), "a match needs at least one bowler");

        let spectators = (0..10)
            .map(|i| Spectator {
                x: 12.0 + i as f32 * (LANE_WIDTH - 24.0) / 9.0,
                hop: 0.0,
            })
            .collect();

        let stance = lane_center() + players[0].handedness.stance_bias();
        let material = players[0].loadout.material;
        let lane = stage.lane;
        let names: Vec<String> = players.iter().map(|p| p.name.clone()).collect();

        let mut state = Self {
            seed,
            time_ticks: 0,
            epoch: 0,
            phase: GamePhase::ReadyToBowl,
            phase_entered_at: 0,
            stage,
            players,
            current: 0,
            ball: Ball::at_stance(stance, material),
            pins: Pin::rack(),
            meters: ThrowMeters::reset(stance),
            pending: Vec::new(),
            next_rack: RerackDecision::Full,
            match_over: false,
            events: Vec::new(),
            roll_outcomes: Vec::new(),
            screen_shake: 0.0,
            particles: Vec::new(),
            spectators,
        };

        state.push_event(GameEvent::GameStart {
            players: names,
            lane,
        });
        state
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.current]
    }

    /// Enter a phase: stamps the entry tick and invalidates all pending
    /// deferred work scheduled under the previous phase.
    pub fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.phase_entered_at = self.time_ticks;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Schedule deferred work under the current epoch
    pub fn schedule(&mut self, delay_ticks: u64, action: DeferredAction) {
        self.pending.push(Deferred {
            fire_at: self.time_ticks + delay_ticks,
            epoch: self.epoch,
            action,
        });
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the accumulated events to a collaborator
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hand the accumulated roll outcomes to the economy collaborator
    pub fn drain_roll_outcomes(&mut self) -> Vec<RollOutcome> {
        std::mem::take(&mut self.roll_outcomes)
    }

    /// Put the ball back at the current bowler's stance, inert
    pub fn reset_ball_to_stance(&mut self) {
        let player = &self.players[self.current];
        let stance = lane_center() + player.handedness.stance_bias();
        self.ball = Ball::at_stance(stance, player.loadout.material);
        self.meters = ThrowMeters::reset(stance);
    }

    /// Apply the queued rack decision: fresh rack, or sweep downed pins and
    /// settle the survivors back upright in place.
    pub fn apply_rack(&mut self) {
        match self.next_rack {
            RerackDecision::Full => self.pins = Pin::rack(),
            RerackDecision::Partial => {
                self.pins.retain(|p| !p.is_down);
                for pin in &mut self.pins {
                    pin.vel = Vec2::ZERO;
                    pin.angular_vel = 0.0;
                    pin.rotation = 0.0;
                }
            }
        }
    }

    /// Spawn a particle, evicting the oldest when at the cap
    pub fn spawn_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Read-only view for the renderer. The renderer must not mutate any of
    /// this; the borrow checker holds it to that.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            ball: &self.ball,
            pins: &self.pins,
            trail: &self.ball.trail,
            particles: &self.particles,
            spectators: &self.spectators,
            phase: self.phase,
            throw_step: match self.phase {
                GamePhase::ThrowSequence(step) => Some(step),
                _ => None,
            },
            screen_shake: self.screen_shake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rack_geometry() {
        let pins = Pin::rack();
        assert_eq!(pins.len(), 10);
        // Head pin sits on the center line, front of the deck
        assert_eq!(pins[0].id, 1);
        assert!((pins[0].pos.x - lane_center()).abs() < f32::EPSILON);
        assert!(pins.iter().all(|p| p.pos.y >= PIN_DECK_Y));
        // Back row corners are pins 7 and 10
        assert!(pins[6].pos.x < pins[9].pos.x);
        // Every pin stands inside the lane
        assert!(
            pins.iter()
                .all(|p| p.pos.x > 0.0 && p.pos.x < LANE_WIDTH)
        );
    }

    #[test]
    fn test_loadout_clamping() {
        let wild = Loadout {
            weight: 99.0,
            spin: -3.0,
            material: BallMaterial::Resin,
            impact_bonus: 7.0,
        };
        let clamped = wild.clamped(2.0);
        assert_eq!(clamped.weight, 2.0);
        assert_eq!(clamped.spin, SPIN_MIN);
        assert_eq!(clamped.impact_bonus, 2.0);
    }

    #[test]
    fn test_set_phase_bumps_epoch() {
        let players = vec![Player::new("A", PlayerKind::Human, Loadout::default())];
        let mut state = GameState::new(7, Stage::default(), players);
        let before = state.epoch;
        state.set_phase(GamePhase::Rolling);
        assert_eq!(state.epoch, before + 1);
        assert_eq!(state.phase_entered_at, state.time_ticks);
    }

    #[test]
    fn test_partial_rack_keeps_standing_pins_only() {
        let players = vec![Player::new("A", PlayerKind::Human, Loadout::default())];
        let mut state = GameState::new(7, Stage::default(), players);
        for pin in state.pins.iter_mut().take(4) {
            pin.is_down = true;
            pin.vel = Vec2::new(50.0, 0.0);
        }
        state.next_rack = RerackDecision::Partial;
        state.apply_rack();
        assert_eq!(state.pins.len(), 6);
        assert!(state.pins.iter().all(|p| !p.is_down && p.at_rest()));
    }

    #[test]
    fn test_snapshot_reflects_phase() {
        let players = vec![Player::new("A", PlayerKind::Human, Loadout::default())];
        let mut state = GameState::new(7, Stage::default(), players);
        state.set_phase(GamePhase::ThrowSequence(ThrowStep::Aim));
        let snap = state.snapshot();
        assert_eq!(snap.throw_step, Some(ThrowStep::Aim));
        assert_eq!(snap.pins.len(), 10);
    }
}
