//! Tenpin Alley entry point
//!
//! Headless demo: seeds a CPU-vs-CPU match, runs the fixed-timestep loop to
//! completion, feeds roll outcomes through the economy into the saved
//! profile, and prints the scoreboard.

use std::time::{SystemTime, UNIX_EPOCH};

use tenpin_alley::consts::SIM_DT;
use tenpin_alley::economy;
use tenpin_alley::highscores::HighScores;
use tenpin_alley::persistence::{JsonFileStore, ProfileStore};
use tenpin_alley::scoring::Frame;
use tenpin_alley::sim::{
    BallMaterial, GameEvent, GamePhase, GameState, Loadout, Player, PlayerKind, TickInput, tick,
};
use tenpin_alley::tuning::{CpuStyle, Stage};

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5EED_u64);

    let mut store = JsonFileStore::new("profile.json");
    let mut profile = store.load();

    // Equipment gates come from the saved inventory
    let requested = Loadout {
        weight: 2.0,
        spin: 0.3,
        material: BallMaterial::Resin,
        impact_bonus: 1.0,
    };
    let loadout = profile.gate_loadout(requested);

    let players = vec![
        Player::new("Marge", PlayerKind::Cpu(CpuStyle::shark()), loadout),
        Player::new(
            "Norm",
            PlayerKind::Cpu(CpuStyle::rookie()),
            Loadout::default(),
        ),
    ];
    let stage = Stage::roster().swap_remove(0);
    log::info!("seed {seed}, stage {:?}", stage.name);

    let mut state = GameState::new(seed, stage, players);
    let input = TickInput::default();
    let mut safety = 0u64;
    while state.phase != GamePhase::GameOver {
        tick(&mut state, &input, SIM_DT);
        for event in state.drain_events() {
            announce(&event);
        }
        for outcome in state.drain_roll_outcomes() {
            let reward = economy::roll_reward(&outcome);
            profile.record_roll(&outcome, reward);
        }
        safety += 1;
        if safety > 2_000_000 {
            log::error!("demo loop never reached game over");
            break;
        }
    }

    print_scoreboard(&state);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut board = HighScores::load("highscores.json");
    for player in &state.players {
        board.record_game(
            player.name.clone(),
            player.score(),
            strike_count(&player.frames),
            timestamp,
        );
    }
    board.save("highscores.json");

    profile.record_game(state.players[0].score());
    store.save(&profile);
    log::info!(
        "profile: {} xp (level {}), ${}",
        profile.xp,
        economy::level_for_xp(profile.xp),
        profile.money
    );
}

fn announce(event: &GameEvent) {
    match event {
        GameEvent::GameStart { players, lane } => {
            log::info!("game start: {} on a {} lane", players.join(" vs "), lane.as_str())
        }
        GameEvent::FirstBall { player, frame, pins } => {
            log::info!("{player} opens frame {frame} with {pins}")
        }
        GameEvent::Strike { player, frame, .. } => log::info!("STRIKE! {player}, frame {frame}"),
        GameEvent::Spare { player, frame, .. } => log::info!("{player} spares frame {frame}"),
        GameEvent::Gutter { player, frame } => log::info!("{player} gutters frame {frame}"),
        GameEvent::Split { player, standing, .. } => {
            log::info!("{player} left a split: {standing:?}")
        }
        GameEvent::PinImpact { force } => log::debug!("pin impact, force {force:.0}"),
        GameEvent::GameOver { winner, totals } => {
            log::info!("game over, {winner} wins: {totals:?}")
        }
        GameEvent::Recovered { phase } => log::info!("system recovered ({phase})"),
    }
}

/// Strikes actually thrown: any ball that cleared a full rack
fn strike_count(frames: &[Frame]) -> u8 {
    let mut count = frames
        .iter()
        .filter(|f| f.number < 10 && f.is_strike)
        .count() as u8;
    if let Some(tenth) = frames.iter().find(|f| f.number == 10) {
        let mut standing = 10u8;
        let mut fresh = true;
        for &roll in &tenth.rolls {
            if roll == 10 && fresh {
                count += 1;
            }
            standing -= roll.min(standing);
            fresh = standing == 0;
            if standing == 0 {
                standing = 10;
            }
        }
    }
    count
}

fn frame_cell(frame: &Frame) -> String {
    let mark = |roll: u8| if roll == 0 { "-".to_string() } else { roll.to_string() };
    let rolls = &frame.rolls;
    let mut cells: Vec<String> = Vec::new();
    let mut standing = 10u8;
    let mut fresh = true;
    for &roll in rolls {
        if roll == 10 && fresh {
            cells.push("X".to_string());
        } else if roll == standing {
            cells.push("/".to_string());
        } else {
            cells.push(mark(roll));
        }
        standing -= roll.min(standing);
        fresh = standing == 0;
        if standing == 0 {
            standing = 10;
        }
    }
    cells.join(" ")
}

fn print_scoreboard(state: &GameState) {
    println!();
    for player in &state.players {
        let line: Vec<String> = player
            .frames
            .iter()
            .map(|f| {
                let total = f
                    .cumulative
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "?".to_string());
                format!("[{} |{total}]", frame_cell(f))
            })
            .collect();
        println!("{:>8}: {}  = {}", player.name, line.join(" "), player.score());
    }
    println!();
}
