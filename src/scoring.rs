//! Bowling scoring engine - standard ten-pin frame rules
//!
//! Pure and stateless: frames are always recomputed in full from the roll
//! history, never mutated incrementally. The state machine guarantees the
//! history only ever contains valid 0-10 counts consistent with standing
//! pins; behavior on malformed input is a programming invariant, not a
//! runtime error path.

use serde::{Deserialize, Serialize};

/// One scoring frame, derived from the roll history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// 1-10
    pub number: u8,
    /// The 1-3 rolls belonging to this frame
    pub rolls: Vec<u8>,
    pub is_strike: bool,
    pub is_spare: bool,
    /// Running total through this frame. `None` until every roll needed for
    /// the strike/spare bonus lookahead exists in the history.
    pub cumulative: Option<u16>,
}

impl Frame {
    /// Pins felled by this frame's own rolls (no bonus)
    pub fn pin_total(&self) -> u16 {
        self.rolls.iter().map(|&r| r as u16).sum()
    }

    /// Whether this frame accepts no further roll
    pub fn is_closed(&self) -> bool {
        if self.number < 10 {
            self.is_strike || self.rolls.len() == 2
        } else if self.is_strike || self.is_spare {
            self.rolls.len() == 3
        } else {
            self.rolls.len() == 2
        }
    }
}

/// Partition a roll history into frames and compute cumulative scores.
///
/// Frames 1-9: a 10 on the first roll closes the frame as a strike, otherwise
/// the frame takes two rolls and is a spare when they sum to 10. Frame 10
/// takes a third roll when opened by a strike or spare. Bonus lookahead reads
/// the flat history, so a strike's bonus may span the following two frames.
pub fn compute_frames(rolls: &[u8]) -> Vec<Frame> {
    let mut frames = Vec::with_capacity(10);
    let mut starts = Vec::with_capacity(10);
    let mut i = 0usize;

    for number in 1u8..=10 {
        if i >= rolls.len() {
            break;
        }
        starts.push(i);

        if number < 10 {
            if rolls[i] == 10 {
                frames.push(Frame {
                    number,
                    rolls: vec![10],
                    is_strike: true,
                    is_spare: false,
                    cumulative: None,
                });
                i += 1;
            } else {
                let taken: Vec<u8> = rolls[i..rolls.len().min(i + 2)].to_vec();
                let is_spare = taken.len() == 2 && taken[0] + taken[1] == 10;
                i += taken.len();
                frames.push(Frame {
                    number,
                    rolls: taken,
                    is_strike: false,
                    is_spare,
                    cumulative: None,
                });
            }
        } else {
            let avail = &rolls[i..];
            let bonus_entitled =
                avail[0] == 10 || (avail.len() >= 2 && avail[0] + avail[1] == 10);
            let take = if bonus_entitled { 3 } else { 2 };
            let taken: Vec<u8> = avail[..avail.len().min(take)].to_vec();
            let is_strike = taken[0] == 10;
            let is_spare = !is_strike && taken.len() >= 2 && taken[0] + taken[1] == 10;
            i += taken.len();
            frames.push(Frame {
                number,
                rolls: taken,
                is_strike,
                is_spare,
                cumulative: None,
            });
        }
    }

    // Second pass: cumulative scores with bonus lookahead over the flat history
    let mut running: Option<u16> = Some(0);
    for (idx, frame) in frames.iter_mut().enumerate() {
        let start = starts[idx];
        let score: Option<u16> = if frame.number < 10 {
            if frame.is_strike {
                // 10 + next two rolls, which may belong to later frames
                match (rolls.get(start + 1), rolls.get(start + 2)) {
                    (Some(&a), Some(&b)) => Some(10 + a as u16 + b as u16),
                    _ => None,
                }
            } else if frame.is_spare {
                rolls.get(start + 2).map(|&a| 10 + a as u16)
            } else if frame.rolls.len() == 2 {
                Some(frame.pin_total())
            } else {
                // Waiting on the second ball
                None
            }
        } else if frame.is_closed() {
            Some(frame.pin_total())
        } else {
            None
        };

        running = match (running, score) {
            (Some(total), Some(s)) => Some(total + s),
            _ => None,
        };
        frame.cumulative = running;
    }

    frames
}

/// True once the tenth frame has produced every roll it is owed
pub fn is_game_complete(frames: &[Frame]) -> bool {
    frames.len() == 10 && frames[9].is_closed()
}

/// Final score if the game is complete
pub fn final_score(frames: &[Frame]) -> Option<u16> {
    if is_game_complete(frames) {
        frames[9].cumulative
    } else {
        None
    }
}
