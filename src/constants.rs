pub const FRAME_RATE: u32 = 60;
pub const FRAME_MS: u64 = 1000 / FRAME_RATE as u64;

/// Display frames between two movement ticks.
pub const MOVE_DELAY_FRAMES: u32 = 8;

/// Length of the frightened window, in movement ticks (400 frames at the default pacing).
pub const FRIGHTENED_TICKS: u32 = 50;

pub const PURSUER_BASE_SCORE: u32 = 200;
pub const MAX_COMBO_INDEX: u32 = 3;
pub const DOT_POINTS: u32 = 10;
pub const POWER_PELLET_POINTS: u32 = 50;
pub const START_LIVES: u32 = 3;

pub const AMBUSH_LOOKAHEAD: i32 = 4;
pub const FLANK_LOOKAHEAD: i32 = 2;
pub const OPPORTUNIST_RADIUS: i32 = 8;

/// `base * 2^combo_index`, with the index capped at [`MAX_COMBO_INDEX`].
pub fn pursuer_score(base: u32, combo_index: u32) -> u32 {
    base << combo_index.min(MAX_COMBO_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pursuer_score_doubles_then_caps() {
        let scores: Vec<u32> = (0..6)
            .map(|combo| pursuer_score(PURSUER_BASE_SCORE, combo))
            .collect();
        assert_eq!(scores, vec![200, 400, 800, 1600, 1600, 1600]);
    }

    #[test]
    fn frightened_window_matches_frame_budget() {
        assert_eq!(FRIGHTENED_TICKS * MOVE_DELAY_FRAMES, 400);
    }
}
