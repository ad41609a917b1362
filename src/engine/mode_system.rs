use super::*;

/// Single shared frightened countdown plus the eaten-combo counter.
#[derive(Clone, Debug)]
pub(super) struct ModeClock {
    duration: u32,
    remaining: u32,
    combo: u32,
}

impl ModeClock {
    pub(super) fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: 0,
            combo: 0,
        }
    }

    pub(super) fn remaining(&self) -> u32 {
        self.remaining
    }

    pub(super) fn combo(&self) -> u32 {
        self.combo
    }

    /// Restarts the countdown at full length. A live countdown is replaced,
    /// never queued behind.
    pub(super) fn trigger(&mut self) -> u32 {
        self.remaining = self.duration;
        self.combo = 0;
        self.duration
    }

    /// Returns true on the tick the countdown runs out.
    pub(super) fn advance(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.combo = 0;
            return true;
        }
        false
    }

    /// Combo index for the next eaten pursuer.
    pub(super) fn take_combo(&mut self) -> u32 {
        let index = self.combo;
        self.combo = self.combo.saturating_add(1);
        index
    }

    pub(super) fn reset(&mut self) {
        self.remaining = 0;
        self.combo = 0;
    }
}

impl GameEngine {
    /// Power item consumed: every pursuer turns Frightened with the same fresh
    /// timer, wherever it is.
    pub(super) fn trigger_frightened(&mut self) {
        let ticks = self.clock.trigger();
        for pursuer in &mut self.pursuers {
            pursuer.frighten(ticks);
        }
        self.events.push(RuntimeEvent::FrightenedStarted { ticks });
    }

    pub(super) fn advance_mode_clock(&mut self) {
        for pursuer in &mut self.pursuers {
            if pursuer.mode == PursuerMode::Frightened {
                pursuer.frightened_remaining = pursuer.frightened_remaining.saturating_sub(1);
                if pursuer.frightened_remaining == 0 {
                    pursuer.calm();
                }
            }
        }

        if self.clock.advance() {
            for pursuer in &mut self.pursuers {
                pursuer.calm();
            }
            self.events.push(RuntimeEvent::FrightenedEnded);
        }
    }
}
