use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CollisionOutcome {
    Clear,
    LifeLost,
}

impl GameEngine {
    /// Exact cell equality against the player, checked after every pursuer
    /// has moved. A Chase-mode hit stops the scan: the round is reset.
    pub(super) fn resolve_pursuer_collisions(&mut self) -> CollisionOutcome {
        let player_cell = self.player.cell;
        for idx in 0..self.pursuers.len() {
            if self.pursuers[idx].cell != player_cell {
                continue;
            }
            match self.pursuers[idx].mode {
                PursuerMode::Frightened => self.eat_pursuer(idx),
                PursuerMode::Chase => {
                    self.reset_pursuers();
                    return CollisionOutcome::LifeLost;
                }
            }
        }
        CollisionOutcome::Clear
    }

    fn eat_pursuer(&mut self, idx: usize) {
        let combo = self.clock.take_combo();
        let score = pursuer_score(self.config.pursuer_base_score, combo);
        self.score = self.score.saturating_add(score);
        self.stats.pursuers_eaten += 1;
        self.stats.best_combo = self.stats.best_combo.max(combo + 1);

        let pursuer = &mut self.pursuers[idx];
        pursuer.respawn();
        self.events.push(RuntimeEvent::PursuerEaten {
            archetype: pursuer.archetype,
            score,
            combo,
        });
    }

    pub(super) fn reset_pursuers(&mut self) {
        for pursuer in &mut self.pursuers {
            pursuer.respawn();
        }
        self.clock.reset();
    }
}
