use super::*;

impl GameEngine {
    /// Turns toward the buffered direction when that way is open, then
    /// advances one cell along the facing. Facing is kept when blocked.
    pub(super) fn move_player(&mut self) {
        let desired = self.player.desired_dir;
        if desired != Direction::None && self.maze.open_step(self.player.cell, desired).is_some() {
            self.player.facing = desired;
        }
        if let Some(next) = self.maze.open_step(self.player.cell, self.player.facing) {
            self.player.cell = next;
        }
    }

    pub(super) fn collect_pickup(&mut self) {
        let cell = self.player.cell;
        match self.maze.remove_dot(cell) {
            Some(Tile::Dot) => {
                self.score = self.score.saturating_add(DOT_POINTS);
                self.pickups_left = self.pickups_left.saturating_sub(1);
                self.stats.dots_eaten += 1;
                self.events.push(RuntimeEvent::DotEaten {
                    row: cell.row,
                    col: cell.col,
                });
            }
            Some(Tile::PowerPellet) => {
                self.score = self.score.saturating_add(POWER_PELLET_POINTS);
                self.pickups_left = self.pickups_left.saturating_sub(1);
                self.stats.pellets_eaten += 1;
                self.events.push(RuntimeEvent::PowerPelletEaten {
                    row: cell.row,
                    col: cell.col,
                });
                self.trigger_frightened();
            }
            Some(Tile::Wall | Tile::Empty) | None => {}
        }
    }

    pub(super) fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.stats.lives_lost += 1;
        self.events.push(RuntimeEvent::LifeLost {
            lives_left: self.lives,
        });
        self.player.respawn();
        if self.lives == 0 {
            self.finish(GameOverReason::OutOfLives);
        }
    }

    /// Open directions out of the player's cell, in enumeration order.
    pub fn player_exits(&self) -> Vec<Direction> {
        Direction::CARDINALS
            .into_iter()
            .filter(|dir| self.maze.open_step(self.player.cell, *dir).is_some())
            .collect()
    }
}
