use crate::constants::{
    pursuer_score, DOT_POINTS, FRAME_RATE, FRIGHTENED_TICKS, MOVE_DELAY_FRAMES,
    POWER_PELLET_POINTS, PURSUER_BASE_SCORE, START_LIVES,
};
use crate::maze::{Level, Maze, Tile};
use crate::rng::Rng;
use crate::types::{
    Archetype, Cell, Direction, GameConfig, GameOverReason, GameSummary, PlayerView,
    PursuerMode, PursuerView, RuntimeEvent, Snapshot, WorldInit,
};

mod collision_system;
mod mode_system;
pub mod movement;
mod player_system;
pub mod targeting;
mod utils;

use self::collision_system::CollisionOutcome;
use self::mode_system::ModeClock;
use self::movement::resolve_step;
use self::targeting::{compute_target, TargetInputs};

const SPAWN_DIRECTION: Direction = Direction::Left;

#[derive(Clone, Copy, Debug)]
struct PlayerInternal {
    cell: Cell,
    facing: Direction,
    desired_dir: Direction,
    spawn: Cell,
}

impl PlayerInternal {
    fn new(spawn: Cell) -> Self {
        Self {
            cell: spawn,
            facing: Direction::None,
            desired_dir: Direction::None,
            spawn,
        }
    }

    fn respawn(&mut self) {
        *self = Self::new(self.spawn);
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            row: self.cell.row,
            col: self.cell.col,
            dir: self.facing,
            desired_dir: self.desired_dir,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Pursuer {
    archetype: Archetype,
    cell: Cell,
    dir: Direction,
    mode: PursuerMode,
    frightened_remaining: u32,
    spawn: Cell,
    target: Option<Cell>,
}

impl Pursuer {
    fn new(archetype: Archetype, spawn: Cell) -> Self {
        Self {
            archetype,
            cell: spawn,
            dir: SPAWN_DIRECTION,
            mode: PursuerMode::Chase,
            frightened_remaining: 0,
            spawn,
            target: None,
        }
    }

    fn frighten(&mut self, ticks: u32) {
        if ticks == 0 {
            self.calm();
            return;
        }
        self.mode = PursuerMode::Frightened;
        self.frightened_remaining = ticks;
    }

    fn calm(&mut self) {
        self.mode = PursuerMode::Chase;
        self.frightened_remaining = 0;
    }

    fn respawn(&mut self) {
        *self = Self::new(self.archetype, self.spawn);
    }

    fn view(&self) -> PursuerView {
        PursuerView {
            archetype: self.archetype,
            row: self.cell.row,
            col: self.cell.col,
            dir: self.dir,
            mode: self.mode,
            frightened_remaining: self.frightened_remaining,
            target: self.target,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct RoundStats {
    dots_eaten: u32,
    pellets_eaten: u32,
    pursuers_eaten: u32,
    lives_lost: u32,
    best_combo: u32,
}

#[derive(Clone, Debug, Default)]
pub struct GameEngineOptions {
    pub frightened_ticks_override: Option<u32>,
    pub move_delay_frames_override: Option<u32>,
    pub start_lives_override: Option<u32>,
}

/// Simulation context for one round: the maze, the player, the four
/// pursuers, the shared mode clock and the seeded random source.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: GameConfig,

    maze: Maze,
    rng: Rng,
    player: PlayerInternal,
    pursuers: Vec<Pursuer>,
    clock: ModeClock,
    events: Vec<RuntimeEvent>,
    stats: RoundStats,

    score: u32,
    lives: u32,
    pickups_left: usize,
    frame_counter: u64,
    frames_since_move: u32,
    tick_counter: u64,
    ended: bool,
    end_reason: Option<GameOverReason>,
}

impl GameEngine {
    pub fn new(level: Level, seed: u32, options: GameEngineOptions) -> Self {
        let config = GameConfig {
            frame_rate: FRAME_RATE,
            move_delay_frames: options
                .move_delay_frames_override
                .unwrap_or(MOVE_DELAY_FRAMES)
                .max(1),
            frightened_ticks: options
                .frightened_ticks_override
                .unwrap_or(FRIGHTENED_TICKS),
            pursuer_base_score: PURSUER_BASE_SCORE,
            start_lives: options.start_lives_override.unwrap_or(START_LIVES).max(1),
        };

        let pursuers = Archetype::ALL
            .into_iter()
            .zip(level.pursuer_spawns)
            .map(|(archetype, spawn)| Pursuer::new(archetype, spawn))
            .collect();

        Self {
            clock: ModeClock::new(config.frightened_ticks),
            lives: config.start_lives,
            pickups_left: level.maze.pickups_remaining(),
            config,
            maze: level.maze,
            rng: Rng::new(seed),
            player: PlayerInternal::new(level.player_spawn),
            pursuers,
            events: Vec::new(),
            stats: RoundStats::default(),
            score: 0,
            frame_counter: 0,
            frames_since_move: 0,
            tick_counter: 0,
            ended: false,
            end_reason: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> PlayerView {
        self.player.view()
    }

    pub fn pursuers(&self) -> Vec<PursuerView> {
        self.pursuers.iter().map(Pursuer::view).collect()
    }

    pub fn get_world_init(&self) -> WorldInit {
        WorldInit {
            width: self.maze.width(),
            height: self.maze.height(),
            tiles: self.maze.to_rows(),
            player_spawn: self.player.spawn,
            pursuer_spawns: self.pursuers.iter().map(|p| p.spawn).collect(),
        }
    }

    /// Buffers the player's next turn; it is taken as soon as the way is open.
    pub fn set_player_direction(&mut self, dir: Direction) {
        self.player.desired_dir = dir;
    }

    /// Advances one display frame. Returns true when a movement tick ran.
    pub fn step_frame(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.frame_counter += 1;
        self.frames_since_move += 1;
        if self.frames_since_move < self.config.move_delay_frames {
            return false;
        }
        self.frames_since_move = 0;
        self.tick();
        true
    }

    /// One movement tick: mode clock, player, pursuers, collisions.
    pub fn tick(&mut self) {
        if self.ended {
            return;
        }
        self.tick_counter += 1;

        self.advance_mode_clock();
        self.move_player();
        self.collect_pickup();
        self.move_pursuers();
        if self.resolve_pursuer_collisions() == CollisionOutcome::LifeLost {
            self.lose_life();
        }
        if !self.ended && self.pickups_left == 0 {
            self.finish(GameOverReason::Victory);
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            frame: self.frame_counter,
            score: self.score,
            lives: self.lives,
            dots_remaining: self.pickups_left,
            frightened_remaining: self.clock.remaining(),
            combo: self.clock.combo(),
            player: self.player.view(),
            pursuers: self.pursuers(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
            ended: self.ended,
        }
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            reason: self.end_reason,
            ticks: self.tick_counter,
            score: self.score,
            lives_left: self.lives,
            dots_eaten: self.stats.dots_eaten,
            pellets_eaten: self.stats.pellets_eaten,
            pursuers_eaten: self.stats.pursuers_eaten,
            lives_lost: self.stats.lives_lost,
            best_combo: self.stats.best_combo,
        }
    }

    /// Targets are computed against the Chaser's position from before any
    /// pursuer moved this tick.
    fn move_pursuers(&mut self) {
        let inputs = TargetInputs {
            player: self.player.cell,
            facing: self.player.facing,
            chaser: self
                .pursuers
                .iter()
                .find(|p| p.archetype == Archetype::Chaser)
                .map(|p| p.cell),
        };

        for idx in 0..self.pursuers.len() {
            let pursuer = self.pursuers[idx];
            let target = compute_target(
                pursuer.archetype,
                pursuer.mode,
                pursuer.cell,
                &inputs,
                &self.maze,
                &mut self.rng,
            );
            let step = resolve_step(&self.maze, pursuer.cell, pursuer.dir, target, pursuer.mode);

            let pursuer = &mut self.pursuers[idx];
            pursuer.target = Some(target);
            if let Some(step) = step {
                pursuer.cell = step.cell;
                pursuer.dir = step.dir;
            }
        }
    }

    fn finish(&mut self, reason: GameOverReason) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.end_reason = Some(reason);
        self.events.push(RuntimeEvent::GameOver { reason });
    }
}
