use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Enumeration order used for every tie-break.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Unit step as `(d_row, d_col)`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Chaser,
    Ambusher,
    Flanker,
    Opportunist,
}

impl Archetype {
    /// Processing order inside a tick.
    pub const ALL: [Archetype; 4] = [
        Archetype::Chaser,
        Archetype::Ambusher,
        Archetype::Flanker,
        Archetype::Opportunist,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerMode {
    Chase,
    Frightened,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Victory,
    OutOfLives,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PlayerView {
    pub row: i32,
    pub col: i32,
    pub dir: Direction,
    #[serde(rename = "desiredDir")]
    pub desired_dir: Direction,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PursuerView {
    pub archetype: Archetype,
    pub row: i32,
    pub col: i32,
    pub dir: Direction,
    pub mode: PursuerMode,
    #[serde(rename = "frightenedRemaining")]
    pub frightened_remaining: u32,
    pub target: Option<Cell>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    #[serde(rename = "frameRate")]
    pub frame_rate: u32,
    #[serde(rename = "moveDelayFrames")]
    pub move_delay_frames: u32,
    #[serde(rename = "frightenedTicks")]
    pub frightened_ticks: u32,
    #[serde(rename = "pursuerBaseScore")]
    pub pursuer_base_score: u32,
    #[serde(rename = "startLives")]
    pub start_lives: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldInit {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    #[serde(rename = "playerSpawn")]
    pub player_spawn: Cell,
    #[serde(rename = "pursuerSpawns")]
    pub pursuer_spawns: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    DotEaten {
        row: i32,
        col: i32,
    },
    PowerPelletEaten {
        row: i32,
        col: i32,
    },
    FrightenedStarted {
        ticks: u32,
    },
    FrightenedEnded,
    PursuerEaten {
        archetype: Archetype,
        score: u32,
        combo: u32,
    },
    LifeLost {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    GameOver {
        reason: GameOverReason,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub frame: u64,
    pub score: u32,
    pub lives: u32,
    #[serde(rename = "dotsRemaining")]
    pub dots_remaining: usize,
    #[serde(rename = "frightenedRemaining")]
    pub frightened_remaining: u32,
    pub combo: u32,
    pub player: PlayerView,
    pub pursuers: Vec<PursuerView>,
    pub events: Vec<RuntimeEvent>,
    pub ended: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub reason: Option<GameOverReason>,
    pub ticks: u64,
    pub score: u32,
    #[serde(rename = "livesLeft")]
    pub lives_left: u32,
    #[serde(rename = "dotsEaten")]
    pub dots_eaten: u32,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: u32,
    #[serde(rename = "pursuersEaten")]
    pub pursuers_eaten: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
    #[serde(rename = "bestCombo")]
    pub best_combo: u32,
}
