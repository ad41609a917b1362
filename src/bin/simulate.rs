use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_chase_server::engine::{GameEngine, GameEngineOptions};
use maze_chase_server::maze::{Level, Maze};
use maze_chase_server::rng::Rng;
use maze_chase_server::types::{
    Direction, GameOverReason, GameSummary, PursuerMode, RuntimeEvent, Snapshot,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_TICK_LIMIT: u64 = 20_000;
const AUTOPILOT_SALT: u32 = 0x9e37_79b9;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    /// Movement ticks per run before it is cut off.
    #[arg(long, default_value_t = DEFAULT_TICK_LIMIT)]
    ticks: u64,
    #[arg(long, default_value_t = 1)]
    runs: u32,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: u32,
    seed: u32,
    outcome: String,
    #[serde(flatten)]
    summary: GameSummary,
    #[serde(rename = "pursuerEats")]
    pursuer_eats: Vec<u32>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct RunOutcome {
    result: RunResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageTicks")]
    average_ticks: u64,
    #[serde(rename = "averageScore")]
    average_score: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    runs: Vec<RunResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Seeded stand-in for a human: keeps going straight through corridors and
/// picks a random non-reversing exit at junctions.
struct Autopilot {
    rng: Rng,
}

impl Autopilot {
    fn new(seed: u32) -> Self {
        Self {
            rng: Rng::new(seed ^ AUTOPILOT_SALT),
        }
    }

    fn choose(&mut self, facing: Direction, exits: &[Direction]) -> Direction {
        let forward: Vec<Direction> = exits
            .iter()
            .copied()
            .filter(|dir| *dir != facing.opposite())
            .collect();
        let options: &[Direction] = if forward.is_empty() { exits } else { &forward[..] };
        if options.is_empty() {
            return Direction::None;
        }
        if options.len() == 1 {
            return options[0];
        }
        options[self.rng.pick_index(options.len())]
    }
}

fn main() {
    let cli = Cli::parse();
    let level = match Level::classic() {
        Ok(level) => level,
        Err(error) => {
            emit_log(
                "error",
                "level_invalid",
                "-",
                None,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let started_at = now_rfc3339();
    let base_seed = cli
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_millis() as u32);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(base_seed, Utc::now().timestamp_millis()));

    let mut has_anomaly = false;
    let mut results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for run in 0..cli.runs {
        let seed = base_seed.wrapping_add(run);
        emit_log(
            "info",
            "run_started",
            &match_id,
            Some(run),
            Some(seed),
            None,
            json!({ "tickLimit": cli.ticks }),
        );

        let outcome = run_once(level.clone(), run, seed, cli.ticks);

        for anomaly in &outcome.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(run),
                Some(seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !outcome.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += outcome.anomaly_records.len();
        *outcome_counts
            .entry(outcome.result.outcome.clone())
            .or_insert(0) += 1;

        emit_log(
            "info",
            "run_finished",
            &match_id,
            Some(run),
            Some(seed),
            Some(outcome.result.summary.ticks),
            json!({
                "outcome": outcome.result.outcome,
                "score": outcome.result.summary.score,
                "pursuersEaten": outcome.result.summary.pursuers_eaten,
                "anomalyCount": outcome.anomaly_records.len(),
            }),
        );

        if let Ok(line) = serde_json::to_string(&outcome.result) {
            println!("{line}");
        }
        results.push(outcome.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at,
        now_rfc3339(),
        results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "simulation_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "runCount": summary.run_count,
            "anomalyCount": summary.anomaly_count,
            "averageTicks": summary.average_ticks,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_once(level: Level, run: u32, seed: u32, tick_limit: u64) -> RunOutcome {
    let mut engine = GameEngine::new(level, seed, GameEngineOptions::default());
    let mut autopilot = Autopilot::new(seed);
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut pursuer_eats = Vec::new();
    let mut previous: Option<Snapshot> = None;

    while !engine.is_ended() && engine.tick_count() < tick_limit {
        let player = engine.player();
        let dir = autopilot.choose(player.dir, &engine.player_exits());
        engine.set_player_direction(dir);
        engine.tick();

        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(engine.maze(), previous.as_ref(), &snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        for event in &snapshot.events {
            if let RuntimeEvent::PursuerEaten { score, .. } = event {
                pursuer_eats.push(*score);
            }
        }
        previous = Some(snapshot);
    }

    let summary = engine.build_summary();
    RunOutcome {
        result: RunResultLine {
            run,
            seed,
            outcome: outcome_key(summary.reason),
            summary,
            pursuer_eats,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies(
    maze: &Maze,
    previous: Option<&Snapshot>,
    snapshot: &Snapshot,
) -> Vec<String> {
    let mut anomalies = Vec::new();

    for pursuer in &snapshot.pursuers {
        let name = format!("{:?}", pursuer.archetype);
        if !maze.in_bounds(pursuer.row, pursuer.col) {
            anomalies.push(format!("{name} out of bounds"));
        } else if maze.is_wall(pursuer.row, pursuer.col) {
            anomalies.push(format!("{name} inside a wall"));
        }
        let frightened = pursuer.mode == PursuerMode::Frightened;
        if frightened != (pursuer.frightened_remaining > 0) {
            anomalies.push(format!(
                "{name} mode/timer mismatch: {:?} with {} remaining",
                pursuer.mode, pursuer.frightened_remaining
            ));
        }
        if pursuer.frightened_remaining > snapshot.frightened_remaining {
            anomalies.push(format!("{name} outlives the frightened window"));
        }
        if let Some(target) = pursuer.target {
            if !maze.in_bounds(target.row, target.col) {
                anomalies.push(format!("{name} target out of bounds"));
            }
        }
    }

    if let Some(previous) = previous {
        if snapshot.score < previous.score {
            anomalies.push(format!(
                "score went down: {} -> {}",
                previous.score, snapshot.score
            ));
        }
        if snapshot.lives > previous.lives {
            anomalies.push("lives increased".to_string());
        }
        if snapshot.dots_remaining > previous.dots_remaining {
            anomalies.push("pickups reappeared".to_string());
        }
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn outcome_key(reason: Option<GameOverReason>) -> String {
    match reason {
        Some(GameOverReason::Victory) => "victory",
        Some(GameOverReason::OutOfLives) => "out_of_lives",
        None => "tick_limit",
    }
    .to_string()
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    runs: Vec<RunResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let run_count = runs.len();
    let (average_ticks, average_score) = if run_count == 0 {
        (0, 0)
    } else {
        let ticks: u64 = runs.iter().map(|run| run.summary.ticks).sum();
        let score: u64 = runs.iter().map(|run| u64::from(run.summary.score)).sum();
        (ticks / run_count as u64, score / run_count as u64)
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        run_count,
        anomaly_count,
        average_ticks,
        average_score,
        outcome_counts,
        runs,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    run: Option<u32>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: now_rfc3339(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        run,
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
