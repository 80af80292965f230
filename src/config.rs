/// Configuration constants for the flappy evolution game
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;

// ============================================================================
// WINDOW & WORLD
// ============================================================================

/// Window width in pixels
pub const WINDOW_WIDTH: f32 = 500.0;

/// Window height in pixels
pub const WINDOW_HEIGHT: f32 = 800.0;

/// Screen y of the ground line; birds touching it are dead
pub const BASE_Y: f32 = 730.0;

/// Render layers, back to front
pub const Z_BACKGROUND: f32 = 0.0;
pub const Z_OUTLINE: f32 = 0.5;
pub const Z_BIRD: f32 = 1.0;
pub const Z_PIPE: f32 = 2.0;
pub const Z_BASE: f32 = 3.0;

// ============================================================================
// BIRD PHYSICS
// ============================================================================

/// Fixed horizontal position of every bird
pub const BIRD_X: f32 = 230.0;

/// Vertical spawn position
pub const BIRD_START_Y: f32 = 350.0;

/// Bird sprite dimensions in pixels
pub const BIRD_WIDTH: u32 = 68;
pub const BIRD_HEIGHT: u32 = 48;

/// Vertical velocity applied by a flap (screen y grows downward)
pub const JUMP_VELOCITY: f32 = -10.5;

/// Quadratic gravity coefficient in the per-tick displacement formula
pub const GRAVITY: f32 = 1.5;

/// Terminal per-tick fall displacement
pub const MAX_FALL_DISPLACEMENT: f32 = 8.0;

/// Extra upward displacement while still moving up
pub const RISE_BOOST: f32 = 1.0;

/// Maximum nose-up tilt in degrees
pub const MAX_ROTATION: f32 = 25.0;

/// Maximum nose-down tilt in degrees
pub const MIN_ROTATION: f32 = -90.0;

/// Tilt decay per tick while descending, in degrees
pub const ROTATION_VELOCITY: f32 = 5.0;

/// The bird keeps its nose up until this far below the last jump height
pub const TILT_ANCHOR_SLACK: f32 = 50.0;

/// Below this tilt the wing animation freezes mid-flap
pub const NOSE_DIVE_TILT: f32 = -80.0;

/// Ticks each wing animation frame is held
pub const ANIMATION_TIME: u32 = 10;

// ============================================================================
// PIPES & GROUND
// ============================================================================

/// Vertical opening between the top and bottom pipe segments
pub const PIPE_GAP: f32 = 200.0;

/// Leftward scroll per tick, shared by pipes and the ground
pub const SCROLL_VELOCITY: f32 = 5.0;

/// Horizontal spawn position of a new pipe, off the right edge
pub const PIPE_SPAWN_X: f32 = 600.0;

/// Uniform range the gap top is drawn from
pub const GAP_TOP_MIN: f32 = 50.0;
pub const GAP_TOP_MAX: f32 = 450.0;

/// Pipe sprite dimensions in pixels
pub const PIPE_WIDTH: u32 = 104;
pub const PIPE_HEIGHT: u32 = 640;

/// Ground strip sprite dimensions; the width must cover the window
pub const BASE_WIDTH: u32 = 600;
pub const BASE_HEIGHT: u32 = 112;

// ============================================================================
// INTERACTION
// ============================================================================

/// Maximum distance for selecting a bird with the mouse
pub const SELECTION_RADIUS: f32 = 40.0;

// ============================================================================
// EVOLUTION
// ============================================================================

/// Path of the neuroevolution configuration file, read at startup
pub const EVOLUTION_CONFIG_PATH: &str = "evolution.json";

/// Tunable parameters of the evolution variant, loaded from
/// [`EVOLUTION_CONFIG_PATH`] with a fallback to these defaults.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Number of genomes per generation.
    pub population_size: usize,
    /// Mutation rate handed to the repopulator.
    pub mutation_rate: f32,
    /// Fitness granted for every frame a bird survives.
    pub frame_fitness: f32,
    /// Fitness granted each time a bird clears a pipe.
    pub pipe_bonus: f32,
    /// Fitness deducted on the terminating collision.
    pub collision_penalty: f32,
    /// Frame budget for a single headless fitness evaluation.
    pub max_eval_frames: u32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            mutation_rate: 0.25,
            frame_fitness: 0.1,
            pipe_bonus: 5.0,
            collision_penalty: 1.0,
            max_eval_frames: 3600,
        }
    }
}

impl EvolutionConfig {
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("could not read {path}: {err}; using built-in evolution defaults");
                Self::default()
            }
        }
    }

    fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Startup system that reads the evolution configuration from disk.
pub fn load_evolution_config(mut commands: Commands) {
    commands.insert_resource(EvolutionConfig::load_or_default(EVOLUTION_CONFIG_PATH));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = EvolutionConfig::load_or_default("does-not-exist.json");
        assert_eq!(config.population_size, EvolutionConfig::default().population_size);
    }

    #[test]
    fn config_parses_from_json() {
        let text = r#"{
            "population_size": 12,
            "mutation_rate": 0.5,
            "frame_fitness": 0.2,
            "pipe_bonus": 10.0,
            "collision_penalty": 2.0,
            "max_eval_frames": 600
        }"#;
        let config: EvolutionConfig = serde_json::from_str(text).unwrap();
        assert_eq!(config.population_size, 12);
        assert_eq!(config.max_eval_frames, 600);
        assert_eq!(config.pipe_bonus, 10.0);
    }

    #[test]
    fn defaults_round_trip_through_json() {
        let config = EvolutionConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.population_size, config.population_size);
        assert_eq!(parsed.mutation_rate, config.mutation_rate);
    }
}
