mod base;
mod bird;
mod brain;
mod camera;
mod collision;
mod config;
mod mask;
mod outline;
mod pipe;
mod selection;

use base::{scroll_base, spawn_base, sync_base_strips};
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use bird::{
    animate_birds, bird_physics, flap_input, spawn_player_bird, sync_bird_transforms, Bird,
};
use brain::{run_generations, think_and_flap, BirdController, Population};
use camera::{screen_to_world, setup_camera};
use collision::{build_sprite_masks, check_collisions, SpriteMasks};
use config::*;
use outline::{manage_selection_outlines, update_outline_positions};
use pipe::{move_pipes, recycle_pipes, spawn_pipe, sync_pipe_transforms, Pipe};
use selection::{handle_selection, Selected, SelectedEntity};

/// Resource to control simulation state
#[derive(Resource, PartialEq, Eq, Clone, Copy)]
pub enum SimulationState {
    Running,
    Paused,
}

impl Default for SimulationState {
    fn default() -> Self {
        SimulationState::Running
    }
}

/// Which game variant is on screen
#[derive(Resource, Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameMode {
    Manual,
    Evolution,
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::Manual
    }
}

/// Manual-mode run phase
#[derive(Resource, PartialEq, Eq, Clone, Copy)]
pub enum PlayPhase {
    Ready,
    Playing,
    Dead,
}

impl Default for PlayPhase {
    fn default() -> Self {
        PlayPhase::Ready
    }
}

/// Pipes passed in the current run and the best run so far
#[derive(Resource, Default)]
pub struct Scoreboard {
    pub score: u32,
    pub best: u32,
}

/// Handles to every sprite the game draws
#[derive(Resource)]
pub struct GameAssets {
    pub bird_frames: [Handle<Image>; 3],
    pub pipe: Handle<Image>,
    pub base: Handle<Image>,
    pub background: Handle<Image>,
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Flappy Evolution".to_string(),
                resolution: (WINDOW_WIDTH, WINDOW_HEIGHT).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .init_resource::<SimulationState>()
        .init_resource::<GameMode>()
        .init_resource::<PlayPhase>()
        .init_resource::<Scoreboard>()
        .init_resource::<SelectedEntity>()
        .init_non_send_resource::<Population>()
        .add_systems(
            Startup,
            (
                setup_camera,
                config::load_evolution_config,
                (load_assets, spawn_playfield).chain(),
            ),
        )
        .add_systems(
            Update,
            (
                // Always run (even when paused)
                handle_selection,
                manage_selection_outlines,
                update_outline_positions,
                sync_bird_transforms,
                sync_pipe_transforms,
                sync_base_strips,
                exit_on_escape,
                ui_system,
            ),
        )
        .add_systems(
            Update,
            build_sprite_masks.run_if(not(resource_exists::<SpriteMasks>)),
        )
        .add_systems(Update, flap_input.run_if(manual_controls_active))
        .add_systems(
            Update,
            (
                // Only run while the playfield is live
                bird_physics,
                animate_birds,
                move_pipes,
                recycle_pipes,
                scroll_base,
            )
                .run_if(physics_active),
        )
        .add_systems(
            Update,
            check_collisions
                .run_if(physics_active)
                .run_if(resource_exists::<SpriteMasks>),
        )
        .add_systems(
            Update,
            (run_generations, think_and_flap)
                .run_if(evolution_active)
                .run_if(resource_exists::<SpriteMasks>),
        )
        .run();
}

fn load_assets(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(GameAssets {
        bird_frames: [
            asset_server.load("sprites/bird1.png"),
            asset_server.load("sprites/bird2.png"),
            asset_server.load("sprites/bird3.png"),
        ],
        pipe: asset_server.load("sprites/pipe.png"),
        base: asset_server.load("sprites/base.png"),
        background: asset_server.load("sprites/bg.png"),
    });
}

fn spawn_playfield(mut commands: Commands, assets: Res<GameAssets>) {
    commands.spawn((
        Sprite {
            image: assets.background.clone(),
            anchor: Anchor::TopLeft,
            ..default()
        },
        Transform::from_translation(screen_to_world(0.0, 0.0, Z_BACKGROUND)),
    ));
    spawn_base(&mut commands, &assets);
    spawn_player_bird(&mut commands, &assets);
    spawn_pipe(&mut commands, &assets, PIPE_SPAWN_X);
}

fn physics_active(
    mode: Res<GameMode>,
    phase: Res<PlayPhase>,
    state: Res<SimulationState>,
) -> bool {
    if *state != SimulationState::Running {
        return false;
    }
    match *mode {
        GameMode::Manual => *phase == PlayPhase::Playing,
        GameMode::Evolution => true,
    }
}

fn manual_controls_active(mode: Res<GameMode>, state: Res<SimulationState>) -> bool {
    *mode == GameMode::Manual && *state == SimulationState::Running
}

fn evolution_active(mode: Res<GameMode>, state: Res<SimulationState>) -> bool {
    *mode == GameMode::Evolution && *state == SimulationState::Running
}

fn exit_on_escape(keys: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
    }
}

fn ui_system(
    mut commands: Commands,
    mut contexts: EguiContexts,
    mut game_mode: ResMut<GameMode>,
    mut simulation_state: ResMut<SimulationState>,
    mut phase: ResMut<PlayPhase>,
    mut scoreboard: ResMut<Scoreboard>,
    selected_entity: Res<SelectedEntity>,
    evolution_config: Res<EvolutionConfig>,
    population: NonSend<Population>,
    assets: Res<GameAssets>,
    birds: Query<&Bird>,
    bird_entities: Query<Entity, With<Bird>>,
    pipe_entities: Query<Entity, With<Pipe>>,
    selected_birds: Query<(&Bird, Option<&BirdController>), With<Selected>>,
) {
    let mut requested_mode: Option<GameMode> = None;

    egui::Window::new("Flappy Evolution")
        .default_pos(egui::pos2(10.0, 10.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(*game_mode == GameMode::Manual, "Manual")
                    .clicked()
                {
                    requested_mode = Some(GameMode::Manual);
                }
                if ui
                    .selectable_label(*game_mode == GameMode::Evolution, "Evolution")
                    .clicked()
                {
                    requested_mode = Some(GameMode::Evolution);
                }
            });

            ui.horizontal(|ui| {
                let button_text = if *simulation_state == SimulationState::Running {
                    "⏸ Pause"
                } else {
                    "▶ Resume"
                };

                if ui.button(button_text).clicked() {
                    *simulation_state = if *simulation_state == SimulationState::Running {
                        SimulationState::Paused
                    } else {
                        SimulationState::Running
                    };
                }

                let state_text = if *simulation_state == SimulationState::Running {
                    "Running"
                } else {
                    "Paused"
                };
                ui.label(format!("State: {}", state_text));
            });

            ui.separator();
            ui.heading("Score");
            ui.separator();

            ui.label(format!("Score: {}", scoreboard.score));
            ui.label(format!("Best: {}", scoreboard.best));

            if *game_mode == GameMode::Manual {
                let phase_text = match *phase {
                    PlayPhase::Ready => "Press Space to start",
                    PlayPhase::Playing => "Flapping",
                    PlayPhase::Dead => "Dead - Space restarts",
                };
                ui.label(format!("Phase: {}", phase_text));
            }

            if *game_mode == GameMode::Evolution {
                ui.separator();
                ui.heading("Evolution");
                ui.separator();

                ui.label(format!("Generation: {}", population.generation));
                ui.label(format!(
                    "Population: {}",
                    evolution_config.population_size
                ));
                ui.label(format!("Alive: {}", birds.iter().count()));
                ui.label(format!(
                    "Sample fitness: {:.1}",
                    population.sample_fitness
                ));
            }

            ui.separator();
            ui.label("Controls:");
            ui.label("• Space - Flap / restart (manual mode)");
            ui.label("• Left Click - Select a bird");
            ui.label("• Escape - Quit");
        });

    // Show the inspector for the selected bird
    if selected_entity.entity.is_some() {
        egui::Window::new("Selected Bird")
            .default_pos(egui::pos2(10.0, 420.0))
            .show(contexts.ctx_mut(), |ui| {
                if let Ok((bird, controller)) = selected_birds.get_single() {
                    ui.heading("Bird");
                    ui.separator();

                    ui.label(format!("Height: {:.1}", bird.y));
                    ui.label(format!("Velocity: {:.1}", bird.velocity));
                    ui.label(format!("Tilt: {:.1}°", bird.tilt));
                    ui.label(format!("Ticks since flap: {}", bird.ticks));
                    ui.label(format!("Wing frame: {}", bird.animation_frame()));

                    if let Some(controller) = controller {
                        ui.separator();
                        ui.label(format!("Genome: #{}", controller.index));
                        ui.label(format!("Fitness (showcase): {:.1}", controller.fitness));
                    }
                } else {
                    ui.label("Bird no longer alive");
                }
            });
    }

    if let Some(new_mode) = requested_mode {
        if new_mode != *game_mode {
            for entity in bird_entities.iter() {
                commands.entity(entity).despawn();
            }
            for entity in pipe_entities.iter() {
                commands.entity(entity).despawn_recursive();
            }
            scoreboard.score = 0;
            *phase = PlayPhase::Ready;
            *game_mode = new_mode;

            if new_mode == GameMode::Manual {
                spawn_player_bird(&mut commands, &assets);
                spawn_pipe(&mut commands, &assets, PIPE_SPAWN_X);
            }
            info!("switched to {:?} mode", new_mode);
        }
    }
}
