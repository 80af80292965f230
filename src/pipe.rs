use crate::brain::BirdController;
use crate::camera::screen_to_world;
use crate::config::*;
use crate::{GameAssets, Scoreboard};
use bevy::prelude::*;
use bevy::sprite::Anchor;
use rand::Rng;

/// Pipe component: one obstacle column.
///
/// `gap_y` is the screen y of the top of the opening; the top segment's
/// bottom edge sits exactly there and the bottom segment starts
/// [`PIPE_GAP`] pixels below. Both are fixed once drawn at spawn.
#[derive(Component, Clone, Debug)]
pub struct Pipe {
    pub x: f32,
    pub gap_y: f32,
    pub passed: bool,
}

impl Pipe {
    pub fn new(x: f32, rng: &mut impl Rng) -> Self {
        Self {
            x,
            gap_y: rng.random_range(GAP_TOP_MIN..=GAP_TOP_MAX),
            passed: false,
        }
    }

    /// Screen y of the top segment's top-left corner (above the window).
    pub fn top_y(&self) -> f32 {
        self.gap_y - PIPE_HEIGHT as f32
    }

    /// Screen y of the bottom segment's top-left corner.
    pub fn bottom_y(&self) -> f32 {
        self.gap_y + PIPE_GAP
    }

    pub fn advance(&mut self) {
        self.x -= SCROLL_VELOCITY;
    }

    pub fn off_screen(&self) -> bool {
        self.x + PIPE_WIDTH as f32 < 0.0
    }
}

/// Spawn a pipe with a freshly drawn gap at horizontal position `x`,
/// together with its two sprite segments.
pub fn spawn_pipe(commands: &mut Commands, assets: &GameAssets, x: f32) {
    let mut rng = rand::rng();
    let pipe = Pipe::new(x, &mut rng);
    let top_y = pipe.top_y();
    let bottom_y = pipe.bottom_y();

    commands
        .spawn((
            pipe,
            Transform::from_translation(screen_to_world(x, 0.0, Z_PIPE)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            // Segment offsets are fixed for the pipe's lifetime; only the
            // parent scrolls.
            parent.spawn((pipe_segment(assets, true), Transform::from_xyz(0.0, -top_y, 0.0)));
            parent.spawn((
                pipe_segment(assets, false),
                Transform::from_xyz(0.0, -bottom_y, 0.0),
            ));
        });
}

fn pipe_segment(assets: &GameAssets, flipped: bool) -> Sprite {
    Sprite {
        image: assets.pipe.clone(),
        flip_y: flipped,
        anchor: Anchor::TopLeft,
        ..default()
    }
}

/// System: shift every pipe left by the scroll velocity.
pub fn move_pipes(mut pipes: Query<&mut Pipe>) {
    for mut pipe in pipes.iter_mut() {
        pipe.advance();
    }
}

/// System: mark pipes the birds have passed, score them, append the next
/// pipe and drop columns that left the screen.
pub fn recycle_pipes(
    mut commands: Commands,
    assets: Res<GameAssets>,
    config: Res<EvolutionConfig>,
    mut scoreboard: ResMut<Scoreboard>,
    mut pipes: Query<(Entity, &mut Pipe)>,
    mut controllers: Query<&mut BirdController>,
) {
    let mut passed_any = false;
    for (entity, mut pipe) in pipes.iter_mut() {
        if !pipe.passed && pipe.x < BIRD_X {
            pipe.passed = true;
            passed_any = true;
        }
        if pipe.off_screen() {
            commands.entity(entity).despawn_recursive();
        }
    }

    if passed_any {
        scoreboard.score += 1;
        scoreboard.best = scoreboard.best.max(scoreboard.score);
        for mut controller in controllers.iter_mut() {
            controller.fitness += config.pipe_bonus;
        }
        spawn_pipe(&mut commands, &assets, PIPE_SPAWN_X);
    }
}

/// System: mirror pipe positions into render transforms.
pub fn sync_pipe_transforms(mut pipes: Query<(&Pipe, &mut Transform)>) {
    for (pipe, mut transform) in pipes.iter_mut() {
        transform.translation = screen_to_world(pipe.x, 0.0, Z_PIPE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_height_is_fixed() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let pipe = Pipe::new(PIPE_SPAWN_X, &mut rng);
            assert_eq!(pipe.bottom_y() - pipe.gap_y, PIPE_GAP);
        }
    }

    #[test]
    fn gap_top_drawn_within_range() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let pipe = Pipe::new(PIPE_SPAWN_X, &mut rng);
            assert!(pipe.gap_y >= GAP_TOP_MIN && pipe.gap_y <= GAP_TOP_MAX);
        }
    }

    #[test]
    fn top_segment_ends_at_gap() {
        let mut rng = rand::rng();
        let pipe = Pipe::new(PIPE_SPAWN_X, &mut rng);
        assert_eq!(pipe.top_y() + PIPE_HEIGHT as f32, pipe.gap_y);
    }

    #[test]
    fn pipe_scrolls_left_until_off_screen() {
        let mut rng = rand::rng();
        let mut pipe = Pipe::new(PIPE_SPAWN_X, &mut rng);
        assert!(!pipe.off_screen());

        let mut ticks = 0;
        while !pipe.off_screen() {
            pipe.advance();
            ticks += 1;
            assert!(ticks < 1000, "pipe never left the screen");
        }
        assert!(pipe.x + (PIPE_WIDTH as f32) < 0.0);
    }
}
