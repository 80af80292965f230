use crate::camera::screen_to_world;
use crate::config::*;
use crate::{GameAssets, PlayPhase, Scoreboard};
use bevy::prelude::*;

/// Bird component: vertical state, tilt and wing animation.
///
/// `y` is the top-left corner of the sprite in screen coordinates
/// (y grows downward); the horizontal position is always [`BIRD_X`].
#[derive(Component, Clone, Debug)]
pub struct Bird {
    pub y: f32,
    pub velocity: f32,
    /// Ticks since the last jump; drives the parabolic displacement.
    pub ticks: u32,
    /// Height at the last jump, the reference for tilt decay.
    pub jump_anchor: f32,
    /// Visual tilt in degrees, positive is nose-up.
    pub tilt: f32,
    wing_ticks: u32,
}

impl Bird {
    pub fn new(y: f32) -> Self {
        Self {
            y,
            velocity: 0.0,
            ticks: 0,
            jump_anchor: y,
            tilt: 0.0,
            wing_ticks: 0,
        }
    }

    pub fn jump(&mut self) {
        self.velocity = JUMP_VELOCITY;
        self.ticks = 0;
        self.jump_anchor = self.y;
    }

    /// One physics tick: parabolic displacement from the velocity set at the
    /// last jump, clamped to the terminal fall speed, boosted while rising,
    /// then the tilt update.
    pub fn advance(&mut self) {
        self.ticks += 1;
        let t = self.ticks as f32;

        let mut displacement = self.velocity * t + GRAVITY * t * t;
        if displacement >= MAX_FALL_DISPLACEMENT {
            displacement = MAX_FALL_DISPLACEMENT;
        }
        if displacement < 0.0 {
            displacement -= RISE_BOOST;
        }
        self.y += displacement;

        if displacement < 0.0 || self.y < self.jump_anchor + TILT_ANCHOR_SLACK {
            if self.tilt < MAX_ROTATION {
                self.tilt = MAX_ROTATION;
            }
        } else if self.tilt > MIN_ROTATION {
            self.tilt = (self.tilt - ROTATION_VELOCITY).max(MIN_ROTATION);
        }
    }

    /// Advance the wing counter; held mid-flap while nose-diving.
    pub fn advance_animation(&mut self) {
        if self.tilt <= NOSE_DIVE_TILT {
            self.wing_ticks = ANIMATION_TIME * 2;
            return;
        }
        self.wing_ticks = (self.wing_ticks + 1) % (ANIMATION_TIME * 4);
    }

    /// Index into the three wing sprites, cycling 0, 1, 2, 1.
    pub fn animation_frame(&self) -> usize {
        if self.tilt <= NOSE_DIVE_TILT {
            return 1;
        }
        match self.wing_ticks / ANIMATION_TIME {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 1,
        }
    }
}

/// Marker for the bird steered by the keyboard in manual mode
#[derive(Component)]
pub struct PlayerControlled;

/// Sprite and transform shared by every bird spawn.
pub fn bird_visuals(assets: &GameAssets) -> (Sprite, Transform) {
    (
        Sprite::from_image(assets.bird_frames[0].clone()),
        Transform::from_translation(bird_translation(BIRD_START_Y)),
    )
}

pub fn spawn_player_bird(commands: &mut Commands, assets: &GameAssets) {
    commands.spawn((Bird::new(BIRD_START_Y), PlayerControlled, bird_visuals(assets)));
}

fn bird_translation(y: f32) -> Vec3 {
    // The sprite rotates about its center, so the transform carries the
    // center while the component tracks the top-left corner.
    screen_to_world(
        BIRD_X + BIRD_WIDTH as f32 * 0.5,
        y + BIRD_HEIGHT as f32 * 0.5,
        Z_BIRD,
    )
}

/// System: one physics tick for every bird.
pub fn bird_physics(mut birds: Query<&mut Bird>) {
    for mut bird in birds.iter_mut() {
        bird.advance();
    }
}

/// System: advance wing animation and swap the sprite frame.
pub fn animate_birds(assets: Res<GameAssets>, mut birds: Query<(&mut Bird, &mut Sprite)>) {
    for (mut bird, mut sprite) in birds.iter_mut() {
        bird.advance_animation();
        sprite.image = assets.bird_frames[bird.animation_frame()].clone();
    }
}

/// System: mirror screen-space bird state into render transforms.
pub fn sync_bird_transforms(mut birds: Query<(&Bird, &mut Transform)>) {
    for (bird, mut transform) in birds.iter_mut() {
        transform.translation = bird_translation(bird.y);
        transform.rotation = Quat::from_rotation_z(bird.tilt.to_radians());
    }
}

/// System: manual-mode flap handling. Space starts the run, flaps mid-air
/// and restarts after a death.
pub fn flap_input(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    assets: Res<GameAssets>,
    mut phase: ResMut<PlayPhase>,
    mut scoreboard: ResMut<Scoreboard>,
    mut birds: Query<&mut Bird, With<PlayerControlled>>,
    pipes: Query<Entity, With<crate::pipe::Pipe>>,
) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }

    match *phase {
        PlayPhase::Ready => {
            if let Ok(mut bird) = birds.get_single_mut() {
                bird.jump();
            }
            *phase = PlayPhase::Playing;
        }
        PlayPhase::Playing => {
            if let Ok(mut bird) = birds.get_single_mut() {
                bird.jump();
            }
        }
        PlayPhase::Dead => {
            for entity in pipes.iter() {
                commands.entity(entity).despawn_recursive();
            }
            if let Ok(mut bird) = birds.get_single_mut() {
                *bird = Bird::new(BIRD_START_Y);
            }
            crate::pipe::spawn_pipe(&mut commands, &assets, PIPE_SPAWN_X);
            scoreboard.score = 0;
            *phase = PlayPhase::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_resets_counters() {
        let mut bird = Bird::new(350.0);
        for _ in 0..20 {
            bird.advance();
        }
        assert!(bird.ticks > 0);

        bird.jump();
        assert_eq!(bird.ticks, 0);
        assert_eq!(bird.velocity, JUMP_VELOCITY);
        assert_eq!(bird.jump_anchor, bird.y);
    }

    #[test]
    fn fall_reaches_terminal_displacement() {
        let mut bird = Bird::new(100.0);
        let mut last_y = bird.y;
        for _ in 0..50 {
            bird.advance();
            let displacement = bird.y - last_y;
            assert!(displacement <= MAX_FALL_DISPLACEMENT + f32::EPSILON);
            last_y = bird.y;
        }
        // With no jumps the bird ends up in free fall at the clamp.
        bird.advance();
        assert_eq!(bird.y - last_y, MAX_FALL_DISPLACEMENT);
    }

    #[test]
    fn jump_moves_bird_upward() {
        let mut bird = Bird::new(350.0);
        bird.jump();
        let before = bird.y;
        bird.advance();
        assert!(bird.y < before, "first tick after a jump must rise");
    }

    #[test]
    fn tilt_stays_within_bounds() {
        let mut bird = Bird::new(350.0);
        for tick in 0..300 {
            if tick % 37 == 0 {
                bird.jump();
            }
            bird.advance();
            assert!(bird.tilt >= MIN_ROTATION && bird.tilt <= MAX_ROTATION);
        }
    }

    #[test]
    fn tilt_snaps_up_on_jump_and_decays_in_fall() {
        let mut bird = Bird::new(350.0);
        bird.jump();
        bird.advance();
        assert_eq!(bird.tilt, MAX_ROTATION);

        // Long free fall ends nose-down at the floor.
        for _ in 0..100 {
            bird.advance();
        }
        assert_eq!(bird.tilt, MIN_ROTATION);
    }

    #[test]
    fn wing_animation_cycles_through_frames() {
        let mut bird = Bird::new(350.0);
        let mut seen = Vec::new();
        for _ in 0..ANIMATION_TIME * 4 {
            seen.push(bird.animation_frame());
            bird.advance_animation();
        }
        assert!(seen.contains(&0));
        assert!(seen.contains(&1));
        assert!(seen.contains(&2));
    }

    #[test]
    fn nose_dive_freezes_wings() {
        let mut bird = Bird::new(350.0);
        bird.tilt = MIN_ROTATION;
        for _ in 0..25 {
            bird.advance_animation();
            assert_eq!(bird.animation_frame(), 1);
        }
    }
}
