use crate::camera::screen_to_world;
use crate::config::*;
use crate::GameAssets;
use bevy::prelude::*;
use bevy::sprite::Anchor;

/// The looping ground: two copies of the same strip leapfrog each other so
/// the window is always covered.
#[derive(Component, Clone, Debug)]
pub struct Base {
    pub x1: f32,
    pub x2: f32,
}

impl Base {
    pub fn new() -> Self {
        Self {
            x1: 0.0,
            x2: BASE_WIDTH as f32,
        }
    }

    pub fn advance(&mut self) {
        self.x1 -= SCROLL_VELOCITY;
        self.x2 -= SCROLL_VELOCITY;

        let width = BASE_WIDTH as f32;
        if self.x1 + width < 0.0 {
            self.x1 = self.x2 + width;
        }
        if self.x2 + width < 0.0 {
            self.x2 = self.x1 + width;
        }
    }
}

/// Marker for the two ground sprites; the index picks the offset.
#[derive(Component)]
pub struct BaseStrip(pub u8);

pub fn spawn_base(commands: &mut Commands, assets: &GameAssets) {
    let base = Base::new();
    for (index, x) in [base.x1, base.x2].into_iter().enumerate() {
        commands.spawn((
            BaseStrip(index as u8),
            Sprite {
                image: assets.base.clone(),
                anchor: Anchor::TopLeft,
                ..default()
            },
            Transform::from_translation(screen_to_world(x, BASE_Y, Z_BASE)),
        ));
    }
    commands.spawn(base);
}

/// System: scroll the ground with the pipes.
pub fn scroll_base(mut bases: Query<&mut Base>) {
    for mut base in bases.iter_mut() {
        base.advance();
    }
}

/// System: mirror the strip offsets into the two ground sprites.
pub fn sync_base_strips(
    bases: Query<&Base>,
    mut strips: Query<(&BaseStrip, &mut Transform)>,
) {
    let Ok(base) = bases.get_single() else {
        return;
    };
    for (strip, mut transform) in strips.iter_mut() {
        let x = if strip.0 == 0 { base.x1 } else { base.x2 };
        transform.translation = screen_to_world(x, BASE_Y, Z_BASE);
    }
}
