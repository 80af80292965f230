use crate::config::*;
use bevy::prelude::*;

#[derive(Component)]
pub struct MainCamera;

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        MainCamera,
        Transform::from_xyz(0.0, 0.0, 0.0),
        OrthographicProjection {
            scale: 1.0,
            ..OrthographicProjection::default_2d()
        },
    ));
}

/// Map top-left screen coordinates (y growing downward, origin at the
/// window's top-left corner) to world coordinates under the fixed camera.
pub fn screen_to_world(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x - WINDOW_WIDTH * 0.5, WINDOW_HEIGHT * 0.5 - y, z)
}
