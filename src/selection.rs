use crate::bird::Bird;
use crate::config::*;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Marker component for the currently selected bird
#[derive(Component)]
pub struct Selected;

/// Resource to track the currently selected bird
#[derive(Resource, Default)]
pub struct SelectedEntity {
    pub entity: Option<Entity>,
}

/// System to select the bird nearest a left click, for the inspector panel
pub fn handle_selection(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    mut selected_entity: ResMut<SelectedEntity>,
    mut commands: Commands,
    selectable_query: Query<(Entity, &Transform), With<Bird>>,
    currently_selected: Query<Entity, With<Selected>>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }

    let window = windows.single();
    let (camera, camera_transform) = camera_query.single();

    if let Some(cursor_pos) = window.cursor_position() {
        if let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor_pos) {
            // Find the bird closest to the click position
            let mut closest_entity: Option<(Entity, f32)> = None;

            for (entity, transform) in selectable_query.iter() {
                let entity_pos = Vec2::new(transform.translation.x, transform.translation.y);
                let distance = world_pos.distance(entity_pos);

                if distance <= SELECTION_RADIUS {
                    match closest_entity {
                        None => closest_entity = Some((entity, distance)),
                        Some((_, closest_dist)) if distance < closest_dist => {
                            closest_entity = Some((entity, distance));
                        }
                        _ => {}
                    }
                }
            }

            // Clear previous selection
            for entity in currently_selected.iter() {
                commands.entity(entity).remove::<Selected>();
            }

            // Set new selection
            if let Some((entity, _)) = closest_entity {
                commands.entity(entity).insert(Selected);
                selected_entity.entity = Some(entity);
            } else {
                selected_entity.entity = None;
            }
        }
    }
}
