use crate::config::*;
use crate::selection::Selected;
use bevy::prelude::*;

/// Component that marks an outline entity linked to a selected bird
#[derive(Component)]
pub struct SelectionOutline {
    pub parent: Entity,
}

/// System to add/remove outlines for selected birds
pub fn manage_selection_outlines(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    added_selection: Query<(Entity, &Transform), Added<Selected>>,
    mut removed_selection: RemovedComponents<Selected>,
    outlines: Query<(Entity, &SelectionOutline)>,
) {
    // Add outlines to newly selected birds
    for (entity, transform) in added_selection.iter() {
        // A ring slightly larger than the bird sprite
        commands.spawn((
            SelectionOutline { parent: entity },
            Mesh2d(meshes.add(Circle::new(BIRD_WIDTH as f32 * 0.65))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(
                Color::srgba(1.0, 1.0, 0.0, 0.6),
            ))),
            Transform::from_xyz(transform.translation.x, transform.translation.y, Z_OUTLINE),
        ));
    }

    // Remove outlines when the bird is deselected or despawned
    for removed_entity in removed_selection.read() {
        for (outline_entity, outline) in outlines.iter() {
            if outline.parent == removed_entity {
                commands.entity(outline_entity).despawn();
            }
        }
    }
}

/// System to keep outlines glued to their birds
pub fn update_outline_positions(
    selected_entities: Query<(Entity, &Transform), With<Selected>>,
    mut outlines: Query<(&SelectionOutline, &mut Transform), Without<Selected>>,
) {
    for (outline, mut outline_transform) in outlines.iter_mut() {
        if let Ok((_, parent_transform)) = selected_entities.get(outline.parent) {
            outline_transform.translation.x = parent_transform.translation.x;
            outline_transform.translation.y = parent_transform.translation.y;
        }
    }
}
