use crate::bird::Bird;
use crate::config::*;
use crate::mask::PixelMask;
use crate::pipe::Pipe;
use crate::{GameAssets, GameMode, PlayPhase, Scoreboard};
use bevy::prelude::*;

/// Collision masks derived from the sprite alpha channels, built once after
/// the images finish loading.
#[derive(Resource)]
pub struct SpriteMasks {
    pub bird: [PixelMask; 3],
    pub pipe_top: PixelMask,
    pub pipe_bottom: PixelMask,
}

/// System: build [`SpriteMasks`] as soon as every sprite is decoded. Gated
/// in the schedule so it stops running once the resource exists.
pub fn build_sprite_masks(
    mut commands: Commands,
    assets: Res<GameAssets>,
    images: Res<Assets<Image>>,
) {
    let Some(pipe) = images.get(&assets.pipe) else {
        return;
    };
    let mut bird_masks = Vec::with_capacity(3);
    for handle in &assets.bird_frames {
        let Some(image) = images.get(handle) else {
            return;
        };
        bird_masks.push(mask_from_image(image));
    }

    let pipe_bottom = mask_from_image(pipe);
    let pipe_top = pipe_bottom.flip_vertical();
    let bird: [PixelMask; 3] = match bird_masks.try_into() {
        Ok(masks) => masks,
        Err(_) => return,
    };

    commands.insert_resource(SpriteMasks {
        bird,
        pipe_top,
        pipe_bottom,
    });
    info!("collision masks built from sprite alpha channels");
}

fn mask_from_image(image: &Image) -> PixelMask {
    PixelMask::from_alpha(image.width(), image.height(), &image.data)
}

/// A bird that left the vertical play area is dead regardless of pipes.
pub fn out_of_bounds(bird: &Bird) -> bool {
    bird.y + BIRD_HEIGHT as f32 >= BASE_Y || bird.y < 0.0
}

/// Pixel-accurate test of one bird against one pipe column: the bird's
/// current wing frame mask against each segment mask, offset by the
/// difference of their top-left corners.
pub fn pipe_hit(bird: &Bird, pipe: &Pipe, masks: &SpriteMasks) -> bool {
    let bird_mask = &masks.bird[bird.animation_frame()];
    let dx = pipe.x.round() as i32 - BIRD_X.round() as i32;
    let by = bird.y.round() as i32;

    let top_offset = (dx, pipe.top_y().round() as i32 - by);
    let bottom_offset = (dx, pipe.bottom_y().round() as i32 - by);

    bird_mask.overlap(&masks.pipe_top, top_offset).is_some()
        || bird_mask.overlap(&masks.pipe_bottom, bottom_offset).is_some()
}

/// Full per-bird collision verdict against the world.
pub fn bird_collided<'a>(
    bird: &Bird,
    mut pipes: impl Iterator<Item = &'a Pipe>,
    masks: &SpriteMasks,
) -> bool {
    out_of_bounds(bird) || pipes.any(|pipe| pipe_hit(bird, pipe, masks))
}

/// System: resolve collisions. In manual mode a hit ends the run; in
/// evolution mode the bird is removed and the rest of the population
/// flies on.
pub fn check_collisions(
    mut commands: Commands,
    mode: Res<GameMode>,
    masks: Res<SpriteMasks>,
    mut phase: ResMut<PlayPhase>,
    mut scoreboard: ResMut<Scoreboard>,
    birds: Query<(Entity, &Bird)>,
    pipes: Query<&Pipe>,
) {
    for (entity, bird) in birds.iter() {
        if !bird_collided(bird, pipes.iter(), &masks) {
            continue;
        }
        match *mode {
            GameMode::Manual => {
                scoreboard.best = scoreboard.best.max(scoreboard.score);
                *phase = PlayPhase::Dead;
            }
            GameMode::Evolution => {
                commands.entity(entity).despawn();
            }
        }
    }
}
