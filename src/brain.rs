use crate::bird::{bird_visuals, Bird};
use crate::collision::{bird_collided, SpriteMasks};
use crate::config::*;
use crate::pipe::{spawn_pipe, Pipe};
use crate::{GameAssets, Scoreboard};
use bevy::prelude::*;
use neat::*;

/// Evolved controller genome. The network itself (topology, weights,
/// mutation, crossover) belongs to the external NEAT crate; this module
/// only feeds it inputs and thresholds the output.
///
/// Inputs: bird y, vertical distance to the gap top, vertical distance to
/// the gap bottom. Output: flap when above 0.5.
#[derive(Clone, Debug, PartialEq, GenerateRandom, RandomlyMutable, Crossover)]
#[randmut(create_context = BirdGenomeCtx)]
#[crossover(with_context = BirdGenomeCtx)]
pub struct BirdGenome {
    brain: NeuralNetwork<3, 1>,
}

impl BirdGenome {
    pub fn decide(&self, bird_y: f32, gap_top: f32, gap_bottom: f32) -> bool {
        let inputs = [
            bird_y,
            (bird_y - gap_top).abs(),
            (bird_y - gap_bottom).abs(),
        ];
        let outputs = self.brain.predict(inputs);
        outputs[0] > 0.5
    }
}

/// Ties a visible bird to its genome in [`Population`] and accrues the
/// display fitness of the showcased run.
#[derive(Component, Clone, Debug)]
pub struct BirdController {
    pub index: usize,
    pub fitness: f32,
}

/// The current population and generation bookkeeping. The genetic
/// simulation itself is rebuilt around these genomes once per generation;
/// the external crate owns elimination, crossover and mutation.
#[derive(Default)]
pub struct Population {
    pub genomes: Vec<BirdGenome>,
    pub generation: u32,
    pub sample_fitness: f32,
}

/// The gap the birds are steering for: the nearest pipe whose right edge
/// has not yet scrolled past them.
pub fn next_gap<'a>(pipes: impl Iterator<Item = &'a Pipe>) -> Option<(f32, f32)> {
    let mut target: Option<&Pipe> = None;
    for pipe in pipes {
        if pipe.x + (PIPE_WIDTH as f32) < BIRD_X {
            continue;
        }
        match target {
            Some(current) if current.x <= pipe.x => {}
            _ => target = Some(pipe),
        }
    }
    target.map(|pipe| (pipe.gap_y, pipe.bottom_y()))
}

/// Fitness of one genome: a full headless flight through the same physics,
/// pipe and mask code the windowed game runs. Rewarded per surviving
/// frame and per pipe cleared, penalized on the terminating collision.
pub fn evaluate_genome(genome: &BirdGenome, masks: &SpriteMasks, config: &EvolutionConfig) -> f32 {
    let mut rng = rand::rng();
    let mut bird = Bird::new(BIRD_START_Y);
    let mut pipes = vec![Pipe::new(PIPE_SPAWN_X, &mut rng)];
    let mut fitness = 0.0;

    for _ in 0..config.max_eval_frames {
        if let Some((gap_top, gap_bottom)) = next_gap(pipes.iter()) {
            if genome.decide(bird.y, gap_top, gap_bottom) {
                bird.jump();
            }
        }

        bird.advance();
        bird.advance_animation();

        let mut passed_any = false;
        for pipe in pipes.iter_mut() {
            pipe.advance();
            if !pipe.passed && pipe.x < BIRD_X {
                pipe.passed = true;
                passed_any = true;
            }
        }
        if passed_any {
            fitness += config.pipe_bonus;
            pipes.push(Pipe::new(PIPE_SPAWN_X, &mut rng));
        }
        pipes.retain(|pipe| !pipe.off_screen());

        if bird_collided(&bird, pipes.iter(), masks) {
            fitness -= config.collision_penalty;
            break;
        }
        fitness += config.frame_fitness;
    }

    fitness
}

/// System: the generation lifecycle. When the last visible bird has died,
/// hand the population to the external genetic simulation for one
/// elimination/repopulation step, then spawn the new generation.
pub fn run_generations(
    mut commands: Commands,
    mut population: NonSendMut<Population>,
    config: Res<EvolutionConfig>,
    masks: Res<SpriteMasks>,
    assets: Res<GameAssets>,
    mut scoreboard: ResMut<Scoreboard>,
    birds: Query<(), With<Bird>>,
    pipes: Query<Entity, With<Pipe>>,
) {
    if !birds.is_empty() {
        return;
    }

    if population.genomes.is_empty() {
        let mut rng = rand::rng();
        population.genomes = Vec::gen_random(&mut rng, config.population_size);
        info!(
            "seeded generation 0 with {} random genomes",
            population.genomes.len()
        );
    } else {
        let mut sim = GeneticSim::new(
            population.genomes.clone(),
            FitnessEliminator::new_with_default(|genome: &BirdGenome| {
                evaluate_genome(genome, &masks, &config)
            }),
            CrossoverRepopulator::new(config.mutation_rate, BirdGenomeCtx::default()),
        );
        sim.next_generation();
        population.genomes = sim.genomes.clone();
        population.generation += 1;

        let sample = evaluate_genome(&population.genomes[0], &masks, &config);
        population.sample_fitness = sample;
        info!(
            "generation {}: {} genomes, sample fitness {:.1}",
            population.generation,
            population.genomes.len(),
            sample
        );
    }

    for entity in pipes.iter() {
        commands.entity(entity).despawn_recursive();
    }
    scoreboard.score = 0;
    spawn_pipe(&mut commands, &assets, PIPE_SPAWN_X);

    for index in 0..population.genomes.len() {
        commands.spawn((
            Bird::new(BIRD_START_Y),
            BirdController {
                index,
                fitness: 0.0,
            },
            bird_visuals(&assets),
        ));
    }
}

/// System: per-frame network decisions for the visible population.
pub fn think_and_flap(
    population: NonSend<Population>,
    config: Res<EvolutionConfig>,
    pipes: Query<&Pipe>,
    mut birds: Query<(&mut Bird, &mut BirdController)>,
) {
    let target = next_gap(pipes.iter());
    for (mut bird, mut controller) in birds.iter_mut() {
        controller.fitness += config.frame_fitness;
        let Some((gap_top, gap_bottom)) = target else {
            continue;
        };
        let Some(genome) = population.genomes.get(controller.index) else {
            continue;
        };
        if genome.decide(bird.y, gap_top, gap_bottom) {
            bird.jump();
        }
    }
}
