//! Yearly migration to neighbouring cells.

use crate::animal::Population;
use crate::grid::Grid;
use biosim_core::{AnimalId, Direction, Location, ParameterStore, Species};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// A decided move, applied after every animal has drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub id: AnimalId,
    pub species: Species,
    pub from: Location,
    pub to: Location,
}

/// Decide where every animal goes this year without moving anyone.
///
/// Each animal that is not a newborn migrates with probability `mu * fitness`
/// and picks one of the four cardinal directions uniformly, travelling its
/// species' stride. Landing on terrain the species cannot enter spends the
/// draw and the animal stays.
pub fn plan_moves(
    grid: &Grid,
    population: &Population,
    params: &ParameterStore,
    rng: &mut ChaCha8Rng,
) -> Vec<Move> {
    let directions = Direction::all();
    let mut moves = Vec::new();

    for cell in grid.cells() {
        for species in Species::all() {
            let species_params = params.species(species);
            let motion = params.motion(species);
            for &id in cell.members(species) {
                let animal = match population.get(id) {
                    Some(animal) if !animal.is_newborn() => animal,
                    _ => continue,
                };

                let p = species_params.mu * animal.fitness(species_params);
                if rng.gen::<f64>() >= p {
                    continue;
                }

                let direction = match directions.choose(rng) {
                    Some(direction) => *direction,
                    None => continue,
                };
                // a blocked, off-island or zero-length step leaves the animal in place
                let Some(target) = cell.location().stride(direction, motion.stride) else {
                    continue;
                };
                let enterable = grid
                    .get(target)
                    .map_or(false, |to| motion.can_enter(to.terrain()));
                if enterable && target != cell.location() {
                    moves.push(Move {
                        id,
                        species,
                        from: cell.location(),
                        to: target,
                    });
                }
            }
        }
    }

    moves
}

/// Move animals between cell memberships and update their locations
pub fn apply_moves(grid: &mut Grid, population: &mut Population, moves: &[Move]) {
    for mv in moves {
        let removed = grid
            .get_mut(mv.from)
            .map_or(false, |cell| cell.remove_member(mv.species, mv.id));
        if !removed {
            continue;
        }
        if let Some(cell) = grid.get_mut(mv.to) {
            cell.add_member(mv.species, mv.id);
        }
        if let Some(animal) = population.get_mut(mv.id) {
            animal.move_to(mv.to);
        }
        trace!(animal = %mv.id, from = %mv.from, to = %mv.to, "Animal migrated");
    }
}

/// Run the migration phase; returns the number of animals that moved
pub fn migrate(
    grid: &mut Grid,
    population: &mut Population,
    params: &ParameterStore,
    rng: &mut ChaCha8Rng,
) -> usize {
    let moves = plan_moves(grid, population, params, rng);
    apply_moves(grid, population, &moves);
    moves.len()
}
