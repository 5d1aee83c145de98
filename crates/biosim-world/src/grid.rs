//! Terrain grid of the island.

use biosim_core::{AnimalId, Error, Location, ParameterStore, Result, Species, Terrain};
use serde::{Deserialize, Serialize};

/// One cell of the island: fixed terrain, current fodder and the animals standing on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    location: Location,
    terrain: Terrain,
    fodder: f64,
    members: [Vec<AnimalId>; Species::COUNT],
}

impl Cell {
    pub fn new(location: Location, terrain: Terrain, fodder: f64) -> Self {
        Self {
            location,
            terrain,
            fodder,
            members: Default::default(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }

    pub fn fodder(&self) -> f64 {
        self.fodder
    }

    /// Reset fodder to the carrying capacity
    pub fn regrow(&mut self, f_max: f64) {
        self.fodder = f_max;
    }

    /// Remove up to `wanted` fodder and return how much was taken
    pub fn consume(&mut self, wanted: f64) -> f64 {
        let eaten = wanted.min(self.fodder).max(0.0);
        self.fodder -= eaten;
        eaten
    }

    /// Ids of the animals of `species` in this cell, in arrival order
    pub fn members(&self, species: Species) -> &[AnimalId] {
        &self.members[species.index()]
    }

    pub fn count(&self, species: Species) -> usize {
        self.members[species.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.iter().all(Vec::is_empty)
    }

    pub fn add_member(&mut self, species: Species, id: AnimalId) {
        self.members[species.index()].push(id);
    }

    /// Remove an animal while keeping the order of the others
    pub fn remove_member(&mut self, species: Species, id: AnimalId) -> bool {
        let members = &mut self.members[species.index()];
        match members.iter().position(|member| *member == id) {
            Some(index) => {
                members.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn retain_members<F>(&mut self, species: Species, keep: F)
    where
        F: FnMut(&AnimalId) -> bool,
    {
        self.members[species.index()].retain(keep);
    }
}

/// Rectangular island surrounded by water
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from terrain-letter rows.
    ///
    /// Rows are checked for equal length first, then every border cell must be
    /// Water, then every letter must be a known terrain. Fodder starts at each
    /// terrain's `f_max`.
    pub fn parse(map: &str, params: &ParameterStore) -> Result<Self> {
        let lines: Vec<&str> = map.lines().map(str::trim).collect();
        let first = lines.iter().position(|line| !line.is_empty());
        let last = lines.iter().rposition(|line| !line.is_empty());
        let lines = match (first, last) {
            (Some(first), Some(last)) => &lines[first..=last],
            _ => return Err(Error::EmptyMap),
        };

        let letters: Vec<Vec<char>> = lines.iter().map(|line| line.chars().collect()).collect();
        let width = letters[0].len();
        for (row, line) in letters.iter().enumerate() {
            if line.len() != width {
                return Err(Error::NonRectangularMap {
                    row: row + 1,
                    found: line.len(),
                    expected: width,
                });
            }
        }

        let rows = letters.len() as i32;
        let cols = width as i32;
        let location_of = |row: usize, col: usize| Location::new(row as i32 + 1, col as i32 + 1);

        for (row, line) in letters.iter().enumerate() {
            for (col, &letter) in line.iter().enumerate() {
                let location = location_of(row, col);
                let on_border =
                    location.row == 1 || location.row == rows || location.col == 1 || location.col == cols;
                if on_border && letter != Terrain::Water.letter() {
                    return Err(Error::BorderNotWater { location, letter });
                }
            }
        }

        let mut cells = Vec::with_capacity(letters.len() * width);
        for (row, line) in letters.iter().enumerate() {
            for (col, &letter) in line.iter().enumerate() {
                let location = location_of(row, col);
                let terrain = Terrain::from_letter(letter)
                    .ok_or(Error::UnknownTerrain { location, letter })?;
                cells.push(Cell::new(location, terrain, params.f_max(terrain)));
            }
        }

        Ok(Self { rows, cols, cells })
    }

    /// Get the cell at a location, if it is on the island
    pub fn get(&self, loc: Location) -> Option<&Cell> {
        self.loc_to_index(loc).map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, loc: Location) -> Option<&mut Cell> {
        self.loc_to_index(loc).map(move |index| &mut self.cells[index])
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut()
    }

    fn loc_to_index(&self, loc: Location) -> Option<usize> {
        if loc.row < 1 || loc.row > self.rows || loc.col < 1 || loc.col > self.cols {
            return None;
        }
        Some(((loc.row - 1) * self.cols + (loc.col - 1)) as usize)
    }
}
