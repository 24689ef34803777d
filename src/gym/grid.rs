use std::{fmt, sync::mpsc::Receiver};

use log::{debug, warn};
use rand::{rngs::StdRng, seq::IteratorRandom, Rng, SeedableRng};
use strum::{EnumCount, FromRepr};

use crate::{
    env::{EnvEvent, Environment},
    notify::Observers,
    Error, Result, StateVector,
};

/// Contents of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Obstacle,
    Goal,
}

impl Cell {
    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Obstacle => '#',
            Cell::Goal => 'G',
        }
    }
}

/// A move on the grid; the discriminant is the action index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, FromRepr)]
#[repr(usize)]
pub enum GridAction {
    /// x - 1
    Left = 0,
    /// x + 1
    Right = 1,
    /// y - 1
    Top = 2,
    /// y + 1
    Bottom = 3,
}

type Pos = (usize, usize);

/// Parse a map from text, one line per row: `.` empty, `#` obstacle, `G` goal
///
/// The character at column `x` of line `y` becomes cell `(x, y)`. Surrounding whitespace of
/// each line is ignored, blank lines are skipped.
///
/// Fails with [`Error::InvalidParameter`] for any other character or for rows of unequal length
pub fn parse_map(text: &str) -> Result<Vec<Vec<Cell>>> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let width = rows.first().map_or(0, |r| r.chars().count());

    let mut map = vec![Vec::with_capacity(rows.len()); width];
    for (y, row) in rows.iter().enumerate() {
        if row.chars().count() != width {
            return Err(Error::invalid(
                "map",
                format!("row {y} is not {width} cells wide"),
            ));
        }
        for (x, c) in row.chars().enumerate() {
            let cell = match c {
                '.' => Cell::Empty,
                '#' => Cell::Obstacle,
                'G' => Cell::Goal,
                _ => {
                    return Err(Error::invalid(
                        "map",
                        format!("unknown cell `{c}` at ({x}, {y})"),
                    ))
                }
            };
            map[x].push(cell);
        }
    }
    Ok(map)
}

/// A two-dimensional grid for path finding tasks
///
/// The state is the agent's location `(x, y)`. Each action moves the agent one cell unless the
/// move would leave the grid or enter an obstacle, in which case it stays put. Every step costs
/// a reward of -1 except reaching a goal cell, which is worth 0 and ends the trial.
///
/// The agent starts every trial at a fixed location or, if none is set or it is occupied, at a
/// random free cell.
pub struct Grid<R = StdRng> {
    map: Vec<Vec<Cell>>, // indexed [x][y]
    start: Option<Pos>,
    pos: Pos,
    rng: R,
    observers: Observers<EnvEvent>,
}

impl Grid {
    /// Construct a grid from a map indexed `[x][y]`, with an entropy-seeded generator for
    /// random start locations
    ///
    /// A `start` outside the grid means random start locations.
    ///
    /// Fails with [`Error::InvalidParameter`] if the map is smaller than 2x2 or not rectangular
    pub fn new(map: Vec<Vec<Cell>>, start: Option<Pos>) -> Result<Self> {
        Self::with_rng(map, start, StdRng::from_entropy())
    }

    /// Construct a grid with a reproducible generator for random start locations
    pub fn seeded(map: Vec<Vec<Cell>>, start: Option<Pos>, seed: u64) -> Result<Self> {
        Self::with_rng(map, start, StdRng::seed_from_u64(seed))
    }

    /// Construct a grid from a text map, see [`parse_map`]
    pub fn parse(text: &str, start: Option<Pos>) -> Result<Self> {
        Self::new(parse_map(text)?, start)
    }
}

impl<R: Rng> Grid<R> {
    pub fn with_rng(map: Vec<Vec<Cell>>, start: Option<Pos>, rng: R) -> Result<Self> {
        let x_size = map.len();
        let y_size = map.first().map_or(0, Vec::len);
        if x_size < 2 || y_size < 2 {
            return Err(Error::invalid(
                "map",
                format!("{x_size}x{y_size} is smaller than 2x2"),
            ));
        }
        if let Some(x) = map.iter().position(|col| col.len() != y_size) {
            return Err(Error::invalid(
                "map",
                format!("column {x} is not {y_size} cells high"),
            ));
        }
        debug!("New {x_size}x{y_size} grid, start {start:?}");

        let mut grid = Self {
            map,
            start: None,
            pos: (0, 0),
            rng,
            observers: Observers::new(),
        };
        grid.start = start.filter(|&p| grid.in_range(p));
        grid.place();
        Ok(grid)
    }

    pub fn x_size(&self) -> usize {
        self.map.len()
    }

    pub fn y_size(&self) -> usize {
        self.map[0].len()
    }

    /// The agent's location
    pub fn position(&self) -> Pos {
        self.pos
    }

    /// The fixed start location, `None` for random start locations
    pub fn start(&self) -> Option<Pos> {
        self.start
    }

    /// Set a fixed start location; `None` or a location outside the grid means random start
    /// locations. Takes effect on the next reset.
    pub fn set_start(&mut self, start: Option<Pos>) {
        self.start = start.filter(|&p| self.in_range(p));
        debug!("Start location set to {:?}", self.start);
        self.observers.notify(EnvEvent::Properties);
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Result<Cell> {
        self.check_range(x, y)?;
        Ok(self.map[x][y])
    }

    pub fn set_obstacle(&mut self, x: usize, y: usize) -> Result<()> {
        self.set_cell(x, y, Cell::Obstacle)
    }

    pub fn set_empty(&mut self, x: usize, y: usize) -> Result<()> {
        self.set_cell(x, y, Cell::Empty)
    }

    pub fn set_goal(&mut self, x: usize, y: usize) -> Result<()> {
        self.set_cell(x, y, Cell::Goal)
    }

    fn set_cell(&mut self, x: usize, y: usize, cell: Cell) -> Result<()> {
        self.check_range(x, y)?;
        self.map[x][y] = cell;
        self.observers.notify(EnvEvent::Properties);
        Ok(())
    }

    /// Rescale the grid to a horizontal size of `xs` cells
    ///
    /// Fails with [`Error::InvalidParameter`] if `xs` is not greater than 1
    pub fn set_x_size(&mut self, xs: usize) -> Result<()> {
        if xs <= 1 {
            return Err(Error::invalid("xs", format!("{xs} is not greater than 1")));
        }
        self.resize(xs, self.y_size());
        Ok(())
    }

    /// Rescale the grid to a vertical size of `ys` cells
    ///
    /// Fails with [`Error::InvalidParameter`] if `ys` is not greater than 1
    pub fn set_y_size(&mut self, ys: usize) -> Result<()> {
        if ys <= 1 {
            return Err(Error::invalid("ys", format!("{ys} is not greater than 1")));
        }
        self.resize(self.x_size(), ys);
        Ok(())
    }

    /// Scale the map by the given factors, keeping at least 2 cells along each axis
    ///
    /// Every cell of the new map takes the contents of the old cell it falls into, and the start
    /// location moves to the middle of the block its old cell became. The agent is placed anew.
    ///
    /// Fails with [`Error::InvalidParameter`] if a factor is not positive
    pub fn rescale(&mut self, sx: f64, sy: f64) -> Result<()> {
        if !(sx > 0.0) || !(sy > 0.0) {
            return Err(Error::invalid(
                "sx/sy",
                format!("scale factors ({sx}, {sy}) must be positive"),
            ));
        }
        let xs = ((sx * self.x_size() as f64) as usize).max(2);
        let ys = ((sy * self.y_size() as f64) as usize).max(2);
        self.resize(xs, ys);
        Ok(())
    }

    fn resize(&mut self, xs: usize, ys: usize) {
        let (old_xs, old_ys) = (self.x_size(), self.y_size());
        let map = (0..xs)
            .map(|x| {
                (0..ys)
                    .map(|y| self.map[x * old_xs / xs][y * old_ys / ys])
                    .collect()
            })
            .collect();
        self.map = map;

        let scale = |v: usize, old: usize, new: usize| {
            let s = new as f64 / old as f64;
            let centre = (s * v as f64 + s * (v + 1) as f64 - 1.0) as i64 / 2;
            (centre.max(0) as usize).min(new - 1)
        };
        self.start = self
            .start
            .map(|(x, y)| (scale(x, old_xs, xs), scale(y, old_ys, ys)));
        debug!("Grid resized from {old_xs}x{old_ys} to {xs}x{ys}, start {:?}", self.start);

        self.place();
        self.observers.notify(EnvEvent::Properties);
    }

    /// Register an observer of state and configuration changes
    pub fn subscribe(&mut self, f: impl FnMut(EnvEvent) + Send + 'static) {
        self.observers.subscribe(f);
    }

    /// Receive the grid's notifications through a channel
    pub fn events(&mut self) -> Receiver<EnvEvent> {
        self.observers.channel()
    }

    fn in_range(&self, (x, y): Pos) -> bool {
        x < self.x_size() && y < self.y_size()
    }

    fn check_range(&self, x: usize, y: usize) -> Result<()> {
        if x >= self.x_size() {
            return Err(Error::out_of_range("x", x, self.x_size()));
        }
        if y >= self.y_size() {
            return Err(Error::out_of_range("y", y, self.y_size()));
        }
        Ok(())
    }

    fn can_move_to(&self, p: Pos) -> bool {
        self.in_range(p) && self.map[p.0][p.1] != Cell::Obstacle
    }

    /// Put the agent on the start location, or a random free cell
    fn place(&mut self) {
        if let Some(start) = self.start.filter(|&p| self.can_move_to(p)) {
            self.pos = start;
            return;
        }
        let (xs, ys) = (self.x_size(), self.y_size());
        let free = (0..xs)
            .flat_map(|x| (0..ys).map(move |y| (x, y)))
            .filter(|&p| self.map[p.0][p.1] != Cell::Obstacle)
            .choose(&mut self.rng);
        match free {
            Some(p) => self.pos = p,
            None => warn!("No free cell to place the agent on"),
        }
    }
}

impl<R: Rng> Environment for Grid<R> {
    fn state(&self) -> StateVector {
        StateVector::from([self.pos.0 as f64, self.pos.1 as f64])
    }

    fn execute(&mut self, action: usize) -> Result<f64> {
        let action = GridAction::from_repr(action)
            .ok_or_else(|| Error::out_of_range("action", action, GridAction::COUNT))?;
        let (x, y) = self.pos;
        let next = match action {
            GridAction::Left => x.checked_sub(1).map(|x| (x, y)),
            GridAction::Right => Some((x + 1, y)),
            GridAction::Top => y.checked_sub(1).map(|y| (x, y)),
            GridAction::Bottom => Some((x, y + 1)),
        };
        if let Some(p) = next.filter(|&p| self.can_move_to(p)) {
            self.pos = p;
        }
        self.observers.notify(EnvEvent::State);
        Ok(if self.is_terminal() { 0.0 } else { -1.0 })
    }

    fn is_terminal(&self) -> bool {
        self.map[self.pos.0][self.pos.1] == Cell::Goal
    }

    fn reset(&mut self) {
        self.place();
        self.observers.notify(EnvEvent::State);
    }
}

/// Renders the map in the format read by [`parse_map`], with the agent as `@`
impl<R> fmt::Display for Grid<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.map[0].len() {
            for (x, col) in self.map.iter().enumerate() {
                let c = if (x, y) == self.pos { '@' } else { col[y].symbol() };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
