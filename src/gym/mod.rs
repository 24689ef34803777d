pub mod grid;

pub use grid::{parse_map, Cell, Grid, GridAction};
