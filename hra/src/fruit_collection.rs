//! Fruit collection environment.
mod base;
mod config;
mod obs;
pub use base::FruitCollection;
pub use config::FruitCollectionConfig;
pub use obs::FruitCollectionObs;

/// Width and height of the grid.
pub const GRID_SIZE: usize = 10;

/// Cells on which fruits can appear, as `(row, col)`.
pub const FRUIT_CELLS: [(usize, usize); 10] = [
    (0, 0),
    (0, 9),
    (9, 0),
    (9, 9),
    (2, 4),
    (4, 2),
    (7, 5),
    (5, 7),
    (1, 6),
    (8, 3),
];

/// Up, down, left and right.
pub const N_ACTIONS: usize = 4;

/// Dimension of the observation vector.
pub const OBS_DIM: usize = GRID_SIZE * GRID_SIZE + FRUIT_CELLS.len();
