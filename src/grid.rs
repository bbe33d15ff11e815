use crate::config::GridConfig;
use crate::lane::Lane;
use crate::light::Axis;
use crate::math::{Point2d, Vector2d};
use cgmath::prelude::*;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coordinates closer than this are considered to lie on the same row or column.
const COORD_EPSILON: f64 = 1e-6;

/// A road intersection. Intersections are immutable once the grid is built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Intersection {
    /// The intersection ID, which is also its index in the grid.
    id: usize,
    /// The world position.
    position: Point2d,
    /// The index of the row (distinct y coordinate) it lies on.
    row: usize,
    /// The index of the column (distinct x coordinate) it lies on.
    col: usize,
}

/// A pair of neighbouring intersections along a road.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdjacentPair {
    /// The first intersection ID.
    pub a: usize,
    /// The second intersection ID.
    pub b: usize,
    /// The direction of the road joining them.
    pub axis: Axis,
    /// The distance between the two.
    pub distance: f64,
}

/// The road grid: intersections, the lanes through them,
/// and which intersections neighbour each other.
#[derive(Clone, Debug)]
pub struct Grid {
    intersections: Vec<Intersection>,
    lanes: Vec<Lane>,
    adjacent: Vec<AdjacentPair>,
    rows: Vec<f64>,
    cols: Vec<f64>,
}

impl Intersection {
    /// Creates a new intersection.
    pub fn new(id: usize, position: Point2d, row: usize, col: usize) -> Self {
        Self {
            id,
            position,
            row,
            col,
        }
    }

    /// The intersection ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The world position.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The grid row.
    pub fn row(&self) -> usize {
        self.row
    }

    /// The grid column.
    pub fn col(&self) -> usize {
        self.col
    }

    /// The axis controlled by this intersection's signal.
    /// Signals alternate between axes from one row to the next.
    pub fn signal_axis(&self) -> Axis {
        if self.row % 2 == 0 {
            Axis::NorthSouth
        } else {
            Axis::EastWest
        }
    }
}

impl Grid {
    /// Builds the grid described by the configuration.
    pub fn new(config: &GridConfig) -> Self {
        let rows = distinct_coords(config.intersections.iter().map(|p| p.y));
        let cols = distinct_coords(config.intersections.iter().map(|p| p.x));

        let intersections = config
            .intersections
            .iter()
            .enumerate()
            .map(|(id, &pos)| {
                let (row, col) = (index_of(&rows, pos.y), index_of(&cols, pos.x));
                Intersection::new(id, pos, row, col)
            })
            .collect::<Vec<_>>();

        let mut adjacent = vec![];
        for row in 0..rows.len() {
            let members = intersections
                .iter()
                .filter(|i| i.row == row)
                .sorted_by(|a, b| a.position.x.total_cmp(&b.position.x));
            adjacent.extend(pairs_along(members, Axis::EastWest));
        }
        for col in 0..cols.len() {
            let members = intersections
                .iter()
                .filter(|i| i.col == col)
                .sorted_by(|a, b| a.position.y.total_cmp(&b.position.y));
            adjacent.extend(pairs_along(members, Axis::NorthSouth));
        }

        let offset = Vector2d::new(0.0, config.lane_offset);
        let horizontal = rows.iter().flat_map(|&y| {
            [-1.0, 1.0].map(|side| {
                let start = Point2d::new(0.0, y) + side * offset;
                Lane::new(start, start + Vector2d::new(config.bounds.x, 0.0))
            })
        });
        let offset = Vector2d::new(config.lane_offset, 0.0);
        let vertical = cols.iter().flat_map(|&x| {
            [-1.0, 1.0].map(|side| {
                let start = Point2d::new(x, 0.0) + side * offset;
                Lane::new(start, start + Vector2d::new(0.0, config.bounds.y))
            })
        });
        let lanes = horizontal.chain(vertical).collect();

        Self {
            intersections,
            lanes,
            adjacent,
            rows,
            cols,
        }
    }

    /// The intersections, indexed by ID.
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// The number of intersections.
    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    /// Whether the grid has no intersections.
    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// The lanes vehicles travel along.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Every pair of neighbouring intersections along both axes.
    pub fn adjacent_pairs(&self) -> &[AdjacentPair] {
        &self.adjacent
    }

    /// The number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The number of columns.
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }
}

/// Sorts and de-duplicates coordinates.
fn distinct_coords(values: impl Iterator<Item = f64>) -> Vec<f64> {
    values
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup_by(|a, b| (a - b).abs() < COORD_EPSILON)
        .collect()
}

fn index_of(coords: &[f64], value: f64) -> usize {
    coords
        .iter()
        .position(|c| (c - value).abs() < COORD_EPSILON)
        .expect("Coordinate is not on the grid.")
}

/// Pairs up consecutive intersections along a road.
fn pairs_along<'a>(
    members: impl Iterator<Item = &'a Intersection>,
    axis: Axis,
) -> Vec<AdjacentPair> {
    members
        .tuple_windows()
        .map(|(a, b)| AdjacentPair {
            a: a.id,
            b: b.id,
            axis,
            distance: a.position.distance(b.position),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::GridConfig;

    #[test]
    fn default_grid_shape() {
        let grid = Grid::new(&GridConfig::default());
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.num_rows(), 2);
        assert_eq!(grid.num_cols(), 3);
        // Two lanes per road: two horizontal roads and three vertical ones
        assert_eq!(grid.lanes().len(), 10);
    }

    #[test]
    fn adjacency_follows_both_axes() {
        let grid = Grid::new(&GridConfig::default());
        let pairs = grid.adjacent_pairs();
        let horizontal = pairs.iter().filter(|p| p.axis == Axis::EastWest).count();
        let vertical = pairs.iter().filter(|p| p.axis == Axis::NorthSouth).count();
        assert_eq!(horizontal, 4);
        assert_eq!(vertical, 3);
        assert!(pairs.contains(&AdjacentPair {
            a: 0,
            b: 1,
            axis: Axis::EastWest,
            distance: 300.0
        }));
        assert!(pairs.contains(&AdjacentPair {
            a: 2,
            b: 5,
            axis: Axis::NorthSouth,
            distance: 250.0
        }));
    }

    #[test]
    fn signal_axes_alternate_by_row() {
        let grid = Grid::new(&GridConfig::default());
        let axes = grid
            .intersections()
            .iter()
            .map(|i| i.signal_axis())
            .collect::<Vec<_>>();
        assert_eq!(&axes[..3], &[Axis::NorthSouth; 3]);
        assert_eq!(&axes[3..], &[Axis::EastWest; 3]);
    }
}
