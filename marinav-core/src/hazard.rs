//! Spatial hazards and their nearest-neighbor indices.
use rstar::{primitives::GeomWithData, PointDistance, RTree};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vortex core of the flow field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Core {
    /// x coordinate of the center.
    pub x: f64,

    /// y coordinate of the center.
    pub y: f64,

    /// Rotation direction, `true` for clockwise.
    pub clockwise: bool,

    /// Circulation strength.
    pub strength: f64,
}

impl Core {
    /// Constructs a vortex core.
    pub fn new(x: f64, y: f64, clockwise: bool, strength: f64) -> Self {
        Self {
            x,
            y,
            clockwise,
            strength,
        }
    }

    /// Center of the core.
    pub fn center(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// A circular static obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// x coordinate of the center.
    pub x: f64,

    /// y coordinate of the center.
    pub y: f64,

    /// Radius.
    pub r: f64,
}

impl Obstacle {
    /// Constructs an obstacle.
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    /// Center of the obstacle.
    pub fn center(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Nearest-neighbor index over hazard centers.
///
/// Each entry carries the position of its hazard in the source list, so a
/// query result can be dereferenced back into that list. The index is built
/// in one go and never mutated; a changed hazard list needs a new index.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    /// Builds an index over the given centers.
    ///
    /// Returns `None` when there is nothing to index.
    pub fn build(centers: &[[f64; 2]]) -> Option<Self> {
        if centers.is_empty() {
            return None;
        }
        let points = centers
            .iter()
            .enumerate()
            .map(|(ix, c)| GeomWithData::new(*c, ix))
            .collect();
        Some(Self {
            tree: RTree::bulk_load(points),
        })
    }

    /// The number of indexed points.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Always `false`, as empty indices are never built.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Returns the list position of the center closest to `p` and its distance.
    pub fn nearest(&self, p: [f64; 2]) -> Option<(usize, f64)> {
        self.tree
            .nearest_neighbor(&p)
            .map(|n| (n.data, n.distance_2(&p).sqrt()))
    }

    /// Returns all list positions with their distances, closest first.
    pub fn nearest_first(&self, p: [f64; 2]) -> Vec<(usize, f64)> {
        self.tree
            .nearest_neighbor_iter(&p)
            .map(|n| (n.data, n.distance_2(&p).sqrt()))
            .collect()
    }

    /// Returns the list positions of centers within `radius` of `p`, in list order.
    pub fn within(&self, p: [f64; 2], radius: f64) -> Vec<usize> {
        let mut ixs: Vec<usize> = self
            .tree
            .locate_within_distance(p, radius * radius)
            .map(|n| n.data)
            .collect();
        ixs.sort_unstable();
        ixs
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.len())
            .finish()
    }
}

/// Layout of an environment: start, goal, vortex cores and obstacles.
///
/// Hazard lists are only replaced as a whole, and every replacement rebuilds
/// the corresponding index.
#[derive(Debug, Default)]
pub struct HazardField {
    /// Start position of the robot.
    pub start: [f64; 2],

    /// Goal position.
    pub goal: [f64; 2],

    cores: Vec<Core>,
    obstacles: Vec<Obstacle>,
    core_index: Option<SpatialIndex>,
    obstacle_index: Option<SpatialIndex>,
}

impl HazardField {
    /// Constructs a layout without hazards.
    pub fn new(start: [f64; 2], goal: [f64; 2]) -> Self {
        Self {
            start,
            goal,
            ..Self::default()
        }
    }

    /// Removes all hazards and their indices.
    pub fn clear(&mut self) {
        self.cores.clear();
        self.obstacles.clear();
        self.core_index = None;
        self.obstacle_index = None;
    }

    /// Replaces the vortex cores.
    pub fn set_cores(&mut self, cores: Vec<Core>) {
        let centers: Vec<_> = cores.iter().map(Core::center).collect();
        self.cores = cores;
        self.core_index = SpatialIndex::build(&centers);
    }

    /// Replaces the obstacles.
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        let centers: Vec<_> = obstacles.iter().map(Obstacle::center).collect();
        self.obstacles = obstacles;
        self.obstacle_index = SpatialIndex::build(&centers);
    }

    /// Vortex cores.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Obstacles.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Index over the core centers, absent without cores.
    pub fn core_index(&self) -> Option<&SpatialIndex> {
        self.core_index.as_ref()
    }

    /// Index over the obstacle centers, absent without obstacles.
    pub fn obstacle_index(&self) -> Option<&SpatialIndex> {
        self.obstacle_index.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hazard_list_builds_no_index() {
        assert!(SpatialIndex::build(&[]).is_none());

        let mut field = HazardField::new([0.0, 0.0], [1.0, 1.0]);
        field.set_obstacles(vec![]);
        assert!(field.obstacle_index().is_none());
    }

    #[test]
    fn test_index_positions_refer_to_source_list() {
        let obstacles = vec![
            Obstacle::new(20.0, 36.0, 1.5),
            Obstacle::new(35.0, 19.0, 1.5),
            Obstacle::new(8.0, 25.0, 1.5),
        ];
        let mut field = HazardField::default();
        field.set_obstacles(obstacles);

        let index = field.obstacle_index().unwrap();
        assert_eq!(index.len(), 3);

        let (ix, d) = index.nearest([34.0, 19.0]).unwrap();
        assert_eq!(field.obstacles()[ix], Obstacle::new(35.0, 19.0, 1.5));
        assert!((d - 1.0).abs() < 1e-12);

        let order: Vec<usize> = index
            .nearest_first([9.0, 25.0])
            .into_iter()
            .map(|(ix, _)| ix)
            .collect();
        assert_eq!(order, vec![2, 0, 1]);
        assert_eq!(index.within([27.0, 27.0], 12.0), vec![0, 1]);
    }

    #[test]
    fn test_replacing_hazards_rebuilds_index() {
        let mut field = HazardField::default();
        field.set_cores(vec![Core::new(0.0, 0.0, true, 1.0)]);
        assert_eq!(field.core_index().map(SpatialIndex::len), Some(1));

        field.set_cores(vec![
            Core::new(0.0, 0.0, true, 1.0),
            Core::new(5.0, 0.0, false, 1.0),
        ]);
        assert_eq!(field.core_index().map(SpatialIndex::len), Some(2));

        field.clear();
        assert!(field.cores().is_empty());
        assert!(field.core_index().is_none());
    }
}
