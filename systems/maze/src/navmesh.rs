use std::collections::{HashMap, HashSet, VecDeque};

use rand::{seq::SliceRandom, Rng};
use ringdelve_core::{TileCoord, Vec2};

use crate::Maze;

#[derive(Clone, Debug, Default)]
struct Node {
    center: Vec2,
    connections: Vec<TileCoord>,
}

/// Undirected graph connecting tiles that share an open wall.
#[derive(Clone, Debug, Default)]
pub struct NavMesh {
    rings: Vec<Vec<Node>>,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    coord: TileCoord,
    cost: f32,
    estimate: f32,
}

impl NavMesh {
    pub(crate) fn build(maze: &Maze) -> Self {
        let mut rings: Vec<Vec<Node>> = (0..maze.ring_count())
            .map(|ring| {
                let len = maze.ring_len(ring).unwrap_or(0);
                (0..len)
                    .map(|tile| Node {
                        center: maze
                            .tile_center(TileCoord::new(ring, tile))
                            .unwrap_or(Vec2::ZERO),
                        connections: Vec::new(),
                    })
                    .collect()
            })
            .collect();

        let mut connect = |a: TileCoord, b: TileCoord| {
            if a == b {
                return;
            }
            for (from, to) in [(a, b), (b, a)] {
                let node = &mut rings[from.ring() as usize][from.tile() as usize];
                if !node.connections.contains(&to) {
                    node.connections.push(to);
                }
            }
        };

        for (coord, tile) in maze.tiles() {
            if !tile.inner_blocked {
                if let Some(parent) = maze.parent(coord) {
                    connect(coord, parent);
                }
            }
            if !tile.clockwise_blocked {
                if let Some(clockwise) = maze.clockwise(coord) {
                    connect(coord, clockwise);
                }
            }
        }

        Self { rings }
    }

    fn node(&self, coord: TileCoord) -> Option<&Node> {
        self.rings
            .get(coord.ring() as usize)?
            .get(coord.tile() as usize)
    }

    /// Tiles directly reachable from `coord`, or an empty slice for unknown
    /// tiles.
    #[must_use]
    pub fn neighbors(&self, coord: TileCoord) -> &[TileCoord] {
        self.node(coord)
            .map_or(&[][..], |node| node.connections.as_slice())
    }

    /// Whether a direct connection joins the two tiles.
    #[must_use]
    pub fn is_connected(&self, a: TileCoord, b: TileCoord) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Every tile reachable from `from`, including `from`, in breadth-first
    /// order.
    #[must_use]
    pub fn reachable_from(&self, from: TileCoord) -> Vec<TileCoord> {
        if self.node(from).is_none() {
            return Vec::new();
        }

        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        let mut order = Vec::new();
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &next in self.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        order
    }

    /// Shortest tile path from `from` to `to`, both ends included.
    ///
    /// Edges cost the distance between tile centres and the straight-line
    /// distance to the goal guides the search.
    #[must_use]
    pub fn find_path(&self, from: TileCoord, to: TileCoord) -> Option<Vec<TileCoord>> {
        let goal = self.node(to)?.center;
        let start = self.node(from)?.center;

        // Sorted by descending estimate so the cheapest entry sits at the end.
        let mut open = vec![OpenEntry {
            coord: from,
            cost: 0.0,
            estimate: start.distance(goal),
        }];
        let mut best_cost: HashMap<TileCoord, f32> = HashMap::from([(from, 0.0)]);
        let mut came_from: HashMap<TileCoord, TileCoord> = HashMap::new();
        let mut closed: HashSet<TileCoord> = HashSet::new();

        while let Some(current) = open.pop() {
            if current.coord == to {
                return Some(reconstruct(&came_from, to));
            }
            if !closed.insert(current.coord) {
                continue;
            }

            let Some(node) = self.node(current.coord) else {
                continue;
            };
            for &next in &node.connections {
                if closed.contains(&next) {
                    continue;
                }
                let Some(next_node) = self.node(next) else {
                    continue;
                };
                let cost = current.cost + node.center.distance(next_node.center);
                if best_cost.get(&next).is_some_and(|&known| known <= cost) {
                    continue;
                }
                let _ = best_cost.insert(next, cost);
                let _ = came_from.insert(next, current.coord);

                let estimate = cost + next_node.center.distance(goal);
                let index = open.partition_point(|entry| entry.estimate > estimate);
                open.insert(
                    index,
                    OpenEntry {
                        coord: next,
                        cost,
                        estimate,
                    },
                );
            }
        }

        None
    }

    /// Random walk across connections starting at `start`.
    ///
    /// The walk stops once `max_visited` distinct tiles (or every reachable
    /// tile) have been seen, or when the start tile is isolated. Revisited
    /// tiles appear again in the returned sequence.
    pub fn random_walk<R: Rng + ?Sized>(
        &self,
        start: TileCoord,
        max_visited: usize,
        rng: &mut R,
    ) -> Vec<TileCoord> {
        let limit = max_visited.min(self.reachable_from(start).len());
        let mut seen = HashSet::new();
        let mut walk = Vec::new();
        let mut current = start;
        while seen.len() < limit {
            let _ = seen.insert(current);
            walk.push(current);
            if seen.len() >= limit {
                break;
            }
            match self.neighbors(current).choose(rng) {
                Some(&next) => current = next,
                None => break,
            }
        }
        walk
    }
}

fn reconstruct(came_from: &HashMap<TileCoord, TileCoord>, to: TileCoord) -> Vec<TileCoord> {
    let mut path = vec![to];
    let mut current = to;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
