//! Named example problems.
//!
//! Node ids are decimal strings `"0"`, `"1"`, ... in key order. Every graph
//! here is symmetric.

use std::fmt;

use chroma_kernel::graph::AdjacencyV1;
use chroma_kernel::palette::PaletteV1;
use delaunator::Point;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The five-color palette of the demo UI, in try order.
pub const DEFAULT_COLORS: [&str; 5] = ["#EF4444", "#3B82F6", "#10B981", "#F59E0B", "#8B5CF6"];

/// Names accepted by [`by_name`]. `N`, `W`, `H` are positive integers;
/// `SEED` is any `u64` and defaults to 0.
pub const FIXTURE_NAMES: [&str; 8] = [
    "pair",
    "triangle",
    "house",
    "k4",
    "cycle-N",
    "wheel-N",
    "grid-WxH",
    "voronoi-N[-sSEED]",
];

/// Canvas the map generator scatters points over.
pub const MAP_WIDTH: f64 = 600.0;
pub const MAP_HEIGHT: f64 = 400.0;

/// A fixture name that did not resolve to a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    Unknown { name: String },
    /// `nodes` is `None` when the count does not fit in `usize`.
    TooLarge {
        name: String,
        nodes: Option<usize>,
        limit: usize,
    },
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { name } => write!(
                f,
                "unknown example {name:?}; expected one of {}",
                FIXTURE_NAMES.join(", ")
            ),
            Self::TooLarge {
                name,
                nodes: Some(nodes),
                limit,
            } => write!(
                f,
                "example {name:?} has {nodes} nodes; the limit is {limit}"
            ),
            Self::TooLarge {
                name,
                nodes: None,
                limit,
            } => write!(
                f,
                "example {name:?} has too many nodes to count; the limit is {limit}"
            ),
        }
    }
}

impl std::error::Error for FixtureError {}

fn build(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> AdjacencyV1 {
    let nodes = (0..n).map(|i| i.to_string());
    let edges = edges
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()));
    AdjacencyV1::from_edges(nodes, edges)
        .unwrap_or_else(|e| unreachable!("fixture edges only name declared nodes: {e}"))
}

#[must_use]
pub fn pair() -> AdjacencyV1 {
    build(2, [(0, 1)])
}

#[must_use]
pub fn triangle() -> AdjacencyV1 {
    build(3, [(0, 1), (1, 2), (0, 2)])
}

/// Five nodes: a square `0-1-3-4-2` with roof diagonal `1-2` and cross edge
/// `1-4`. Needs three colors.
#[must_use]
pub fn house() -> AdjacencyV1 {
    build(5, [(0, 1), (0, 2), (1, 2), (1, 3), (2, 4), (3, 4), (1, 4)])
}

/// Complete graph on four nodes. Needs four colors.
#[must_use]
pub fn k4() -> AdjacencyV1 {
    build(4, [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)])
}

/// Cycle on `n` nodes. Below three nodes this is a path.
#[must_use]
pub fn cycle(n: usize) -> AdjacencyV1 {
    let mut edges: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
    if n >= 3 {
        edges.push((n - 1, 0));
    }
    build(n, edges)
}

/// Hub `"0"` joined to every node of a cycle on `"1"..="n"`.
///
/// Needs three colors when `n` is even and four when odd.
///
/// # Panics
///
/// Panics if `n + 1` overflows `usize`.
#[must_use]
pub fn wheel(n: usize) -> AdjacencyV1 {
    let total = wheel_nodes(n).unwrap_or_else(|| panic!("wheel-{n} overflows usize"));
    let mut edges: Vec<(usize, usize)> = (1..=n).map(|i| (0, i)).collect();
    edges.extend((2..=n).map(|i| (i - 1, i)));
    if n >= 3 {
        edges.push((n, 1));
    }
    build(total, edges)
}

/// Node count of [`wheel`]`(n)`, or `None` on overflow.
#[must_use]
pub fn wheel_nodes(n: usize) -> Option<usize> {
    n.checked_add(1)
}

/// `width` × `height` lattice, row-major. Bipartite.
///
/// # Panics
///
/// Panics if `width * height` overflows `usize`.
#[must_use]
pub fn grid(width: usize, height: usize) -> AdjacencyV1 {
    let total = grid_nodes(width, height)
        .unwrap_or_else(|| panic!("grid-{width}x{height} overflows usize"));
    let mut edges = Vec::new();
    for row in 0..height {
        for col in 0..width {
            let i = row * width + col;
            if col + 1 < width {
                edges.push((i, i + 1));
            }
            if row + 1 < height {
                edges.push((i, i + width));
            }
        }
    }
    build(total, edges)
}

/// Node count of [`grid`]`(width, height)`, or `None` on overflow.
#[must_use]
pub fn grid_nodes(width: usize, height: usize) -> Option<usize> {
    width.checked_mul(height)
}

// ---------------------------------------------------------------------------
// Planar maps
// ---------------------------------------------------------------------------

/// Map whose regions are the Voronoi cells of `points`: node `i` borders
/// node `j` when their cells share an edge, i.e. when `i-j` is an edge of
/// the Delaunay triangulation. Neighbor lists are in ascending node order.
///
/// Collinear points border their neighbors along the line. A point that
/// repeats an earlier one borders nothing.
#[must_use]
pub fn planar_map(points: &[(f64, f64)]) -> AdjacencyV1 {
    if points.len() < 2 {
        return build(points.len(), []);
    }
    let sites: Vec<Point> = points.iter().map(|&(x, y)| Point { x, y }).collect();
    let triangulation = delaunator::triangulate(&sites);

    let mut edges: Vec<(usize, usize)> = if triangulation.triangles.is_empty() {
        triangulation
            .hull
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    } else {
        triangulation
            .triangles
            .chunks_exact(3)
            .flat_map(|t| [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])])
            .collect()
    };
    for edge in &mut edges {
        *edge = (edge.0.min(edge.1), edge.0.max(edge.1));
    }
    edges.sort_unstable();
    edges.dedup();
    build(points.len(), edges)
}

/// `n` points drawn uniformly from the [`MAP_WIDTH`] × [`MAP_HEIGHT`]
/// canvas. The same `seed` always yields the same points.
#[must_use]
pub fn random_sites(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.gen_range(0.0..MAP_WIDTH), rng.gen_range(0.0..MAP_HEIGHT)))
        .collect()
}

/// Random planar map of `n` regions. Four colors always suffice.
#[must_use]
pub fn voronoi(n: usize, seed: u64) -> AdjacencyV1 {
    planar_map(&random_sites(n, seed))
}

/// First `k` of [`DEFAULT_COLORS`]; past five, labels `c5`, `c6`, ...
#[must_use]
pub fn default_palette(k: usize) -> PaletteV1 {
    (0..k)
        .map(|i| {
            DEFAULT_COLORS
                .get(i)
                .map_or_else(|| format!("c{i}"), |c| (*c).to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

enum Shape {
    Pair,
    Triangle,
    House,
    K4,
    Cycle(usize),
    Wheel(usize),
    Grid(usize, usize),
    Voronoi { n: usize, seed: u64 },
}

impl Shape {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "pair" => return Some(Self::Pair),
            "triangle" => return Some(Self::Triangle),
            "house" => return Some(Self::House),
            "k4" => return Some(Self::K4),
            _ => {}
        }
        if let Some(n) = name.strip_prefix("cycle-") {
            return positive(n).map(Self::Cycle);
        }
        if let Some(n) = name.strip_prefix("wheel-") {
            return positive(n).map(Self::Wheel);
        }
        if let Some(rest) = name.strip_prefix("voronoi-") {
            let (n, seed) = match rest.split_once("-s") {
                Some((n, seed)) => (n, seed.parse().ok()?),
                None => (rest, 0),
            };
            return positive(n).map(|n| Self::Voronoi { n, seed });
        }
        let (w, h) = name.strip_prefix("grid-")?.split_once('x')?;
        Some(Self::Grid(positive(w)?, positive(h)?))
    }

    fn node_count(&self) -> Option<usize> {
        match *self {
            Self::Pair => Some(2),
            Self::Triangle => Some(3),
            Self::House => Some(5),
            Self::K4 => Some(4),
            Self::Cycle(n) | Self::Voronoi { n, .. } => Some(n),
            Self::Wheel(n) => wheel_nodes(n),
            Self::Grid(w, h) => grid_nodes(w, h),
        }
    }

    fn build(&self) -> AdjacencyV1 {
        match *self {
            Self::Pair => pair(),
            Self::Triangle => triangle(),
            Self::House => house(),
            Self::K4 => k4(),
            Self::Cycle(n) => cycle(n),
            Self::Wheel(n) => wheel(n),
            Self::Grid(w, h) => grid(w, h),
            Self::Voronoi { n, seed } => voronoi(n, seed),
        }
    }
}

fn positive(text: &str) -> Option<usize> {
    text.parse().ok().filter(|&n| n > 0)
}

/// Look up a fixture by name (see [`FIXTURE_NAMES`]).
///
/// The node count is checked against `max_nodes` before anything is built.
///
/// # Errors
///
/// [`FixtureError::Unknown`] for unrecognized names and
/// [`FixtureError::TooLarge`] when the graph would exceed `max_nodes`.
pub fn by_name(name: &str, max_nodes: usize) -> Result<AdjacencyV1, FixtureError> {
    let shape = Shape::parse(name).ok_or_else(|| FixtureError::Unknown {
        name: name.to_string(),
    })?;
    match shape.node_count() {
        Some(nodes) if nodes <= max_nodes => Ok(shape.build()),
        nodes => Err(FixtureError::TooLarge {
            name: name.to_string(),
            nodes,
            limit: max_nodes,
        }),
    }
}
