//! Hop-limited route search over an implicit airport graph.
//!
//! The graph is never materialized. Edges come from a `neighbors_of`
//! capability supplied by the caller, typically a cache-backed radius query,
//! but any precomputed adjacency works just as well.

use crate::error::RouteError;
use crate::models::{AirportId, AirportSummary, Neighbor, RouteLeg};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;

pub const DEFAULT_MAX_VISITED: usize = 10_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum great-circle length of a single hop in kilometers
    pub ceiling_km: f64,
    /// Search gives up once more than this many airports were discovered
    pub max_visited: usize,
}

impl SearchConfig {
    pub fn new(ceiling_km: f64) -> Self {
        Self {
            ceiling_km,
            max_visited: DEFAULT_MAX_VISITED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathSearchResult {
    /// Airport ids from start to end; empty when no path was found.
    pub path: Vec<AirportId>,
    pub nodes_visited: usize,
    pub nodes_expanded: usize,
    /// True when the search stopped on `max_visited` rather than an empty frontier.
    pub bound_reached: bool,
}

impl PathSearchResult {
    pub fn found(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Breadth-first search for the path with the fewest hops from `start` to
/// `end`, where every hop is at most `config.ceiling_km` long.
///
/// Expansion is sequential: one `neighbors_of` call per dequeued airport, in
/// FIFO order. Among paths with equal hop counts the winner is whichever the
/// neighbor ordering discovers first. Hitting `max_visited` is reported as
/// "no path" (empty `path`) with `bound_reached` set. Only a failing
/// `neighbors_of` call produces an `Err`.
pub async fn find_shortest_path<F, Fut, E>(
    start: AirportId,
    end: AirportId,
    config: SearchConfig,
    mut neighbors_of: F,
) -> Result<PathSearchResult, E>
where
    F: FnMut(AirportId) -> Fut,
    Fut: Future<Output = Result<Vec<Neighbor>, E>>,
{
    if start == end {
        return Ok(PathSearchResult {
            path: vec![start],
            nodes_visited: 1,
            ..Default::default()
        });
    }

    let mut queue: VecDeque<AirportId> = VecDeque::from([start]);
    let mut visited: HashSet<AirportId> = HashSet::from([start]);
    let mut came_from: HashMap<AirportId, AirportId> = HashMap::new();
    let mut nodes_expanded = 0usize;

    while let Some(current) = queue.pop_front() {
        if visited.len() > config.max_visited {
            return Ok(PathSearchResult {
                path: Vec::new(),
                nodes_visited: visited.len(),
                nodes_expanded,
                bound_reached: true,
            });
        }

        if current == end {
            return Ok(PathSearchResult {
                path: reconstruct_path(&came_from, end),
                nodes_visited: visited.len(),
                nodes_expanded,
                bound_reached: false,
            });
        }

        nodes_expanded += 1;
        for neighbor in neighbors_of(current).await? {
            if neighbor.distance > config.ceiling_km {
                continue;
            }
            if visited.insert(neighbor.id) {
                came_from.insert(neighbor.id, current);
                queue.push_back(neighbor.id);
            }
        }
    }

    Ok(PathSearchResult {
        path: Vec::new(),
        nodes_visited: visited.len(),
        nodes_expanded,
        bound_reached: false,
    })
}

fn reconstruct_path(came_from: &HashMap<AirportId, AirportId>, end: AirportId) -> Vec<AirportId> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Consecutive `(from, to)` pairs along a path.
pub fn path_pairs(path: &[AirportId]) -> Vec<(AirportId, AirportId)> {
    path.windows(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Turn a path into ordered legs.
///
/// A missing distance for a path edge is an [`RouteError::Inconsistency`]; a
/// missing airport summary is [`RouteError::UnknownNode`]. Neither is ever
/// papered over with a zero-distance or blank leg.
pub fn build_legs<D, S>(
    path: &[AirportId],
    mut distance_of: D,
    mut summary_of: S,
) -> Result<Vec<RouteLeg>, RouteError>
where
    D: FnMut(AirportId, AirportId) -> Option<f64>,
    S: FnMut(AirportId) -> Option<AirportSummary>,
{
    path_pairs(path)
        .into_iter()
        .map(|(from, to)| {
            let distance =
                distance_of(from, to).ok_or(RouteError::Inconsistency { from, to })?;
            let from_node = summary_of(from).ok_or(RouteError::UnknownNode(from))?;
            let to_node = summary_of(to).ok_or(RouteError::UnknownNode(to))?;
            Ok(RouteLeg {
                from_id: from,
                to_id: to,
                from_node,
                to_node,
                distance,
            })
        })
        .collect()
}
