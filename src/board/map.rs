//! Region graph: regions, continents, and adjacency.
//!
//! The graph is an arena keyed by integer ids. Regions record their continent
//! id and a set of neighbor ids; continents record their member region ids.
//! Nothing holds a reference to anything else, so the graph can be shared
//! read-only between game states once built.
//!
//! Construction is append-only. Every `add_neighbor` call is mirrored, so the
//! adjacency relation is always symmetric.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

/// Identifier of a region on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a continent on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContinentId(pub u32);

impl fmt::Display for ContinentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while building or querying the graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("region {0} not found")]
    RegionNotFound(RegionId),

    #[error("continent {0} not found")]
    ContinentNotFound(ContinentId),

    #[error("region {0} already exists")]
    DuplicateRegion(RegionId),

    #[error("continent {0} already exists")]
    DuplicateContinent(ContinentId),

    #[error("region {0} cannot neighbor itself")]
    SelfNeighbor(RegionId),
}

/// Static facts about a single region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub continent: ContinentId,
    neighbors: BTreeSet<RegionId>,
}

impl Region {
    /// Neighbor ids in ascending order.
    pub fn neighbors(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.neighbors.iter().copied()
    }

    pub fn is_neighbor(&self, other: RegionId) -> bool {
        self.neighbors.contains(&other)
    }
}

/// Static facts about a continent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continent {
    pub id: ContinentId,
    pub name: String,
    /// Bonus armies per round for the player holding every member region.
    pub reward: u32,
    regions: Vec<RegionId>,
}

impl Continent {
    /// Member regions in insertion order.
    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }
}

/// The full region graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapGraph {
    regions: BTreeMap<RegionId, Region>,
    continents: BTreeMap<ContinentId, Continent>,
}

impl MapGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a continent with a generated name.
    pub fn add_continent(&mut self, id: ContinentId, reward: u32) -> Result<(), MapError> {
        self.add_continent_named(id, format!("continent {}", id), reward)
    }

    /// Registers a continent with an explicit display name.
    pub fn add_continent_named(
        &mut self,
        id: ContinentId,
        name: impl Into<String>,
        reward: u32,
    ) -> Result<(), MapError> {
        if self.continents.contains_key(&id) {
            return Err(MapError::DuplicateContinent(id));
        }
        self.continents.insert(
            id,
            Continent {
                id,
                name: name.into(),
                reward,
                regions: Vec::new(),
            },
        );
        Ok(())
    }

    /// Registers a region inside an existing continent.
    pub fn add_region(&mut self, id: RegionId, continent: ContinentId) -> Result<(), MapError> {
        self.add_region_named(id, format!("region {}", id), continent)
    }

    /// Registers a region with an explicit display name.
    pub fn add_region_named(
        &mut self,
        id: RegionId,
        name: impl Into<String>,
        continent: ContinentId,
    ) -> Result<(), MapError> {
        if self.regions.contains_key(&id) {
            return Err(MapError::DuplicateRegion(id));
        }
        let cont = self
            .continents
            .get_mut(&continent)
            .ok_or(MapError::ContinentNotFound(continent))?;
        cont.regions.push(id);
        self.regions.insert(
            id,
            Region {
                id,
                name: name.into(),
                continent,
                neighbors: BTreeSet::new(),
            },
        );
        Ok(())
    }

    /// Connects two regions in both directions. Repeated calls are no-ops.
    pub fn add_neighbor(&mut self, region: RegionId, neighbor: RegionId) -> Result<(), MapError> {
        if region == neighbor {
            return Err(MapError::SelfNeighbor(region));
        }
        if !self.regions.contains_key(&neighbor) {
            return Err(MapError::RegionNotFound(neighbor));
        }
        self.regions
            .get_mut(&region)
            .ok_or(MapError::RegionNotFound(region))?
            .neighbors
            .insert(neighbor);
        if let Some(other) = self.regions.get_mut(&neighbor) {
            other.neighbors.insert(region);
        }
        Ok(())
    }

    /// Looks up a region by id.
    pub fn region(&self, id: RegionId) -> Result<&Region, MapError> {
        self.regions.get(&id).ok_or(MapError::RegionNotFound(id))
    }

    /// Looks up a continent by id.
    pub fn continent(&self, id: ContinentId) -> Result<&Continent, MapError> {
        self.continents.get(&id).ok_or(MapError::ContinentNotFound(id))
    }

    pub fn contains_region(&self, id: RegionId) -> bool {
        self.regions.contains_key(&id)
    }

    /// All regions in ascending id order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.values()
    }

    /// All continents in ascending id order.
    pub fn continents(&self) -> impl Iterator<Item = &Continent> + '_ {
        self.continents.values()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Returns true if both regions exist and share a border.
    pub fn is_neighbor(&self, a: RegionId, b: RegionId) -> bool {
        self.regions.get(&a).is_some_and(|r| r.is_neighbor(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_continents() -> MapGraph {
        let mut map = MapGraph::new();
        map.add_continent(ContinentId(1), 2).unwrap();
        map.add_continent_named(ContinentId(2), "South", 3).unwrap();
        map.add_region(RegionId(1), ContinentId(1)).unwrap();
        map.add_region(RegionId(2), ContinentId(1)).unwrap();
        map.add_region_named(RegionId(3), "Cape", ContinentId(2)).unwrap();
        map
    }

    #[test]
    fn neighbors_are_mirrored() {
        let mut map = two_continents();
        map.add_neighbor(RegionId(1), RegionId(3)).unwrap();
        assert!(map.is_neighbor(RegionId(1), RegionId(3)));
        assert!(map.is_neighbor(RegionId(3), RegionId(1)));
        assert!(!map.is_neighbor(RegionId(1), RegionId(2)));
    }

    #[test]
    fn duplicate_neighbor_is_idempotent() {
        let mut map = two_continents();
        map.add_neighbor(RegionId(1), RegionId(2)).unwrap();
        map.add_neighbor(RegionId(2), RegionId(1)).unwrap();
        let n: Vec<_> = map.region(RegionId(1)).unwrap().neighbors().collect();
        assert_eq!(n, vec![RegionId(2)]);
    }

    #[test]
    fn continent_lists_members_in_order() {
        let map = two_continents();
        let c = map.continent(ContinentId(1)).unwrap();
        assert_eq!(c.regions(), &[RegionId(1), RegionId(2)]);
        assert_eq!(c.reward, 2);
        assert_eq!(map.continent(ContinentId(2)).unwrap().name, "South");
        assert_eq!(map.region(RegionId(3)).unwrap().name, "Cape");
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut map = two_continents();
        assert_eq!(
            map.region(RegionId(9)).unwrap_err(),
            MapError::RegionNotFound(RegionId(9))
        );
        assert_eq!(
            map.add_region(RegionId(9), ContinentId(7)).unwrap_err(),
            MapError::ContinentNotFound(ContinentId(7))
        );
        assert_eq!(
            map.add_neighbor(RegionId(1), RegionId(9)).unwrap_err(),
            MapError::RegionNotFound(RegionId(9))
        );
        assert_eq!(
            map.add_neighbor(RegionId(9), RegionId(1)).unwrap_err(),
            MapError::RegionNotFound(RegionId(9))
        );
        // The failed call must not leave a dangling half-edge.
        assert_eq!(map.region(RegionId(1)).unwrap().neighbors().count(), 0);
    }

    #[test]
    fn rejects_duplicates_and_self_loops() {
        let mut map = two_continents();
        assert_eq!(
            map.add_continent(ContinentId(1), 5).unwrap_err(),
            MapError::DuplicateContinent(ContinentId(1))
        );
        assert_eq!(
            map.add_region(RegionId(2), ContinentId(2)).unwrap_err(),
            MapError::DuplicateRegion(RegionId(2))
        );
        assert_eq!(
            map.add_neighbor(RegionId(2), RegionId(2)).unwrap_err(),
            MapError::SelfNeighbor(RegionId(2))
        );
    }
}
