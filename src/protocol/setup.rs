//! Setup and map-update streams.
//!
//! The map is described to bots (and to the referee) as a handful of lines:
//!
//! ```text
//! setup_map continents 1 2 2 5
//! setup_map regions 1 1 2 1 3 2
//! setup_map neighbors 1 2,3 2 3
//! pickable_starting_regions 1 3
//! update_map 1 1 2 3 0 2
//! ```
//!
//! Continents and regions are `<id> <value>` pairs, neighbors are
//! `<id> <csv ids>` pairs, and map updates are `<region> <owner> <armies>`
//! triplets with owner code 0 for neutral and 1/2 for the seats.
//!
//! Unparseable fragments are logged and skipped. References to continents or
//! regions that were never declared are configuration errors.

use thiserror::Error;

use crate::board::map::{ContinentId, MapError, MapGraph, RegionId};
use crate::board::player::{Owner, Seat};
use crate::board::state::GameState;

pub const SETUP_MAP: &str = "setup_map";
pub const PICKABLE_STARTING_REGIONS: &str = "pickable_starting_regions";
pub const UPDATE_MAP: &str = "update_map";

/// Errors raised while building a map from setup text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("unknown setup line '{0}'")]
    UnknownLine(String),

    #[error(transparent)]
    Map(#[from] MapError),
}

/// One region's state as carried by an `update_map` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionUpdate {
    pub region: RegionId,
    pub owner: Owner,
    pub armies: u32,
}

/// Builds a map from setup text, one statement per line. Blank lines are
/// ignored.
pub fn parse_setup(text: &str) -> Result<MapGraph, SetupError> {
    let mut map = MapGraph::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        apply_setup_line(&mut map, line)?;
    }
    Ok(map)
}

/// Applies a single `[setup_map] continents|regions|neighbors ...` line.
pub fn apply_setup_line(map: &mut MapGraph, line: &str) -> Result<(), SetupError> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() == Some(&SETUP_MAP) {
        tokens.remove(0);
    }
    let Some((&keyword, args)) = tokens.split_first() else {
        return Err(SetupError::UnknownLine(line.trim().to_string()));
    };

    match keyword {
        "continents" => {
            for (id, reward) in pairs(keyword, args) {
                let (Some(id), Some(reward)) = (number(keyword, id), number(keyword, reward))
                else {
                    continue;
                };
                map.add_continent(ContinentId(id), reward)?;
            }
        }
        "regions" => {
            for (id, continent) in pairs(keyword, args) {
                let (Some(id), Some(continent)) =
                    (number(keyword, id), number(keyword, continent))
                else {
                    continue;
                };
                map.add_region(RegionId(id), ContinentId(continent))?;
            }
        }
        "neighbors" => {
            for (id, list) in pairs(keyword, args) {
                let Some(id) = number(keyword, id) else {
                    continue;
                };
                let region = RegionId(id);
                map.region(region)?;
                for neighbor in list.split(',').filter(|s| !s.is_empty()) {
                    if let Some(n) = number(keyword, neighbor) {
                        map.add_neighbor(region, RegionId(n))?;
                    }
                }
            }
        }
        _ => return Err(SetupError::UnknownLine(line.trim().to_string())),
    }
    Ok(())
}

/// Formats the map as the three setup lines that [`parse_setup`] reads back.
pub fn format_setup(map: &MapGraph) -> Vec<String> {
    let mut continents = format!("{} continents", SETUP_MAP);
    for c in map.continents() {
        continents.push_str(&format!(" {} {}", c.id, c.reward));
    }

    let mut regions = format!("{} regions", SETUP_MAP);
    for r in map.regions() {
        regions.push_str(&format!(" {} {}", r.id, r.continent));
    }

    // Each edge is listed once, from its lower id.
    let mut neighbors = format!("{} neighbors", SETUP_MAP);
    for r in map.regions() {
        let higher: Vec<String> = r
            .neighbors()
            .filter(|n| *n > r.id)
            .map(|n| n.to_string())
            .collect();
        if !higher.is_empty() {
            neighbors.push_str(&format!(" {} {}", r.id, higher.join(",")));
        }
    }

    vec![continents, regions, neighbors]
}

/// Parses `pickable_starting_regions <id> ...`. Ids that are malformed or
/// unknown to `map` are logged and skipped.
pub fn parse_pickable(map: &MapGraph, line: &str) -> Vec<RegionId> {
    let mut tokens = line.split_whitespace().peekable();
    if tokens.peek() == Some(&PICKABLE_STARTING_REGIONS) {
        tokens.next();
    }
    tokens
        .filter_map(|t| number(PICKABLE_STARTING_REGIONS, t))
        .map(RegionId)
        .filter(|id| {
            let known = map.contains_region(*id);
            if !known {
                log::warn!("{}: unknown region {}", PICKABLE_STARTING_REGIONS, id);
            }
            known
        })
        .collect()
}

pub fn format_pickable(regions: &[RegionId]) -> String {
    let mut line = PICKABLE_STARTING_REGIONS.to_string();
    for r in regions {
        line.push_str(&format!(" {}", r));
    }
    line
}

/// Parses `update_map <region> <owner> <armies> ...`. Malformed triplets and
/// a trailing partial triplet are logged and skipped.
pub fn parse_map_update(line: &str) -> Vec<RegionUpdate> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() == Some(&UPDATE_MAP) {
        tokens.remove(0);
    }
    if tokens.len() % 3 != 0 {
        log::warn!("{}: trailing fragment {:?}", UPDATE_MAP, &tokens[tokens.len() / 3 * 3..]);
    }

    let mut updates = Vec::new();
    for chunk in tokens.chunks_exact(3) {
        let region = number(UPDATE_MAP, chunk[0]);
        let owner = chunk[1].parse::<u8>().ok().and_then(Owner::from_code);
        let armies = number(UPDATE_MAP, chunk[2]);
        match (region, owner, armies) {
            (Some(region), Some(owner), Some(armies)) => updates.push(RegionUpdate {
                region: RegionId(region),
                owner,
                armies,
            }),
            _ => log::warn!("{}: bad triplet '{}'", UPDATE_MAP, chunk.join(" ")),
        }
    }
    updates
}

/// Formats the `update_map` line for `seat`: every region it can see, in
/// ascending id order.
pub fn format_map_update<R>(state: &GameState<R>, seat: Seat) -> String {
    let mut line = UPDATE_MAP.to_string();
    for (id, s) in state.region_states() {
        if state.is_visible_to(id, seat) {
            line.push_str(&format!(" {} {} {}", id, s.owner.code(), s.armies));
        }
    }
    line
}

fn pairs<'a>(keyword: &str, args: &[&'a str]) -> Vec<(&'a str, &'a str)> {
    if args.len() % 2 != 0 {
        log::warn!("{}: odd number of values, last one ignored", keyword);
    }
    args.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

fn number(context: &str, s: &str) -> Option<u32> {
    match s.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("{}: '{}' is not a number", context, s);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use std::sync::Arc;

    const SMALL: &str = "\
setup_map continents 1 2 2 5
setup_map regions 1 1 2 1 3 2 4 2
setup_map neighbors 1 2,3 2 3 3 4
";

    #[test]
    fn builds_map_from_setup_lines() {
        let map = parse_setup(SMALL).unwrap();
        assert_eq!(map.region_count(), 4);
        assert_eq!(map.continent(ContinentId(2)).unwrap().reward, 5);
        assert_eq!(map.region(RegionId(3)).unwrap().continent, ContinentId(2));
        assert!(map.is_neighbor(RegionId(3), RegionId(1)));
        assert!(map.is_neighbor(RegionId(4), RegionId(3)));
        assert!(!map.is_neighbor(RegionId(1), RegionId(4)));
    }

    #[test]
    fn keyword_prefix_is_optional() {
        let map = parse_setup("continents 1 3\nregions 7 1\n").unwrap();
        assert!(map.contains_region(RegionId(7)));
    }

    #[test]
    fn malformed_fragments_are_skipped() {
        let map = parse_setup(
            "continents 1 2 x 4 2\n\
             regions 1 1 2 one 3 1 9\n\
             neighbors 1 z,3\n",
        )
        .unwrap();
        assert!(map.continent(ContinentId(1)).is_ok());
        assert!(map.continent(ContinentId(2)).is_err());
        assert!(map.contains_region(RegionId(1)));
        assert!(map.contains_region(RegionId(3)));
        assert!(!map.contains_region(RegionId(2)));
        assert!(map.is_neighbor(RegionId(1), RegionId(3)));
    }

    #[test]
    fn dangling_references_are_errors() {
        assert_eq!(
            parse_setup("continents 1 2\nregions 1 5\n").unwrap_err(),
            SetupError::Map(MapError::ContinentNotFound(ContinentId(5)))
        );
        assert_eq!(
            parse_setup("continents 1 2\nregions 1 1\nneighbors 1 8\n").unwrap_err(),
            SetupError::Map(MapError::RegionNotFound(RegionId(8)))
        );
        assert!(matches!(
            parse_setup("territories 1 2"),
            Err(SetupError::UnknownLine(_))
        ));
    }

    #[test]
    fn formatted_setup_reads_back() {
        let map = parse_setup(SMALL).unwrap();
        let lines = format_setup(&map);
        assert_eq!(lines[0], "setup_map continents 1 2 2 5");
        assert_eq!(lines[1], "setup_map regions 1 1 2 1 3 2 4 2");
        assert_eq!(lines[2], "setup_map neighbors 1 2,3 2 3 3 4");
        assert_eq!(parse_setup(&lines.join("\n")).unwrap(), map);
    }

    #[test]
    fn pickable_line() {
        let map = parse_setup(SMALL).unwrap();
        let picks = parse_pickable(&map, "pickable_starting_regions 4 1 x 12");
        assert_eq!(picks, vec![RegionId(4), RegionId(1)]);
        assert_eq!(format_pickable(&picks), "pickable_starting_regions 4 1");
    }

    #[test]
    fn map_update_triplets() {
        let updates = parse_map_update("update_map 1 1 3 2 0 2 3 7 4 4 2");
        assert_eq!(
            updates,
            vec![
                RegionUpdate {
                    region: RegionId(1),
                    owner: Owner::Player(Seat::One),
                    armies: 3
                },
                RegionUpdate {
                    region: RegionId(2),
                    owner: Owner::Neutral,
                    armies: 2
                },
            ]
        );
    }

    #[test]
    fn map_update_only_shows_visible_regions() {
        let map = Arc::new(parse_setup(SMALL).unwrap());
        let mut state = GameState::new(
            GameConfig {
                seed: Some(1),
                ..GameConfig::default()
            },
            map,
        )
        .unwrap();
        state.set_region(RegionId(1), Owner::Player(Seat::One), 4).unwrap();
        state.set_region(RegionId(4), Owner::Player(Seat::Two), 3).unwrap();

        assert_eq!(
            format_map_update(&state, Seat::One),
            "update_map 1 1 4 2 0 2 3 0 2"
        );
        assert_eq!(format_map_update(&state, Seat::Two), "update_map 3 0 2 4 2 3");
    }
}
