//! A bot's picture of the match.
//!
//! Bots never see the referee's `GameState`. They rebuild the map from the
//! setup stream and learn about owners and armies only through `update_map`
//! lines, which cover the regions they can currently see. Regions that drop
//! out of sight keep their last reported state.

use std::collections::BTreeMap;

use crate::board::map::{MapGraph, RegionId};
use crate::board::player::{Owner, Seat};
use crate::board::state::{RegionState, NEUTRAL_ARMIES};
use crate::protocol::setup::{
    apply_setup_line, parse_map_update, parse_pickable, RegionUpdate, SetupError,
    PICKABLE_STARTING_REGIONS, SETUP_MAP, UPDATE_MAP,
};

#[derive(Debug, Clone, Default)]
pub struct BotView {
    map: MapGraph,
    regions: BTreeMap<RegionId, RegionState>,
    me: Option<Seat>,
    pickable: Vec<RegionId>,
    starting_armies: u32,
    updates: u32,
}

impl BotView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line from the setup or update stream. Lines this view does
    /// not track are ignored.
    pub fn handle_line(&mut self, line: &str) -> Result<(), SetupError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [SETUP_MAP, ..] => apply_setup_line(&mut self.map, line)?,
            [PICKABLE_STARTING_REGIONS, ..] => {
                self.pickable = parse_pickable(&self.map, line);
            }
            [UPDATE_MAP, ..] => {
                self.apply_update(&parse_map_update(line));
                self.updates += 1;
            }
            ["settings", "your_player_number", n] => {
                match n.parse().ok().and_then(Seat::from_number) {
                    Some(seat) => self.me = Some(seat),
                    None => log::warn!("bad player number '{}'", n),
                }
            }
            ["settings", "starting_armies", n] => match n.parse() {
                Ok(armies) => self.starting_armies = armies,
                Err(_) => log::warn!("bad army count '{}'", n),
            },
            _ => log::debug!("view ignores '{}'", line.trim()),
        }
        Ok(())
    }

    /// Overwrites the reported regions. Regions unknown to the map are
    /// logged and skipped.
    pub fn apply_update(&mut self, updates: &[RegionUpdate]) {
        for u in updates {
            if !self.map.contains_region(u.region) {
                log::warn!("{}: unknown region {}", UPDATE_MAP, u.region);
                continue;
            }
            self.regions.insert(
                u.region,
                RegionState {
                    owner: u.owner,
                    armies: u.armies,
                },
            );
        }
    }

    pub fn map(&self) -> &MapGraph {
        &self.map
    }

    /// The seat this view belongs to, once the referee has said so.
    pub fn me(&self) -> Option<Seat> {
        self.me
    }

    pub fn set_me(&mut self, seat: Seat) {
        self.me = Some(seat);
    }

    pub fn pickable(&self) -> &[RegionId] {
        &self.pickable
    }

    /// Armies to place this round, as last announced.
    pub fn starting_armies(&self) -> u32 {
        self.starting_armies
    }

    /// Number of map updates received so far.
    pub fn updates_seen(&self) -> u32 {
        self.updates
    }

    /// Last known state of a region. Regions never reported are assumed
    /// neutral with the default garrison.
    pub fn region(&self, id: RegionId) -> RegionState {
        self.regions.get(&id).copied().unwrap_or(RegionState {
            owner: Owner::Neutral,
            armies: NEUTRAL_ARMIES,
        })
    }

    /// Regions last reported as held by this view's seat.
    pub fn my_regions(&self) -> Vec<RegionId> {
        let Some(me) = self.me else {
            return Vec::new();
        };
        self.regions
            .iter()
            .filter(|(_, s)| s.owner == Owner::Player(me))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Neighbors of `region` not held by this view's seat.
    pub fn foreign_neighbors(&self, region: RegionId) -> Vec<RegionId> {
        let Ok(r) = self.map.region(region) else {
            return Vec::new();
        };
        let mine = self.me.map(Owner::Player);
        r.neighbors()
            .filter(|n| Some(self.region(*n).owner) != mine)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> BotView {
        let mut view = BotView::new();
        for line in [
            "setup_map continents 1 2 2 3",
            "setup_map regions 1 1 2 1 3 2",
            "setup_map neighbors 1 2 2 3",
            "settings your_player_number 2",
        ] {
            view.handle_line(line).unwrap();
        }
        view
    }

    #[test]
    fn setup_stream_builds_the_map() {
        let view = view();
        assert_eq!(view.map().region_count(), 3);
        assert!(view.map().is_neighbor(RegionId(2), RegionId(3)));
        assert_eq!(view.me(), Some(Seat::Two));
    }

    #[test]
    fn settings_lines() {
        let mut view = view();
        view.handle_line("settings starting_armies 7").unwrap();
        view.handle_line("settings starting_armies lots").unwrap();
        view.handle_line("settings your_player_number 3").unwrap();
        assert_eq!(view.starting_armies(), 7);
        assert_eq!(view.me(), Some(Seat::Two));
    }

    #[test]
    fn pickable_regions_are_tracked() {
        let mut view = view();
        view.handle_line("pickable_starting_regions 3 1 8").unwrap();
        assert_eq!(view.pickable(), &[RegionId(3), RegionId(1)]);
    }

    #[test]
    fn updates_overwrite_and_keep_stale_regions() {
        let mut view = view();
        view.handle_line("update_map 2 2 4 3 1 5").unwrap();
        assert_eq!(view.my_regions(), vec![RegionId(2)]);
        assert_eq!(view.region(RegionId(3)).owner, Owner::Player(Seat::One));
        assert_eq!(view.region(RegionId(1)).armies, NEUTRAL_ARMIES);

        view.handle_line("update_map 2 2 6").unwrap();
        assert_eq!(view.region(RegionId(2)).armies, 6);
        assert_eq!(view.region(RegionId(3)).armies, 5);
        assert_eq!(view.updates_seen(), 2);
    }

    #[test]
    fn foreign_neighbors_exclude_own_regions() {
        let mut view = view();
        view.handle_line("update_map 1 2 3 2 2 4 3 1 5").unwrap();
        assert_eq!(view.foreign_neighbors(RegionId(2)), vec![RegionId(3)]);
        assert_eq!(view.foreign_neighbors(RegionId(1)), Vec::<RegionId>::new());
    }

    #[test]
    fn bad_setup_reference_is_an_error() {
        let mut view = view();
        assert!(view.handle_line("setup_map regions 9 7").is_err());
    }
}
