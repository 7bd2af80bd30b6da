//! Player slot decoding.
//!
//! A player slot packs the team into the high bit and the in-team index
//! into the low three bits: Radiant slots are 0..=4, Dire slots 128..=132.

use crate::constants::{TEAM_SIZE, player_slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Radiant,
    Dire,
}

/// Team and in-team index carried by a player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPosition {
    pub team: Team,
    pub team_index: u8,
}

impl SlotPosition {
    pub fn decode(slot: u8) -> Self {
        let team = if slot & player_slot::DIRE_FLAG != 0 {
            Team::Dire
        } else {
            Team::Radiant
        };
        Self {
            team,
            team_index: slot & player_slot::TEAM_INDEX_MASK,
        }
    }

    /// Canonical hero column 0..=9, or `None` if the in-team index is out of range
    pub fn canonical(&self) -> Option<usize> {
        let index = usize::from(self.team_index);
        if index >= TEAM_SIZE {
            return None;
        }
        Some(match self.team {
            Team::Radiant => index,
            Team::Dire => index + player_slot::DIRE_OFFSET,
        })
    }
}

/// Decode a player slot straight to its canonical hero column
pub fn canonical_position(slot: u8) -> Option<usize> {
    SlotPosition::decode(slot).canonical()
}
