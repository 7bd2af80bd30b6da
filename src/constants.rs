//! Constants for Dota 2 match records and the normalized dataset.
//!
//! Slot bit layout, admission defaults and output column names live here so
//! the filter, the loader and the CLI agree on them.

/// Number of hero slots in a normalized record (5 Radiant + 5 Dire)
pub const HERO_SLOTS: usize = 10;

/// Players per team
pub const TEAM_SIZE: usize = 5;

/// Matches must have exactly this many human players to be admitted
pub const REQUIRED_HUMAN_PLAYERS: i64 = 10;

/// Player slot bit layout
pub mod player_slot {
    /// High bit set means the player is on the Dire team
    pub const DIRE_FLAG: u8 = 0b1000_0000;
    /// Low three bits carry the in-team index
    pub const TEAM_INDEX_MASK: u8 = 0b0000_0111;
    /// Offset added to the in-team index for Dire players
    pub const DIRE_OFFSET: usize = 5;
}

/// Default admission settings
pub mod defaults {
    /// Default number of matches to collect
    pub const TARGET_COUNT: usize = 10_000;
    /// All Draft
    pub const GAME_MODE: i64 = 22;
    /// Ranked matchmaking
    pub const LOBBY_TYPE: i64 = 7;
    /// Early-game advantage series sampled into scalar features
    pub const FEATURES: &[&str] = &["radiant_xp_adv", "radiant_gold_adv"];
    /// Output file name used when no output path is given
    pub const OUTPUT_FILENAME: &str = "matches_data.jsonl";
}

/// Label column name in both the raw and the normalized record
pub const LABEL_COLUMN: &str = "radiant_win";

/// Prefix of the hero slot columns
pub const HERO_COLUMN_PREFIX: &str = "hero";

/// Column name for a canonical hero slot
pub fn hero_column(position: usize) -> String {
    format!("{}{}", HERO_COLUMN_PREFIX, position)
}

/// All hero slot column names in canonical order
pub fn hero_columns() -> Vec<String> {
    (0..HERO_SLOTS).map(hero_column).collect()
}

/// Check if a column name is one of the hero slot columns
pub fn is_hero_column(column_name: &str) -> bool {
    column_name
        .strip_prefix(HERO_COLUMN_PREFIX)
        .and_then(|index| index.parse::<usize>().ok())
        .is_some_and(|index| index < HERO_SLOTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_columns() {
        let columns = hero_columns();
        assert_eq!(columns.len(), HERO_SLOTS);
        assert_eq!(columns[0], "hero0");
        assert_eq!(columns[9], "hero9");
    }

    #[test]
    fn test_hero_column_detection() {
        assert!(is_hero_column("hero0"));
        assert!(is_hero_column("hero9"));
        assert!(!is_hero_column("hero10"));
        assert!(!is_hero_column("hero"));
        assert!(!is_hero_column("radiant_gold_adv"));
        assert!(!is_hero_column(LABEL_COLUMN));
    }
}
