//! Physical layout of the printed score sheet.
//!
//! The sheet has no usable headers, so which rows hold what is fixed here.
//! Row indices are data-row indices (0 is the row under the header).

use std::ops::RangeInclusive;

/// Which of the two teams on the sheet a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Report,
    TeamResult(Side),
    PlayerStat(Side),
    Ignore,
}

#[derive(Debug, Clone)]
pub struct RowRule {
    pub rows: RangeInclusive<usize>,
    pub action: RowAction,
}

pub const MATCH_SHEET: &[RowRule] = &[
    RowRule {
        rows: 0..=0,
        action: RowAction::Report,
    },
    RowRule {
        rows: 2..=2,
        action: RowAction::TeamResult(Side::Home),
    },
    RowRule {
        rows: 6..=17,
        action: RowAction::PlayerStat(Side::Home),
    },
    // team totals
    RowRule {
        rows: 18..=18,
        action: RowAction::Ignore,
    },
    RowRule {
        rows: 20..=20,
        action: RowAction::TeamResult(Side::Away),
    },
    RowRule {
        rows: 24..=35,
        action: RowAction::PlayerStat(Side::Away),
    },
];

/// Action for a data row; rows outside every rule are ignored.
pub fn action_for(index: usize) -> RowAction {
    MATCH_SHEET
        .iter()
        .find(|rule| rule.rows.contains(&index))
        .map(|rule| rule.action)
        .unwrap_or(RowAction::Ignore)
}

/// Column positions, counted from column A.
pub mod columns {
    pub const REPORT: usize = 17;

    pub const TEAM: usize = 3;
    pub const RESULT: usize = 12;

    pub const BACKNUMBER: usize = 1;
    pub const PLAYER: usize = 2;
    pub const OFFENSE_REBOUND: usize = 3;
    pub const DEFENSE_REBOUND: usize = 4;
    pub const TOTAL_REBOUND: usize = 5;
    pub const ASSIST: usize = 6;
    pub const STEAL: usize = 7;
    pub const BLOCK: usize = 8;
    pub const SCORE_1Q: usize = 9;
    pub const SCORE_2Q: usize = 10;
    pub const SCORE_3Q: usize = 11;
    pub const SCORE_4Q: usize = 12;
    pub const SCORE_OT: usize = 13;
    pub const SCORE_TOTAL: usize = 14;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_row() {
        assert_eq!(action_for(0), RowAction::Report);
        assert_eq!(action_for(1), RowAction::Ignore);
    }

    #[test]
    fn home_team_rows() {
        assert_eq!(action_for(2), RowAction::TeamResult(Side::Home));
        for index in 3..=5 {
            assert_eq!(action_for(index), RowAction::Ignore, "row {index}");
        }
        for index in 6..=17 {
            assert_eq!(action_for(index), RowAction::PlayerStat(Side::Home), "row {index}");
        }
        assert_eq!(action_for(18), RowAction::Ignore);
        assert_eq!(action_for(19), RowAction::Ignore);
    }

    #[test]
    fn away_team_rows() {
        assert_eq!(action_for(20), RowAction::TeamResult(Side::Away));
        for index in 21..=23 {
            assert_eq!(action_for(index), RowAction::Ignore, "row {index}");
        }
        for index in 24..=35 {
            assert_eq!(action_for(index), RowAction::PlayerStat(Side::Away), "row {index}");
        }
    }

    #[test]
    fn rows_past_the_sheet_are_ignored() {
        assert_eq!(action_for(36), RowAction::Ignore);
        assert_eq!(action_for(1000), RowAction::Ignore);
    }

    #[test]
    fn rules_do_not_overlap() {
        for (i, a) in MATCH_SHEET.iter().enumerate() {
            for b in &MATCH_SHEET[i + 1..] {
                assert!(
                    a.rows.end() < b.rows.start(),
                    "{:?} overlaps {:?}",
                    a.rows,
                    b.rows
                );
            }
        }
    }

    #[test]
    fn player_capacity_is_twelve_per_team() {
        let capacity = |side| {
            MATCH_SHEET
                .iter()
                .filter(|rule| rule.action == RowAction::PlayerStat(side))
                .map(|rule| rule.rows.clone().count())
                .sum::<usize>()
        };
        assert_eq!(capacity(Side::Home), 12);
        assert_eq!(capacity(Side::Away), 12);
    }
}
