use crate::events::Standing;
use log::warn;

/// Goals in a row by the local team that count as a combo.
pub const COMBO_MILESTONE: u32 = 10;
pub const POWERUP_BONUS_POINTS: u32 = 10;

/// Result of [`Scoreboard::record_goal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalOutcome {
    pub own_goal: bool,
    /// The local team's scoring streak just reached [`COMBO_MILESTONE`].
    pub combo_milestone: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    scores: Vec<u32>,
    local_team: u8,
    scoring_combo: u32,
}

impl Scoreboard {
    pub fn new(team_count: u8, local_team: u8) -> Self {
        Self {
            scores: vec![0; team_count as usize],
            local_team,
            scoring_combo: 0,
        }
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn score(&self, team: u8) -> u32 {
        self.scores.get(team as usize).copied().unwrap_or(0)
    }

    pub fn scoring_combo(&self) -> u32 {
        self.scoring_combo
    }

    /// Credits a goal worth `rallies` points.
    ///
    /// An own goal (the hitting team let the ball through its own arc) pays every
    /// other team instead.
    pub fn record_goal(&mut self, hit_team: u8, receiving_team: u8, rallies: u8) -> GoalOutcome {
        let points = rallies as u32;
        let own_goal = hit_team == receiving_team;
        let mut combo_milestone = false;

        if own_goal {
            for (team, score) in self.scores.iter_mut().enumerate() {
                if team != hit_team as usize {
                    *score += points;
                }
            }
        } else {
            self.add_points(hit_team, points);

            if hit_team == self.local_team {
                self.scoring_combo += 1;
                combo_milestone = self.scoring_combo == COMBO_MILESTONE;
            } else if receiving_team == self.local_team {
                self.scoring_combo = 0;
            }
        }

        GoalOutcome {
            own_goal,
            combo_milestone,
        }
    }

    pub fn add_points(&mut self, team: u8, points: u32) {
        match self.scores.get_mut(team as usize) {
            Some(score) => *score += points,
            None => warn!("Points for unknown team {} dropped", team),
        }
    }

    /// Teams by descending score; ties keep team order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .scores
            .iter()
            .enumerate()
            .map(|(team_nr, &score)| Standing {
                team_nr: team_nr as u8,
                score,
            })
            .collect();
        standings.sort_by(|a, b| b.score.cmp(&a.score));
        standings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_credits_hitting_team() {
        let mut board = Scoreboard::new(3, 0);
        let outcome = board.record_goal(1, 2, 4);
        assert!(!outcome.own_goal);
        assert_eq!(board.scores(), &[0, 4, 0]);
    }

    #[test]
    fn test_own_goal_credits_everyone_else() {
        let mut board = Scoreboard::new(3, 0);
        let outcome = board.record_goal(1, 1, 2);
        assert!(outcome.own_goal);
        assert_eq!(board.scores(), &[2, 0, 2]);
    }

    #[test]
    fn test_combo_milestone_and_reset() {
        let mut board = Scoreboard::new(2, 0);
        for _ in 0..9 {
            assert!(!board.record_goal(0, 1, 1).combo_milestone);
        }
        assert!(board.record_goal(0, 1, 1).combo_milestone);
        assert!(!board.record_goal(0, 1, 1).combo_milestone);

        board.record_goal(1, 0, 1);
        assert_eq!(board.scoring_combo(), 0);
    }

    #[test]
    fn test_unknown_team_is_ignored() {
        let mut board = Scoreboard::new(2, 0);
        board.add_points(7, 10);
        assert_eq!(board.scores(), &[0, 0]);
        assert_eq!(board.score(7), 0);
    }

    #[test]
    fn test_standings_sorted_and_stable() {
        let mut board = Scoreboard::new(3, 0);
        board.add_points(1, 5);
        board.add_points(2, 5);
        let teams: Vec<u8> = board.standings().iter().map(|s| s.team_nr).collect();
        assert_eq!(teams, vec![1, 2, 0]);
    }
}
