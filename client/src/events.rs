//! Notable match moments, reported to whoever drives feedback (sound, achievements, logs)

use log::{debug, info};
use shared::ClientId;

/// Final score of one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub team_nr: u8,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    /// A ball changed direction sharply enough to be worth a hit sound.
    BallHit { ball: u8, team: u8, x: f32, y: f32 },
    Goal {
        scoring_team: u8,
        receiving_team: u8,
        points: u32,
        own_goal: bool,
        /// The local team conceded through its own hit.
        by_local_team: bool,
        x: f32,
        y: f32,
    },
    /// The local team scored this many goals in a row.
    ScoringCombo(u32),
    /// One ball survived this many paddle hits without a goal.
    LongRally { ball: u8, hits: u32 },
    PowerUpSpawned { x: f32, y: f32, kind: u8 },
    PowerUpTaken { team: u8, packet_type: u8 },
    /// The local team has taken every power-up type at least once.
    AllPowerUpsCollected,
    MatchOver {
        standings: Vec<Standing>,
        local_team: u8,
        local_id: ClientId,
        roster_size: usize,
    },
}

/// Receiver of [`MatchEvent`]s.
pub trait EventSink {
    fn notify(&mut self, event: MatchEvent);
}

impl EventSink for Vec<MatchEvent> {
    fn notify(&mut self, event: MatchEvent) {
        self.push(event);
    }
}

/// Writes events to the log. Used by the headless client.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&mut self, event: MatchEvent) {
        match event {
            MatchEvent::BallHit { ball, team, .. } => debug!("Ball {} hit by team {}", ball, team),
            MatchEvent::Goal {
                scoring_team,
                receiving_team,
                points,
                own_goal,
                ..
            } => info!(
                "{}",
                goal_message(scoring_team, receiving_team, points, own_goal)
            ),
            MatchEvent::ScoringCombo(count) => info!("{} goals in a row!", count),
            MatchEvent::LongRally { ball, hits } => {
                info!("Ball {} survived {} hits", ball, hits)
            }
            MatchEvent::PowerUpSpawned { kind, .. } => debug!("Power-up {} spawned", kind),
            MatchEvent::PowerUpTaken { team, packet_type } => {
                info!("Team {} took power-up {}", team, packet_type)
            }
            MatchEvent::AllPowerUpsCollected => info!("Collected every power-up"),
            MatchEvent::MatchOver {
                standings,
                local_team,
                ..
            } => {
                let place = standings
                    .iter()
                    .position(|s| s.team_nr == local_team)
                    .map(|p| p + 1)
                    .unwrap_or(0);
                info!("Match over, finished #{} of {}", place, standings.len());
                for standing in &standings {
                    info!("  team {}: {}", standing.team_nr, standing.score);
                }
            }
        }
    }
}

/// An own goal pays every team except the one that let the ball through.
fn goal_message(scoring_team: u8, receiving_team: u8, points: u32, own_goal: bool) -> String {
    if own_goal {
        format!(
            "Own goal by team {}, {} points to every other team",
            receiving_team, points
        )
    } else {
        format!(
            "Team {} scored {} against team {}",
            scoring_team, points, receiving_team
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<MatchEvent> = Vec::new();
        sink.notify(MatchEvent::ScoringCombo(10));
        sink.notify(MatchEvent::AllPowerUpsCollected);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0], MatchEvent::ScoringCombo(10));
    }

    #[test]
    fn test_goal_messages() {
        assert_eq!(
            goal_message(1, 1, 4, true),
            "Own goal by team 1, 4 points to every other team"
        );
        assert_eq!(goal_message(0, 2, 3, false), "Team 0 scored 3 against team 2");
    }

    #[test]
    fn test_log_sink_accepts_everything() {
        let mut sink = LogSink;
        sink.notify(MatchEvent::MatchOver {
            standings: vec![Standing {
                team_nr: 0,
                score: 3,
            }],
            local_team: 0,
            local_id: 1,
            roster_size: 1,
        });
    }
}
