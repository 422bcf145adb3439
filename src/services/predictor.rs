use serde_json::Value;

use crate::models::{FootballMatch, TeamData};

/// Everything the rule-based model looks at for one fixture.
pub struct PredictionInputs<'a> {
    pub team_a: &'a TeamData,
    pub team_b: &'a TeamData,
    /// Echoed to the caller; the rules do not rank by table position.
    pub standings: &'a Value,
    pub head_to_head: &'a [FootballMatch],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Basis {
    HeadToHead,
    Form,
    Level,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    /// Name of the favoured side, `None` for a draw.
    pub favourite: Option<String>,
    pub basis: Basis,
    pub text: String,
    pub confidence_score: i32,
}

#[derive(Default)]
pub struct PredictionEngine;

impl PredictionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rules, first match wins:
    /// 1. last head-to-head meeting had a winner → that side, +1
    /// 2. better recent form → that side, +2
    /// 3. otherwise a draw
    ///
    /// A drawn head-to-head falls through to form and keeps its confidence.
    pub fn predict(&self, inputs: &PredictionInputs<'_>) -> Prediction {
        let mut confidence_score = 0;

        if let Some(last) = inputs.head_to_head.first() {
            if let Some((home, away)) = last.full_time() {
                let winner = if home > away {
                    Some(&last.home_team)
                } else if away > home {
                    Some(&last.away_team)
                } else {
                    None
                };

                if let Some(winner) = winner {
                    confidence_score += 1;
                    let name = winner.name.clone().unwrap_or_default();
                    return Prediction {
                        text: format!("{} has a slight advantage based on recent encounters!", name),
                        favourite: Some(name),
                        basis: Basis::HeadToHead,
                        confidence_score,
                    };
                }
            }
        }

        let form_a = calculate_form(inputs.team_a.id, &inputs.team_a.matches);
        let form_b = calculate_form(inputs.team_b.id, &inputs.team_b.matches);
        tracing::debug!(
            "Form: {} = {}, {} = {} ({} standings tables)",
            inputs.team_a.name,
            form_a,
            inputs.team_b.name,
            form_b,
            inputs.standings.as_array().map_or(0, Vec::len)
        );

        let favourite = match form_a.cmp(&form_b) {
            std::cmp::Ordering::Greater => inputs.team_a,
            std::cmp::Ordering::Less => inputs.team_b,
            std::cmp::Ordering::Equal => {
                return Prediction {
                    favourite: None,
                    basis: Basis::Level,
                    text: "It's going to be a close game, likely a draw!".to_string(),
                    confidence_score,
                };
            }
        };

        confidence_score += 2;
        Prediction {
            favourite: Some(favourite.name.clone()),
            basis: Basis::Form,
            text: format!("{} is more likely to win based on current form!", favourite.name),
            confidence_score,
        }
    }
}

/// 3 points per win by `team_id` (home or away), 1 per draw.
/// Matches without a full-time score are skipped.
pub fn calculate_form(team_id: u32, matches: &[FootballMatch]) -> u32 {
    matches
        .iter()
        .filter_map(|m| m.full_time().map(|score| (m, score)))
        .map(|(m, (home, away))| match home.cmp(&away) {
            std::cmp::Ordering::Greater if m.home_team.id == Some(team_id) => 3,
            std::cmp::Ordering::Less if m.away_team.id == Some(team_id) => 3,
            std::cmp::Ordering::Equal => 1,
            _ => 0,
        })
        .sum()
}
