use indexmap::IndexMap;

use crate::dao::models::PlayerEntity;

/// Sequential identifier assigned when teams are drawn.
pub type TeamId = u32;

/// A team formed from the roster, with its in-memory score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Position of the team in the draw, starting at 1.
    pub id: TeamId,
    /// Team name as stored.
    pub name: String,
    /// Members in the order the store returned them.
    pub members: Vec<String>,
    /// Running score, never written back to the store.
    pub score: i32,
}

impl Team {
    /// Add `delta` points and return the new score.
    pub fn add_points(&mut self, delta: i32) -> i32 {
        self.score = self.score.saturating_add(delta);
        self.score
    }
}

/// Group player rows by team name.
///
/// Groups keep the order in which each team name first appears, members keep row order, and
/// rows without a team name fall into a single group called `unassigned`.
pub fn group_into_teams(
    rows: impl IntoIterator<Item = PlayerEntity>,
    unassigned: &str,
) -> Vec<Team> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for row in rows {
        let name = if row.team_name.trim().is_empty() {
            unassigned.to_string()
        } else {
            row.team_name
        };
        groups.entry(name).or_default().push(row.player);
    }

    groups
        .into_iter()
        .zip(1..)
        .map(|((name, members), id)| Team {
            id,
            name,
            members,
            score: 0,
        })
        .collect()
}
