use std::collections::HashMap;

use serde::Deserialize;

/// A participant in a tournament, either decoded from the club API or
/// reconstructed from the public website.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    pub first_name: String,
    pub last_name: String,
    pub chess_title: String,
    pub display_name: String,
    pub uscf_id: u64,
    pub primary_rating: i32,
    pub secondary_rating: i32,
    pub live_rating: i32,
    pub pairing_number: u32,
    pub current_score: f64,
    #[serde(rename = "currentScoreAfterGame")]
    pub post_round_score: f64,
    pub place_number: u32,

    // true when the website shows this player mid-round without a recorded
    // game result; API-decoded and synthesized players always count as
    // having a result
    #[serde(skip)]
    pub(crate) pending_result: bool,
}

impl Player {
    /// Whether a game result has been recorded for this player in the
    /// current round. `post_round_score` only advances past `current_score`
    /// when this is true.
    pub fn has_result(&self) -> bool {
        !self.pending_result
    }
}

/// A single board pairing, or a bye.
///
/// For byes the white side carries the player and `white_points` holds the
/// awarded points (0.5 for a requested bye, 1.0 for an odd-player bye);
/// `board_number` 0 is reserved for byes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pairing {
    pub white_player: Player,
    pub black_player: Player,
    pub section: String,
    pub round_number: u32,
    pub board_number: u32,
    #[serde(rename = "isByePairing")]
    pub is_bye: bool,
    pub white_points: Option<f64>,
    pub black_points: Option<f64>,
    pub white_result: Option<String>,
    pub black_result: Option<String>,
}

/// The players and current pairings of a specific event.
///
/// Built fresh on every query: decoded from the club API, scraped from the
/// website, or synthesized by the round-1 predictor (`predicted == true`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tournament {
    pub players: Vec<Player>,
    pub current_pairings: Vec<Pairing>,
    #[serde(skip)]
    pub predicted: bool,
}

impl Tournament {
    /// Group the paired players by section label. The black side of a bye
    /// pairing is a placeholder and is not included.
    pub fn players_by_section(&self) -> HashMap<String, Vec<Player>> {
        let mut sections: HashMap<String, Vec<Player>> = HashMap::new();
        for pairing in &self.current_pairings {
            let players = sections.entry(pairing.section.clone()).or_default();
            players.push(pairing.white_player.clone());
            if !pairing.is_bye {
                players.push(pairing.black_player.clone());
            }
        }
        sections
    }
}
