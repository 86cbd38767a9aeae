use serde::Deserialize;

use super::rating_str::rating_base;
use super::tournament::Player;

/// Detailed information about an event, vended by the club API at
/// `/api/event/<eventId>`. Date fields stay as display strings; nothing
/// downstream computes with them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventDetail {
    pub event_id: i64,
    pub title: String,
    pub date_display: String,
    pub description: String,
    pub sections: Vec<String>,
    pub section_display: String,
    pub entry_fee_summary: String,
    pub prize_summary: String,
    pub event_format: String,
    pub time_control: String,
    pub registration_time: String,
    pub round_times: String,
    pub num_entries: u32,
    pub entries: Vec<Entry>,
}

/// A single pre-tournament registration record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Entry {
    pub first_name: String,
    pub last_name: String,
    pub uscf_id: u64,
    pub chess_title: String,
    pub section_name: String,
    /// Free-text bye requests as typed at registration, e.g. "1" or
    /// "rnds 1&4".
    pub bye_requests: String,
    /// Reported rating strings; may carry a "/games" or "P<games>" suffix.
    pub primary_rating: String,
    pub secondary_rating: String,
}

impl Entry {
    /// Construct an artificial `Player` from this registration entry.
    pub fn to_player(&self) -> Player {
        Player {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            chess_title: self.chess_title.clone(),
            display_name: format!("{} {}", self.first_name, self.last_name),
            uscf_id: self.uscf_id,
            primary_rating: rating_base(&self.primary_rating),
            secondary_rating: rating_base(&self.secondary_rating),
            ..Player::default()
        }
    }
}
