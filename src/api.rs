//! Typed client for the club's JSON API.

use log::debug;

use crate::error::{Result, TdError};
use crate::fetch::Fetcher;
use crate::model::{EventDetail, Tournament};
use crate::predict;

const API_BASE: &str = "https://beta.boylstonchess.org/api";

pub fn tournament_url(event_id: i64) -> String {
    format!("{API_BASE}/event/{event_id}/tournament")
}

pub fn event_detail_url(event_id: i64) -> String {
    format!("{API_BASE}/event/{event_id}")
}

/// Fetch detailed event information (including registration entries).
pub fn fetch_event_detail(fetcher: &Fetcher, event_id: i64) -> Result<EventDetail> {
    fetcher.get_json(&event_detail_url(event_id))
}

/// Fetch the players and current pairings of an event from the structured
/// API.
///
/// When the tournament endpoint answers non-200 (typically an event whose
/// pairings the API has not indexed yet), fall back to the event-detail
/// endpoint and synthesize a round-1 tournament from its registration
/// entries. The original status error is returned if that fallback also
/// fails. A structurally empty response (no players and no pairings) is an
/// error, not a success.
pub fn fetch_tournament(fetcher: &Fetcher, event_id: i64) -> Result<Tournament> {
    let tournament: Tournament = match fetcher.get_json(&tournament_url(event_id)) {
        Ok(t) => t,
        Err(status_err @ TdError::HttpStatus { .. }) => {
            debug!("api: no tournament document for event {event_id}, trying event detail");
            match fetch_event_detail(fetcher, event_id) {
                Ok(detail) => return Ok(predict::tournament_from_entries(&detail)),
                Err(_) => return Err(status_err),
            }
        }
        Err(err) => return Err(err),
    };

    if tournament.players.is_empty() && tournament.current_pairings.is_empty() {
        return Err(TdError::EmptyTournament);
    }
    Ok(tournament)
}
