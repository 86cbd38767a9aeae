//! Federation member lookups via the US Chess ratings API.

use log::debug;
use serde::Deserialize;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::{normalize_name, UNRATED};

pub type MemberId = u64;

const RATINGS_API_BASE: &str = "https://ratings-api.uschess.org/api/v1";

/// A USCF member's current ratings and event history summary.
#[derive(Debug, Clone)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
    /// Rating strings per system; `<unrated>` when the member has no
    /// established rating in that system. A provisional rating carries its
    /// game count as a "P" suffix.
    pub regular_rating: String,
    pub quick_rating: String,
    pub blitz_rating: String,
    pub total_events: u32,
    pub recent_events: Vec<EventSummary>,
}

#[derive(Debug, Clone)]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub end_date: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProfileResponse {
    first_name: String,
    last_name: String,
    ratings: Vec<ProfileRating>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProfileRating {
    rating: i32,
    rating_system: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EventsResponse {
    items: Vec<EventItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EventItem {
    id: String,
    name: String,
    end_date: String,
}

pub fn member_url(member_id: MemberId) -> String {
    format!("{RATINGS_API_BASE}/members/{member_id}")
}

pub fn member_events_url(member_id: MemberId) -> String {
    format!("{RATINGS_API_BASE}/members/{member_id}/events")
}

/// Fetch a member's profile and event history.
pub fn fetch_member(fetcher: &Fetcher, member_id: MemberId) -> Result<Member> {
    let profile: ProfileResponse = fetcher.get_json(&member_url(member_id))?;
    let events: EventsResponse = fetcher.get_json(&member_events_url(member_id))?;
    Ok(build_member(member_id, profile, events))
}

fn build_member(member_id: MemberId, profile: ProfileResponse, events: EventsResponse) -> Member {
    let mut member = Member {
        member_id,
        name: normalize_name(&format!("{} {}", profile.first_name, profile.last_name)),
        regular_rating: UNRATED.to_string(),
        quick_rating: UNRATED.to_string(),
        blitz_rating: UNRATED.to_string(),
        total_events: events.items.len() as u32,
        recent_events: Vec::new(),
    };

    for rating in &profile.ratings {
        // rating 0 means no established rating in that system
        if rating.rating == 0 {
            continue;
        }
        let value = rating.rating.to_string();
        match rating.rating_system.as_str() {
            "R" => member.regular_rating = value,
            "Q" => member.quick_rating = value,
            "B" => member.blitz_rating = value,
            other => debug!("members: ignoring rating system {other:?}"),
        }
    }

    member.recent_events = events
        .items
        .into_iter()
        .map(|item| EventSummary {
            id: item.id.parse().unwrap_or(0),
            name: item.name,
            end_date: item.end_date,
        })
        .collect();
    // end dates are ISO-8601, so lexicographic order is chronological
    member
        .recent_events
        .sort_by(|a, b| b.end_date.cmp(&a.end_date));

    member
}
