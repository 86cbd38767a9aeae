//! Live tournament acquisition across both sources.
//!
//! The structured API is normally faster and schema-stable; the website
//! scrape is a safety net for events the API has not indexed yet. Both are
//! fetched concurrently on every query and reconciled deterministically.

use std::thread;

use log::warn;

use crate::api;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::Tournament;
use crate::site;

/// Fetch the current state of an event from both the structured API and
/// the public website concurrently and return one tournament. No retries
/// happen at this layer.
pub fn fetch_tournament(fetcher: &Fetcher, event_id: i64) -> Result<Tournament> {
    let (api_result, web_result) = thread::scope(|scope| {
        let api_leg = scope.spawn(|| api::fetch_tournament(fetcher, event_id));
        let web_leg = scope.spawn(|| site::fetch_tournament(fetcher, event_id));
        (
            api_leg.join().expect("api fetch panicked"),
            web_leg.join().expect("website fetch panicked"),
        )
    });
    reconcile(api_result, web_result)
}

/// Fallback policy: the API result wins whenever it is Ok, even if the
/// scrape also succeeded; a successful scrape stands in when the API
/// failed; and when both failed, the API error is the one reported.
fn reconcile(
    api_result: Result<Tournament>,
    web_result: Result<Tournament>,
) -> Result<Tournament> {
    match (api_result, web_result) {
        (Ok(tournament), _) => Ok(tournament),
        (Err(api_err), Ok(tournament)) => {
            warn!("live: api source failed ({api_err}); using website scrape");
            Ok(tournament)
        }
        (Err(api_err), Err(web_err)) => {
            warn!("live: website source also failed: {web_err}");
            Err(api_err)
        }
    }
}
