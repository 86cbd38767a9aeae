//! Round-1 pairing prediction for events whose pairings are not posted yet.
//!
//! This is a best-effort approximation of the director's eventual pairings:
//! a plain top-half-vs-bottom-half Swiss within each section, with requested
//! byes honored. It makes no attempt to reproduce team, family, or color
//! preference adjustments a director might apply.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{
    rating_base, sorted_section_names, Entry, EventDetail, Pairing, Tournament,
};

/// Build a synthetic tournament from an event's registration entries.
pub fn tournament_from_entries(detail: &EventDetail) -> Tournament {
    Tournament {
        players: detail.entries.iter().map(Entry::to_player).collect(),
        current_pairings: first_round(&detail.entries),
        predicted: true,
    }
}

/// Predict the first-round pairings for the given entries.
///
/// Deterministic given its input order: within each section, ties in rating
/// keep registration order. Boards are numbered sequentially across the
/// whole event in section display order; byes are board 0.
pub fn first_round(entries: &[Entry]) -> Vec<Pairing> {
    let mut by_section: HashMap<&str, Vec<&Entry>> = HashMap::new();
    for entry in entries {
        by_section
            .entry(entry.section_name.as_str())
            .or_default()
            .push(entry);
    }

    let mut pairings = Vec::new();
    let mut next_board = 1u32;
    for name in sorted_section_names(by_section.keys().copied()) {
        pair_section(&by_section[name.as_str()], &mut next_board, &mut pairings);
    }
    pairings
}

fn pair_section(entries: &[&Entry], next_board: &mut u32, out: &mut Vec<Pairing>) {
    let mut requested_byes = Vec::new();
    let mut pool = Vec::new();
    for &entry in entries {
        if round1_bye_requested(&entry.bye_requests) {
            requested_byes.push(entry);
        } else {
            pool.push(entry);
        }
    }
    pool.sort_by_key(|e| std::cmp::Reverse(rating_base(&e.primary_rating)));

    // an odd player count sends the lowest-rated player to a full-point bye
    let odd_bye = if pool.len() % 2 == 1 { pool.pop() } else { None };

    // Pair rank 1 vs rank n/2+1, rank 2 vs rank n/2+2, and so on. White
    // alternates between the halves by board, starting with the bottom-half
    // player on the first board; boards read bottom-to-top on the wall, so
    // this keeps the top seed from getting white in every section.
    let mut top_gets_white = false;
    while pool.len() >= 2 {
        let opponent = pool.remove(pool.len() / 2);
        let top = pool.remove(0);
        let (white, black) = if top_gets_white {
            (top, opponent)
        } else {
            (opponent, top)
        };
        out.push(Pairing {
            white_player: white.to_player(),
            black_player: black.to_player(),
            section: white.section_name.clone(),
            round_number: 1,
            board_number: *next_board,
            ..Pairing::default()
        });
        *next_board += 1;
        top_gets_white = !top_gets_white;
    }

    for entry in requested_byes {
        out.push(bye_pairing(entry, 0.5));
    }
    if let Some(entry) = odd_bye {
        out.push(bye_pairing(entry, 1.0));
    }
}

fn bye_pairing(entry: &Entry, points: f64) -> Pairing {
    Pairing {
        white_player: entry.to_player(),
        section: entry.section_name.clone(),
        round_number: 1,
        board_number: 0,
        is_bye: true,
        white_points: Some(points),
        ..Pairing::default()
    }
}

/// Recognize a round-1 bye in a free-text bye-request field: a bare "1",
/// or a round keyword followed by a delimited number list containing 1
/// ("round 1,5", "rnds 1&4").
pub(crate) fn round1_bye_requested(requests: &str) -> bool {
    lazy_static! {
        static ref BARE_NUMBER: Regex = Regex::new(r"^\d+$").unwrap();
        static ref ROUND_LIST: Regex =
            Regex::new(r"(?i)\b(?:round|rnd|rounds|rnds)\b[\s:]*(\d+(?:\s*[,&;/]\s*\d+)*)")
                .unwrap();
        static ref NUMBER: Regex = Regex::new(r"\d+").unwrap();
    }

    let trimmed = requests.trim();
    if trimmed.is_empty() {
        return false;
    }
    if BARE_NUMBER.is_match(trimmed) {
        return trimmed.parse::<u32>().map_or(false, |n| n == 1);
    }
    if let Some(caps) = ROUND_LIST.captures(trimmed) {
        return NUMBER
            .find_iter(&caps[1])
            .any(|m| m.as_str().parse::<u32>().map_or(false, |n| n == 1));
    }
    false
}
