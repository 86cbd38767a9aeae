//! Scraping of the club's public website: the entries page and the
//! pairings page, reconciled into the canonical tournament model.
//!
//! The pairings page renders the same content under one of three heading
//! conventions, so the document is classified once into a layout and a
//! single extraction routine runs over the detected headings. Individual
//! malformed rows are skipped; a missing table is fatal for that parse.

use std::collections::HashMap;
use std::thread;

use log::debug;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, TdError};
use crate::fetch::Fetcher;
use crate::model::{normalize_name, Pairing, Player, Tournament};

const SITE_BASE: &str = "https://boylstonchess.org";

pub fn entries_url(event_id: i64) -> String {
    format!("{SITE_BASE}/tournament/entries/{event_id}")
}

pub fn pairings_url(event_id: i64) -> String {
    format!("{SITE_BASE}/files/event/{event_id}/pairings")
}

/// Fetch both website pages concurrently and parse them into a tournament.
pub fn fetch_tournament(fetcher: &Fetcher, event_id: i64) -> Result<Tournament> {
    let (entries_body, pairings_body) = thread::scope(|scope| {
        let entries = scope.spawn(|| fetcher.get_text(&entries_url(event_id)));
        let pairings = scope.spawn(|| fetcher.get_text(&pairings_url(event_id)));
        (
            entries.join().expect("entries fetch panicked"),
            pairings.join().expect("pairings fetch panicked"),
        )
    });
    parse_tournament(&entries_body?, &pairings_body?)
}

/// Parse the entries page and the pairings page into a tournament.
pub fn parse_tournament(entries_html: &str, pairings_html: &str) -> Result<Tournament> {
    let entries_doc = Html::parse_document(entries_html);
    let pairings_doc = Html::parse_document(pairings_html);

    let mut tournament = Tournament {
        players: parse_players(&entries_doc)?,
        ..Tournament::default()
    };
    parse_pairings(&pairings_doc, &mut tournament)?;
    Ok(tournament)
}

/// Extract players from the entries table.
fn parse_players(doc: &Html) -> Result<Vec<Player>> {
    let table_sel = Selector::parse("table#members").expect("valid selector");
    if doc.select(&table_sel).next().is_none() {
        return Err(TdError::Parse("entries table not found".to_string()));
    }

    let row_sel = Selector::parse("table#members tbody tr").expect("valid selector");
    let cell_sel = Selector::parse("td").expect("valid selector");

    let mut players = Vec::new();
    for row in doc.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
        if cells.len() < 4 {
            debug!("site: skipping short entries row ({} cells)", cells.len());
            continue;
        }
        let mut player = Player {
            pairing_number: cells[0].parse().unwrap_or(0),
            primary_rating: cells[2].parse().unwrap_or(0),
            uscf_id: cells[3].parse().unwrap_or(0),
            ..Player::default()
        };
        apply_display_name(&mut player, normalize_name(&cells[1]));
        players.push(player);
    }

    Ok(players)
}

/// The heading convention a pairings document uses for its sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadingLayout {
    /// One top-level heading, no sub-sections.
    SingleSection,
    /// A top-level heading followed by one h2 per section; the top-level
    /// heading must be skipped to avoid double-counting section zero.
    MultiSection,
    /// h3 headings whose section name is the text after the last colon.
    MalformedH3,
}

fn classify_headings(doc: &Html) -> Result<HeadingLayout> {
    let h2_sel = Selector::parse("div#pairings h2").expect("valid selector");
    let h1_sel = Selector::parse("div#pairings h1").expect("valid selector");
    let h3_sel = Selector::parse("h3").expect("valid selector");

    if doc.select(&h2_sel).next().is_some() {
        return Ok(HeadingLayout::MultiSection);
    }
    if doc.select(&h1_sel).next().is_some() {
        return Ok(HeadingLayout::SingleSection);
    }
    if doc
        .select(&h3_sel)
        .any(|h| element_text(h).starts_with("Pairings"))
    {
        return Ok(HeadingLayout::MalformedH3);
    }
    Err(TdError::Parse("no pairings headings found".to_string()))
}

/// Classify the document and return one (section name, heading) pair per
/// detected section heading.
fn section_headings(doc: &Html) -> Result<Vec<(String, ElementRef<'_>)>> {
    let layout = classify_headings(doc)?;
    let headings = match layout {
        HeadingLayout::MultiSection => {
            let sel = Selector::parse("div#pairings h2").expect("valid selector");
            doc.select(&sel)
                .map(|h| (section_from_h2(h), h))
                .collect()
        }
        HeadingLayout::SingleSection => {
            let sel = Selector::parse("div#pairings h1").expect("valid selector");
            doc.select(&sel)
                .map(|h| (section_from_h1(h), h))
                .collect()
        }
        HeadingLayout::MalformedH3 => {
            let sel = Selector::parse("h3").expect("valid selector");
            doc.select(&sel)
                .filter_map(|h| {
                    let text = element_text(h);
                    text.starts_with("Pairings")
                        .then(|| (section_from_h3_text(&text), h))
                })
                .collect()
        }
    };
    Ok(headings)
}

fn section_from_h1(heading: ElementRef) -> String {
    let link_sel = Selector::parse("a").expect("valid selector");
    let link_text = heading
        .select(&link_sel)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let raw = if link_text.is_empty() {
        element_text(heading)
    } else {
        link_text
    };
    raw.replace("Pairings", "")
        .trim_matches(&[' ', '–', ':', '\t'][..])
        .to_string()
}

fn section_from_h2(heading: ElementRef) -> String {
    element_text(heading).replace("Section", "").trim().to_string()
}

fn section_from_h3_text(text: &str) -> String {
    match text.rfind(':') {
        Some(idx) if idx + 1 < text.len() => text[idx + 1..].trim().to_string(),
        _ => text.to_string(),
    }
}

/// Extract pairings from the tables following the detected section
/// headings, then run the standings fixup.
fn parse_pairings(doc: &Html, tournament: &mut Tournament) -> Result<()> {
    let mut tables_found = 0;
    for (section, heading) in section_headings(doc)? {
        let Some(table) = next_table_sibling(heading) else {
            debug!("site: no table after pairings heading for section {section:?}");
            continue;
        };
        tables_found += 1;
        parse_pairing_rows(table, &section, &mut tournament.current_pairings);
    }
    if tables_found == 0 {
        return Err(TdError::Parse("no pairings tables found".to_string()));
    }

    fixup_standings(tournament);
    Ok(())
}

/// Find the next `<table>` element sibling, skipping over any non-table
/// siblings in between.
fn next_table_sibling(heading: ElementRef) -> Option<ElementRef> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

fn parse_pairing_rows(table: ElementRef, section: &str, out: &mut Vec<Pairing>) {
    let row_sel = Selector::parse("tr").expect("valid selector");
    for row in table.select(&row_sel) {
        match parse_pairing_row(row, section) {
            Some(pairing) => out.push(pairing),
            None => debug!("site: skipping pairing row in section {section:?}"),
        }
    }
}

/// Parse one table row into a pairing. Returns None for header rows and
/// rows that do not have enough cells.
fn parse_pairing_row(row: ElementRef, section: &str) -> Option<Pairing> {
    let cell_sel = Selector::parse("td").expect("valid selector");
    let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
    if cells.len() < 5 {
        return None;
    }
    if cells[0].eq_ignore_ascii_case("bd") {
        return None;
    }

    let mut white = parse_player_ref(&cells[2]);
    let mut black = parse_player_ref(&cells[4]);
    let white_result = (!cells[1].is_empty()).then(|| cells[1].clone());
    let black_result = (!cells[3].is_empty()).then(|| cells[3].clone());

    // a numeric recorded result advances the post-round score
    if let Some(points) = white_result.as_deref().and_then(|r| r.parse::<f64>().ok()) {
        white.post_round_score = white.current_score + points;
        white.pending_result = false;
    }
    if let Some(points) = black_result.as_deref().and_then(|r| r.parse::<f64>().ok()) {
        black.post_round_score = black.current_score + points;
        black.pending_result = false;
    }

    let mut pairing = Pairing {
        white_player: white,
        black_player: black,
        section: section.to_string(),
        round_number: 0,
        board_number: cells[0].parse().unwrap_or(0),
        white_result,
        black_result,
        ..Pairing::default()
    };

    // normalize byes so the populated side is always white
    let white_is_bye = pairing.white_player.display_name == "BYE";
    let black_is_bye = pairing.black_player.display_name == "BYE";
    if black_is_bye && !white_is_bye {
        pairing.is_bye = true;
        pairing.white_points = Some(bye_points(pairing.white_result.as_deref()));
        pairing.black_player = Player::default();
        pairing.black_result = None;
    } else if white_is_bye && !black_is_bye {
        pairing.is_bye = true;
        pairing.white_points = Some(bye_points(pairing.black_result.as_deref()));
        pairing.white_player = std::mem::take(&mut pairing.black_player);
        pairing.white_result = pairing.black_result.take();
    }

    Some(pairing)
}

fn bye_points(result: Option<&str>) -> f64 {
    let result = result.unwrap_or_default();
    if result.contains('½') {
        return 0.5;
    }
    result.parse().unwrap_or(0.0)
}

/// Extract a player reference from a cell like "12 John Doe (2250 3.0)".
/// An unrated opponent shows as "unr." and keeps rating 0; "BYE" yields
/// the bye marker.
fn parse_player_ref(text: &str) -> Player {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("BYE") {
        return Player {
            display_name: "BYE".to_string(),
            ..Player::default()
        };
    }

    let mut player = Player::default();
    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    if fields.len() < 2 {
        return player;
    }

    let mut name_part = match trimmed.find('(') {
        Some(idx) => trimmed[..idx].trim(),
        None => trimmed,
    };
    if let Ok(number) = fields[0].parse() {
        player.pairing_number = number;
        name_part = name_part
            .strip_prefix(fields[0])
            .unwrap_or(name_part)
            .trim_start();
    }
    apply_display_name(&mut player, normalize_name(name_part));

    // rating and current score live in a trailing parenthesized fragment
    if let (Some(start), Some(end)) = (trimmed.find('('), trimmed.find(')')) {
        if end > start {
            let inside: Vec<&str> = trimmed[start + 1..end].split_whitespace().collect();
            if let Some(&rating) = inside.first() {
                if rating != "unr." {
                    if let Ok(parsed) = rating.parse() {
                        player.primary_rating = parsed;
                    }
                }
            }
            if inside.len() >= 2 {
                if let Ok(score) = inside[1].parse::<f64>() {
                    player.current_score = score;
                    player.post_round_score = score;
                    player.pending_result = true;
                }
            }
        }
    }

    player
}

fn apply_display_name(player: &mut Player, display_name: String) {
    let words: Vec<&str> = display_name.split_whitespace().collect();
    if let Some(&first) = words.first() {
        player.first_name = first.to_string();
    }
    if words.len() > 1 {
        player.last_name = words[words.len() - 1].to_string();
    }
    player.display_name = display_name;
}

/// Infer round number and per-section placement, neither of which the
/// website supplies directly.
///
/// If any player has no recorded result yet (mid-round fetch), every
/// post-round score is held at the pre-round score so standings reflect the
/// state prior to the round in progress. Rank is a stable per-section sort
/// by post-round score descending, written back into the pairings. The
/// round number is `round(max post-round score) + 1`.
pub(crate) fn fixup_standings(tournament: &mut Tournament) {
    let mid_round = tournament.current_pairings.iter().any(|p| {
        !p.white_player.has_result() || (!p.is_bye && !p.black_player.has_result())
    });
    if mid_round {
        for pairing in &mut tournament.current_pairings {
            if !pairing.is_bye && pairing.black_player.has_result() {
                pairing.black_player.post_round_score = pairing.black_player.current_score;
            }
            if pairing.white_player.has_result() {
                pairing.white_player.post_round_score = pairing.white_player.current_score;
            }
        }
    }

    #[derive(Clone, Copy)]
    enum Side {
        White,
        Black,
    }
    let mut sections: HashMap<String, Vec<(usize, Side, f64)>> = HashMap::new();
    for (idx, pairing) in tournament.current_pairings.iter().enumerate() {
        let standings = sections.entry(pairing.section.clone()).or_default();
        standings.push((idx, Side::White, pairing.white_player.post_round_score));
        if !pairing.is_bye {
            standings.push((idx, Side::Black, pairing.black_player.post_round_score));
        }
    }

    let mut max_score = 0.0f64;
    for standings in sections.values_mut() {
        standings.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(&(_, _, top)) = standings.first() {
            if top > max_score {
                max_score = top;
            }
        }
        for (rank, &(idx, side, _)) in standings.iter().enumerate() {
            let pairing = &mut tournament.current_pairings[idx];
            let player = match side {
                Side::White => &mut pairing.white_player,
                Side::Black => &mut pairing.black_player,
            };
            player.place_number = (rank + 1) as u32;
        }
    }

    let round_number = max_score.round() as u32 + 1;
    for pairing in &mut tournament.current_pairings {
        pairing.round_number = round_number;
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRIES_HTML: &str = r#"
        <html><body>
        <table id="members">
          <thead><tr><th>#</th><th>Name</th><th>Rating</th><th>ID</th></tr></thead>
          <tbody>
            <tr><td>1</td><td>JOHN DOE</td><td>2250</td><td>12345678</td></tr>
            <tr><td>2</td><td>jane roe</td><td>2100</td><td>87654321</td></tr>
            <tr><td>garbage</td></tr>
          </tbody>
        </table>
        </body></html>"#;

    const SINGLE_SECTION_HTML: &str = r#"
        <html><body><div id="pairings">
        <h1><a href="/files/event/1358/pairings">Open Pairings</a></h1>
        <p>posted at 7pm</p>
        <table>
          <tr><td>Bd</td><td>Res</td><td>White</td><td>Res</td><td>Black</td></tr>
          <tr><td>1</td><td>1</td><td>12 John Doe (2250 3.0)</td><td>0</td><td>5 Jane Roe (2100 3.0)</td></tr>
          <tr><td>2</td><td></td><td>3 Alice Ann (1900 2.5)</td><td></td><td>4 Bob Cob (unr. 2.0)</td></tr>
          <tr><td>0</td><td>1</td><td>9 Carl Carp (1800 2.0)</td><td></td><td>BYE</td></tr>
        </table>
        </div></body></html>"#;

    const MULTI_SECTION_HTML: &str = r#"
        <html><body><div id="pairings">
        <h1>Pairings – Summer Swiss</h1>
        <table>
          <tr><td>9</td><td></td><td>1 Not Counted (1500 1.0)</td><td></td><td>2 Also Not (1400 1.0)</td></tr>
        </table>
        <h2>Open Section</h2>
        <table>
          <tr><td>1</td><td>1</td><td>1 Aa Bb (2000 1.0)</td><td>0</td><td>2 Cc Dd (1900 1.0)</td></tr>
        </table>
        <h2>U1600 Section</h2>
        <p>one more note</p>
        <table>
          <tr><td>2</td><td>0</td><td>3 Ee Ff (1500 1.0)</td><td>1</td><td>4 Gg Hh (1400 1.0)</td></tr>
        </table>
        </div></body></html>"#;

    const MALFORMED_H3_HTML: &str = r#"
        <html><body>
        <h3>Pairings for Summer Swiss: U1200</h3>
        <table>
          <tr><td>1</td><td></td><td>1 Aa Bb (1100 0.0)</td><td></td><td>2 Cc Dd (1000 0.0)</td></tr>
        </table>
        </body></html>"#;

    #[test]
    fn test_parse_players() {
        let doc = Html::parse_document(ENTRIES_HTML);
        let players = parse_players(&doc).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].display_name, "John Doe");
        assert_eq!(players[0].first_name, "John");
        assert_eq!(players[0].last_name, "Doe");
        assert_eq!(players[0].pairing_number, 1);
        assert_eq!(players[0].primary_rating, 2250);
        assert_eq!(players[0].uscf_id, 12345678);
        assert_eq!(players[1].display_name, "Jane Roe");
    }

    #[test]
    fn test_missing_entries_table_is_fatal() {
        let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert!(matches!(parse_players(&doc), Err(TdError::Parse(_))));
    }

    #[test]
    fn test_parse_player_ref_cell() {
        let player = parse_player_ref("12 John Doe (2250 3.0)");
        assert_eq!(player.display_name, "John Doe");
        assert_eq!(player.pairing_number, 12);
        assert_eq!(player.primary_rating, 2250);
        assert_eq!(player.current_score, 3.0);
        assert!(!player.has_result());
    }

    #[test]
    fn test_parse_player_ref_bye_and_unrated() {
        let bye = parse_player_ref("BYE");
        assert_eq!(bye.display_name, "BYE");
        assert_eq!(bye.primary_rating, 0);
        assert_eq!(bye.current_score, 0.0);

        let unrated = parse_player_ref("4 Bob Cob (unr. 2.0)");
        assert_eq!(unrated.display_name, "Bob Cob");
        assert_eq!(unrated.primary_rating, 0);
        assert_eq!(unrated.current_score, 2.0);
    }

    #[test]
    fn test_single_section_layout() {
        let t = parse_tournament(ENTRIES_HTML, SINGLE_SECTION_HTML).unwrap();
        assert_eq!(t.players.len(), 2);
        assert_eq!(t.current_pairings.len(), 3);
        assert!(t.current_pairings.iter().all(|p| p.section == "Open"));

        let bye = &t.current_pairings[2];
        assert!(bye.is_bye);
        assert_eq!(bye.white_player.display_name, "Carl Carp");
        assert_eq!(bye.white_points, Some(1.0));
    }

    #[test]
    fn test_mid_round_fixup_holds_scores() {
        // board 2 has no results, so even board 1's recorded win must not
        // advance anyone's post-round score
        let t = parse_tournament(ENTRIES_HTML, SINGLE_SECTION_HTML).unwrap();
        let board1 = &t.current_pairings[0];
        assert!(board1.white_player.has_result());
        assert_eq!(board1.white_player.current_score, 3.0);
        assert_eq!(board1.white_player.post_round_score, 3.0);

        // round inferred from the highest post-round score
        assert!(t.current_pairings.iter().all(|p| p.round_number == 4));
    }

    #[test]
    fn test_fixup_assigns_stable_ranks() {
        let t = parse_tournament(ENTRIES_HTML, SINGLE_SECTION_HTML).unwrap();
        let board1 = &t.current_pairings[0];
        let board2 = &t.current_pairings[1];
        let bye = &t.current_pairings[2];

        // post-round scores: John 3.0, Jane 3.0, Alice 2.5, Bob 2.0, Carl 2.0
        assert_eq!(board1.white_player.place_number, 1);
        assert_eq!(board1.black_player.place_number, 2);
        assert_eq!(board2.white_player.place_number, 3);
        assert_eq!(board2.black_player.place_number, 4);
        assert_eq!(bye.white_player.place_number, 5);
    }

    #[test]
    fn test_multi_section_skips_top_heading() {
        let t = parse_tournament(ENTRIES_HTML, MULTI_SECTION_HTML).unwrap();
        assert_eq!(t.current_pairings.len(), 2);
        assert_eq!(t.current_pairings[0].section, "Open");
        assert_eq!(t.current_pairings[1].section, "U1600");
        assert!(!t
            .current_pairings
            .iter()
            .any(|p| p.white_player.display_name == "Not Counted"));

        // complete round: posts advance, round = round(2.0) + 1
        assert_eq!(t.current_pairings[0].white_player.post_round_score, 2.0);
        assert!(t.current_pairings.iter().all(|p| p.round_number == 3));
    }

    #[test]
    fn test_malformed_h3_layout() {
        let t = parse_tournament(ENTRIES_HTML, MALFORMED_H3_HTML).unwrap();
        assert_eq!(t.current_pairings.len(), 1);
        assert_eq!(t.current_pairings[0].section, "U1200");
    }

    #[test]
    fn test_missing_pairings_table_is_fatal() {
        let html = r#"<div id="pairings"><h1>Open Pairings</h1><p>coming soon</p></div>"#;
        assert!(matches!(
            parse_tournament(ENTRIES_HTML, html),
            Err(TdError::Parse(_))
        ));
    }

    #[test]
    fn test_white_side_bye_normalizes_to_white() {
        let html = r#"
            <div id="pairings">
            <h1>Open Pairings</h1>
            <table>
              <tr><td>0</td><td></td><td>BYE</td><td>½</td><td>9 Carl Carp (1800 2.0)</td></tr>
            </table>
            </div>"#;
        let t = parse_tournament(ENTRIES_HTML, html).unwrap();
        let bye = &t.current_pairings[0];
        assert!(bye.is_bye);
        assert_eq!(bye.white_player.display_name, "Carl Carp");
        assert_eq!(bye.white_points, Some(0.5));
    }
}
