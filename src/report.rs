//! Plain-text rendering of tournament state: aligned, column-padded tables
//! grouped by section in display priority order. Pure functions of the
//! model; no I/O happens here.

use std::collections::HashMap;

use log::warn;

use crate::model::{
    score_to_string, sorted_section_names, EventDetail, Pairing, Player, Tournament,
};

/// Render current pairings, grouped by section with byes sorted last.
pub fn render_pairings(tournament: &Tournament) -> String {
    let mut out = String::from(
        "* Please note that pairings are tentative and subject to change before the start of the round.\n\n",
    );

    if tournament.current_pairings.is_empty() {
        out.push_str("No pairings posted nor predicted");
        return out;
    }

    let round = tournament.current_pairings[0].round_number;
    if tournament.predicted {
        out.push_str(&format!(
            "Round {round} pairings are not yet posted, but here are my predicted round {round} pairings:\n\n"
        ));
    } else {
        out.push_str(&format!("Posted Round {round} Pairings:\n\n"));
    }

    let mut sections: HashMap<&str, Vec<&Pairing>> = HashMap::new();
    for pairing in &tournament.current_pairings {
        sections
            .entry(pairing.section.as_str())
            .or_default()
            .push(pairing);
    }
    let section_names = sorted_section_names(sections.keys().copied());

    for name in &section_names {
        let mut list = sections[name.as_str()].clone();
        list.sort_by_key(|p| (p.board_number == 0, p.board_number));

        let rows: Vec<[String; 3]> = list
            .iter()
            .map(|p| {
                let white = player_cell(&p.white_player);
                if p.is_bye {
                    let bye = if p.white_points == Some(1.0) {
                        "BYE(1)"
                    } else {
                        "BYE(½)"
                    };
                    ["n/a".to_string(), white, bye.to_string()]
                } else {
                    let board = format!("{}.", p.board_number);
                    [board, white, player_cell(&p.black_player)]
                }
            })
            .collect();

        write_section_header(&mut out, name, section_names.len());
        write_table(&mut out, ["Board", "White", "Black"], &rows);
    }

    out
}

fn player_cell(player: &Player) -> String {
    format!(
        "{}({} {})",
        player.display_name,
        player.primary_rating,
        score_to_string(player.current_score)
    )
}

/// Render standings as of the current round, with tied ranks blanked after
/// the first occurrence.
pub fn render_standings(tournament: &Tournament) -> String {
    if tournament.current_pairings.is_empty() {
        return "Cannot determine standings without current pairings".to_string();
    }

    let sections = tournament.players_by_section();
    let section_names = sorted_section_names(sections.keys().cloned());
    let mut out = format!(
        "Standings prior to Round {}:\n\n",
        tournament.current_pairings[0].round_number
    );

    for name in &section_names {
        let mut players = sections[name].clone();
        players.sort_by_key(|p| p.place_number);

        let mut rows = Vec::new();
        let mut prior_score = -1.0;
        for player in &players {
            let rank = if !rows.is_empty() && player.post_round_score == prior_score {
                String::new()
            } else {
                prior_score = player.post_round_score;
                format!("{}.", player.place_number)
            };
            rows.push([
                rank,
                player.display_name.clone(),
                format!("{:.1}", player.post_round_score),
            ]);
        }

        write_section_header(&mut out, name, section_names.len());
        write_table(&mut out, ["Place", "Name", "Score"], &rows);
    }

    out
}

/// Render the entrant list per section, sorted by rating descending.
pub fn render_entries(tournament: &Tournament) -> String {
    if tournament.current_pairings.is_empty() {
        warn!("report: entries requested but no pairings present");
        return "** error: missing pairings".to_string();
    }

    let sections = tournament.players_by_section();
    let section_names = sorted_section_names(sections.keys().cloned());
    let mut out = String::new();

    for name in &section_names {
        let mut players = sections[name].clone();
        players.sort_by_key(|p| std::cmp::Reverse(p.primary_rating));

        let rows: Vec<[String; 3]> = players
            .iter()
            .map(|p| {
                let rating = if p.primary_rating == 0 {
                    "unrated".to_string()
                } else {
                    p.primary_rating.to_string()
                };
                [p.display_name.clone(), rating, p.uscf_id.to_string()]
            })
            .collect();

        write_section_header(&mut out, name, section_names.len());
        write_table(&mut out, ["Player", "Rating", "USCF memid"], &rows);
    }

    out
}

/// Render an event-detail summary.
pub fn render_event(detail: &EventDetail) -> String {
    let mut out = String::new();
    out.push_str(&format!("Title: {}\n", detail.title));
    out.push_str(&format!(
        "URL: https://boylstonchess.org/events/{}\n",
        detail.event_id
    ));
    out.push_str(&format!("EventID: {}\n", detail.event_id));
    out.push_str(&format!("Date: {}\n", detail.date_display));
    if !detail.event_format.is_empty() {
        out.push_str(&format!("Format: {}\n", detail.event_format));
    }
    if !detail.time_control.is_empty() {
        out.push_str(&format!("Time Control: {}\n", detail.time_control));
    }
    if !detail.section_display.is_empty() {
        out.push_str(&format!("Sections: {}\n", detail.section_display));
    }
    out.push_str(&format!("Entry Fee: {}\n", detail.entry_fee_summary));
    if !detail.prize_summary.is_empty() {
        out.push_str(&format!("Prizes: {}\n", detail.prize_summary));
    }
    if !detail.registration_time.is_empty() {
        out.push_str(&format!(
            "Registration Time: {}\n",
            detail.registration_time
        ));
    }
    out.push_str(&format!("Round Times: {}\n", detail.round_times));
    out.push_str(&format!("Entries: {}\n", entries_summary(detail)));
    out.push_str(&format!("Description: {}\n", detail.description));
    out
}

fn entries_summary(detail: &EventDetail) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in &detail.entries {
        *counts.entry(entry.section_name.as_str()).or_default() += 1;
    }

    let mut out = detail.entries.len().to_string();
    if counts.len() > 1 || detail.sections.len() > 1 {
        let names = sorted_section_names(counts.keys().copied());
        let parts: Vec<String> = names
            .iter()
            .map(|n| format!("{}:{}", n, counts[n.as_str()]))
            .collect();
        out.push_str(&format!(" ({})", parts.join(" ")));
    }
    out
}

fn write_section_header(out: &mut String, name: &str, section_count: usize) {
    if section_count > 1 {
        let shown = if name.is_empty() { "UNNAMED" } else { name };
        out.push_str(&format!("{shown} Section\n"));
    }
}

fn write_table(out: &mut String, headers: [&str; 3], rows: &[[String; 3]]) {
    let mut widths = [0usize; 3];
    for (width, header) in widths.iter_mut().zip(headers) {
        *width = header.chars().count();
    }
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    out.push_str(&format!(
        "{:<w0$}  {:<w1$}  {:<w2$}\n",
        headers[0],
        headers[1],
        headers[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    ));
    for row in rows {
        out.push_str(&format!(
            "{:<w0$}  {:<w1$}  {:<w2$}\n",
            row[0],
            row[1],
            row[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        ));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entry;

    fn player(name: &str, rating: i32, score: f64, place: u32) -> Player {
        Player {
            display_name: name.to_string(),
            primary_rating: rating,
            current_score: score,
            post_round_score: score,
            place_number: place,
            uscf_id: 11111111,
            ..Player::default()
        }
    }

    fn sample_tournament(predicted: bool) -> Tournament {
        Tournament {
            players: Vec::new(),
            current_pairings: vec![
                Pairing {
                    white_player: player("John Doe", 2250, 3.0, 1),
                    black_player: player("Jane Roe", 2100, 2.5, 2),
                    section: "Open".to_string(),
                    round_number: 4,
                    board_number: 1,
                    ..Pairing::default()
                },
                Pairing {
                    white_player: player("Carl Carp", 1800, 2.0, 3),
                    section: "Open".to_string(),
                    round_number: 4,
                    board_number: 0,
                    is_bye: true,
                    white_points: Some(1.0),
                    ..Pairing::default()
                },
            ],
            predicted,
        }
    }

    #[test]
    fn test_render_posted_pairings() {
        let out = render_pairings(&sample_tournament(false));
        assert!(out.contains("Posted Round 4 Pairings:"));
        assert!(out.contains("John Doe(2250 3)"));
        assert!(out.contains("BYE(1)"));
        assert!(out.contains("n/a"));
        // single section: no section header line
        assert!(!out.contains("Open Section"));
    }

    #[test]
    fn test_render_predicted_pairings_banner() {
        let out = render_pairings(&sample_tournament(true));
        assert!(out.contains("predicted round 4 pairings"));
    }

    #[test]
    fn test_render_half_point_bye() {
        let mut t = sample_tournament(false);
        t.current_pairings[1].white_points = Some(0.5);
        let out = render_pairings(&t);
        assert!(out.contains("BYE(½)"));
        assert!(!out.contains("BYE(1)"));
    }

    #[test]
    fn test_render_empty_pairings() {
        let out = render_pairings(&Tournament::default());
        assert!(out.contains("No pairings posted nor predicted"));
    }

    #[test]
    fn test_render_standings_blanks_tied_ranks() {
        let mut t = sample_tournament(false);
        t.current_pairings[0].black_player.post_round_score = 3.0;
        t.current_pairings[0].black_player.place_number = 2;
        let out = render_standings(&t);
        assert!(out.starts_with("Standings prior to Round 4:"));
        let lines: Vec<&str> = out.lines().collect();
        let john = lines.iter().find(|l| l.contains("John Doe")).unwrap();
        let jane = lines.iter().find(|l| l.contains("Jane Roe")).unwrap();
        assert!(john.trim_start().starts_with("1."));
        // tied with John, so the rank column is blank
        assert!(jane.trim_start().starts_with("Jane"));
    }

    #[test]
    fn test_render_entries_marks_unrated() {
        let mut t = sample_tournament(false);
        t.current_pairings[0].black_player.primary_rating = 0;
        let out = render_entries(&t);
        assert!(out.contains("unrated"));
        assert!(out.contains("USCF memid"));
        // sorted by rating descending
        let john = out.find("John Doe").unwrap();
        let carl = out.find("Carl Carp").unwrap();
        assert!(john < carl);
    }

    #[test]
    fn test_render_entries_without_pairings_is_error_text() {
        let out = render_entries(&Tournament::default());
        assert!(out.starts_with("** error"));
    }

    #[test]
    fn test_render_event_summary() {
        let detail = EventDetail {
            event_id: 1358,
            title: "Thursday Night Swiss".to_string(),
            date_display: "Jul 10 - Aug 7".to_string(),
            entry_fee_summary: "$30".to_string(),
            round_times: "7:00 PM".to_string(),
            sections: vec!["Open".to_string(), "U1600".to_string()],
            entries: vec![
                Entry {
                    section_name: "Open".to_string(),
                    ..Entry::default()
                },
                Entry {
                    section_name: "Open".to_string(),
                    ..Entry::default()
                },
                Entry {
                    section_name: "U1600".to_string(),
                    ..Entry::default()
                },
            ],
            ..EventDetail::default()
        };
        let out = render_event(&detail);
        assert!(out.contains("Title: Thursday Night Swiss"));
        assert!(out.contains("URL: https://boylstonchess.org/events/1358"));
        assert!(out.contains("Entries: 3 (Open:2 U1600:1)"));
    }
}
