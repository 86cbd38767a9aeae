//! Post-event rating estimation using the US Chess rating formulas.
//!
//! Players with 8 or fewer prior games use the special (provisional)
//! formula, a winning-expectancy equation solved by bisection. Everyone
//! else uses the standard K-factor formula with the bonus term. Both are
//! estimates: the federation's published calculation has inputs (age-based
//! initialization, floors, two-pass handling of unrated opponents) that are
//! not available here, so unrated participants are rejected outright.

use log::debug;
use rayon::prelude::*;

use crate::error::{Result, TdError};
use crate::fetch::Fetcher;
use crate::members::{self, Member, MemberId};
use crate::model::{parse_rating, UNRATED};

const RATING_FLOOR: f64 = 100.0;
const RATING_CEILING: f64 = 2700.0;

/// Logistic winning expectancy used by the standard formula.
fn expected_score(my_rating: f64, opp_rating: f64) -> f64 {
    1.0 / (10f64.powf((opp_rating - my_rating) / 400.0) + 1.0)
}

/// Clipped-linear winning expectancy used by the provisional formula.
fn provisional_winning_expectancy(r: f64, ri: f64) -> f64 {
    if r <= ri - 400.0 {
        0.0
    } else if r >= ri + 400.0 {
        1.0
    } else {
        0.5 + (r - ri) / 800.0
    }
}

/// Effective prior game count N0.
fn effective_games(old_rating: f64, prior_games: u32) -> f64 {
    let n_star = if old_rating <= 2355.0 {
        50.0 / (0.662 + 0.000_007_39 * (2569.0 - old_rating).powi(2)).sqrt()
    } else {
        50.0
    };
    (prior_games as f64).min(n_star)
}

/// K-factor for the standard formula. With `dual_rated` set, the over-2200
/// dual-rated adjustment applies.
pub fn k_factor(old_rating: f64, n0: f64, games: u32, dual_rated: bool) -> f64 {
    let denom = n0 + games as f64;
    if denom <= 0.0 {
        return 0.0;
    }
    if dual_rated && old_rating > 2200.0 {
        if old_rating >= 2500.0 {
            return 200.0 / denom;
        }
        return 800.0 * (6.5 - 0.0025 * old_rating) / denom;
    }
    800.0 / denom
}

/// Solve the provisional rating equation
/// `N0·PWe(R, old) + Σ PWe(R, opp_i) = score + N0/2` for R by bisection,
/// clamped to the publishable rating range.
fn provisional_estimate(
    old_rating: f64,
    n0: f64,
    score: f64,
    opponent_ratings: &[f64],
) -> f64 {
    let target = score + n0 / 2.0;
    let objective = |r: f64| {
        n0 * provisional_winning_expectancy(r, old_rating)
            + opponent_ratings
                .iter()
                .map(|&ri| provisional_winning_expectancy(r, ri))
                .sum::<f64>()
            - target
    };

    // start 1000 points beyond every rating involved so the expectancy
    // terms saturate, then widen if the bracket still excludes the root
    let mut lo = opponent_ratings.iter().copied().fold(old_rating, f64::min) - 1000.0;
    let mut hi = opponent_ratings.iter().copied().fold(old_rating, f64::max) + 1000.0;

    const RESIDUAL_EPS: f64 = 1e-7;
    const WIDTH_EPS: f64 = 1e-9;

    let mut f_lo = objective(lo);
    for _ in 0..10 {
        if f_lo <= 0.0 {
            break;
        }
        lo -= 1000.0;
        f_lo = objective(lo);
    }
    let mut f_hi = objective(hi);
    for _ in 0..10 {
        if f_hi >= 0.0 {
            break;
        }
        hi += 1000.0;
        f_hi = objective(hi);
    }

    let mut iterations = 0;
    while iterations < 200 && hi - lo > WIDTH_EPS {
        let mid = (lo + hi) / 2.0;
        let residual = objective(mid);
        if residual.abs() <= RESIDUAL_EPS {
            lo = mid;
            hi = mid;
            break;
        }
        if residual < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }
    if hi - lo > WIDTH_EPS {
        // out of iterations; the midpoint is the best available answer and
        // is returned without a distinct error
        debug!("ratings: bisection stopped with bracket width {}", hi - lo);
    }

    ((lo + hi) / 2.0).clamp(RATING_FLOOR, RATING_CEILING)
}

/// Estimate a post-event rating.
///
/// An unrated player or opponent (rating <= 0) is an error. An empty
/// opponent list returns `old_rating` unchanged: no games, no change.
pub fn estimate(
    old_rating: f64,
    prior_games: u32,
    score: f64,
    opponent_ratings: &[f64],
    dual_rated: bool,
) -> Result<f64> {
    if old_rating <= 0.0 {
        return Err(TdError::UnratedInput(
            "player has no established rating".to_string(),
        ));
    }
    if opponent_ratings.iter().any(|&r| r <= 0.0) {
        return Err(TdError::UnratedInput(
            "opponent has no established rating".to_string(),
        ));
    }

    let games = opponent_ratings.len() as u32;
    if games == 0 {
        return Ok(old_rating);
    }

    let n0 = effective_games(old_rating, prior_games);
    if prior_games <= 8 {
        return Ok(provisional_estimate(old_rating, n0, score, opponent_ratings));
    }

    let expected: f64 = opponent_ratings
        .iter()
        .map(|&r| expected_score(old_rating, r))
        .sum();
    let k = k_factor(old_rating, n0, games, dual_rated);
    let delta = k * (score - expected);
    Ok(old_rating + delta + bonus(games, delta))
}

/// Bonus points for a large positive performance over at least 3 games.
fn bonus(games: u32, delta: f64) -> f64 {
    // threshold lowered from 14 to 10 effective June 2025
    const BONUS_THRESHOLD: f64 = 10.0;
    if games < 3 {
        return 0.0;
    }
    let m = games.max(4) as f64;
    (delta - BONUS_THRESHOLD * m.sqrt()).max(0.0)
}

/// Estimate a member's post-event regular rating, fetching the member and
/// every opponent concurrently. Any unrated participant is an error and no
/// partial result is produced.
///
/// Prior game count comes from the provisional "P" suffix when present,
/// otherwise it is approximated as four games per rated event.
pub fn estimate_for_member(
    fetcher: &Fetcher,
    member_id: MemberId,
    opponent_ids: &[MemberId],
    score: f64,
) -> Result<f64> {
    let mut ids = Vec::with_capacity(opponent_ids.len() + 1);
    ids.push(member_id);
    ids.extend_from_slice(opponent_ids);

    let mut fetched = ids
        .par_iter()
        .map(|&id| fetch_rated_member(fetcher, id))
        .collect::<Result<Vec<Member>>>()?;

    let player = fetched.remove(0);
    let parsed = parse_rating(&player.regular_rating)?;
    let opponent_ratings = fetched
        .iter()
        .map(|m| parse_rating(&m.regular_rating).map(|r| r.base as f64))
        .collect::<Result<Vec<f64>>>()?;

    let prior_games = parsed
        .provisional_games
        .unwrap_or(player.total_events * 4);
    estimate(
        parsed.base as f64,
        prior_games,
        score,
        &opponent_ratings,
        false,
    )
}

fn fetch_rated_member(fetcher: &Fetcher, member_id: MemberId) -> Result<Member> {
    let member = members::fetch_member(fetcher, member_id)?;
    if member.regular_rating.trim() == UNRATED {
        return Err(TdError::UnratedInput(format!(
            "member {member_id} is unrated"
        )));
    }
    Ok(member)
}
