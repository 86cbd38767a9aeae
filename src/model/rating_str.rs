//! Rating-string parsing.
//!
//! Ratings arrive as strings in a handful of shapes: a bare number
//! ("1875"), a provisional rating with a game count ("1234P10"), a
//! registration-form rating with a game count ("559/24"), or the
//! `<unrated>` sentinel.

use nom::{
    character::complete::{digit1, one_of},
    combinator::{all_consuming, map_res, opt},
    sequence::pair,
    IResult, Parser,
};

use crate::error::{Result, TdError};

/// Sentinel used by member records for a rating system the player has no
/// established rating in.
pub const UNRATED: &str = "<unrated>";

/// A rating string broken into its base rating and, for provisional
/// ratings, the number of games it is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRating {
    pub base: i32,
    pub provisional_games: Option<u32>,
}

fn integer(input: &str) -> IResult<&str, i32> {
    map_res(digit1, str::parse).parse(input)
}

/// Parse a game-count suffix: "P10" (provisional) or "/24" (registration).
fn rating_suffix(input: &str) -> IResult<&str, (char, i32)> {
    pair(one_of("P/"), integer).parse(input)
}

fn rating_token(input: &str) -> IResult<&str, (i32, Option<(char, i32)>)> {
    pair(integer, opt(rating_suffix)).parse(input)
}

/// Strictly parse a rating string. `<unrated>` and anything unparseable is
/// an unrated-input error; only a "P" suffix counts as provisional games.
pub fn parse_rating(s: &str) -> Result<ParsedRating> {
    match all_consuming(rating_token).parse(s.trim()) {
        Ok((_, (base, suffix))) => Ok(ParsedRating {
            base,
            provisional_games: match suffix {
                Some(('P', games)) => Some(games as u32),
                _ => None,
            },
        }),
        Err(_) => Err(TdError::UnratedInput(s.to_string())),
    }
}

/// Leniently extract the base rating from a rating string, treating
/// anything unparseable (including empty) as 0.
pub fn rating_base(s: &str) -> i32 {
    match all_consuming(rating_token).parse(s.trim()) {
        Ok((_, (base, _))) => base,
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_rating() {
        let r = parse_rating("1875").unwrap();
        assert_eq!(r.base, 1875);
        assert_eq!(r.provisional_games, None);
    }

    #[test]
    fn test_parse_provisional_rating() {
        let r = parse_rating("1234P10").unwrap();
        assert_eq!(r.base, 1234);
        assert_eq!(r.provisional_games, Some(10));
    }

    #[test]
    fn test_parse_rating_rejects_unrated_and_garbage() {
        assert!(parse_rating(UNRATED).is_err());
        assert!(parse_rating("abc").is_err());
        assert!(parse_rating("").is_err());
        assert!(parse_rating("1234P").is_err());
    }

    #[test]
    fn test_slash_suffix_is_not_provisional() {
        let r = parse_rating("559/24").unwrap();
        assert_eq!(r.base, 559);
        assert_eq!(r.provisional_games, None);
    }

    #[test]
    fn test_rating_base_lenient() {
        assert_eq!(rating_base("559/24"), 559);
        assert_eq!(rating_base(" 1500 "), 1500);
        assert_eq!(rating_base(""), 0);
        assert_eq!(rating_base("abc/123"), 0);
        assert_eq!(rating_base("123abc"), 0);
    }
}
