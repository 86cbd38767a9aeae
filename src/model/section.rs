use std::cmp::Ordering;

/// Section display priority: "Open" first, then "Championship", then
/// "U<N>" sections descending by N, then everything else lexicographically.
///
/// Both the pairing and standings views rely on this order, as does the
/// predictor's event-wide board numbering.
pub fn compare_sections(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    for leader in ["Open", "Championship"] {
        if a == leader {
            return Ordering::Less;
        }
        if b == leader {
            return Ordering::Greater;
        }
    }
    let a_under = a.starts_with('U');
    let b_under = b.starts_with('U');
    if a_under && b_under {
        if let (Ok(a_limit), Ok(b_limit)) = (a[1..].parse::<i64>(), b[1..].parse::<i64>()) {
            return b_limit.cmp(&a_limit);
        }
    }
    if a_under != b_under {
        return if a_under {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    a.cmp(b)
}

/// Collect section names and sort them by display priority.
pub fn sorted_section_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut sorted: Vec<String> = names.into_iter().map(Into::into).collect();
    sorted.sort_by(|a, b| compare_sections(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let sorted = sorted_section_names(["U1200", "Open", "U1600", "Novice"]);
        assert_eq!(sorted, vec!["Open", "U1600", "U1200", "Novice"]);
    }

    #[test]
    fn test_championship_after_open() {
        let sorted = sorted_section_names(["U1800", "Championship", "Open"]);
        assert_eq!(sorted, vec!["Open", "Championship", "U1800"]);
    }

    #[test]
    fn test_non_numeric_under_sections_sort_lexicographically() {
        let sorted = sorted_section_names(["Ux", "Ua"]);
        assert_eq!(sorted, vec!["Ua", "Ux"]);
    }
}
