/// Convert a free-text Paprika time ("1 hr 30 mins", "45 minutes", "2h") into an
/// ISO 8601 duration ("PT1H30M", "PT45M", "PT2H").
///
/// Returns `None` when the text is not a plain sum of quantities with units, e.g.
/// ranges ("15-20 minutes") or prose ("overnight"). Values that are already ISO
/// durations are returned unchanged. A bare number is read as minutes.
pub fn to_iso8601(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(prefix) = text.get(..2).filter(|p| p.eq_ignore_ascii_case("PT")) {
        let iso = text.to_ascii_uppercase();
        return is_iso_time(&iso[prefix.len()..]).then_some(iso);
    }

    let normalized = text.to_lowercase().replace(',', " ").replace(" and ", " ");
    let mut chars = normalized.chars().peekable();
    let mut total_seconds = 0.0;
    let mut parts = 0;

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut number = String::new();
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            number.push(c);
        }
        let quantity: f64 = number.parse().ok()?;

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut unit = String::new();
        while let Some(c) = chars.next_if(|c| c.is_alphabetic() || *c == '.') {
            unit.push(c);
        }

        let seconds_per_unit = match unit.trim_end_matches('.') {
            // "30" on its own
            "" if parts == 0 => 60.0,
            "d" | "day" | "days" => 86_400.0,
            "h" | "hr" | "hrs" | "hour" | "hours" => 3_600.0,
            "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
            "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
            _ => return None,
        };
        total_seconds += quantity * seconds_per_unit;
        parts += 1;

        if unit.is_empty() && chars.peek().is_some() {
            return None;
        }
    }

    if parts == 0 {
        return None;
    }
    Some(format_seconds(total_seconds.round() as u64))
}

/// `1H30M`, `45M`, `5400.0S`: one or more number+unit pairs, units in H, M, S order
fn is_iso_time(rest: &str) -> bool {
    let mut units = ['H', 'M', 'S'].iter();
    let mut chars = rest.chars().peekable();
    let mut parts = 0;

    while chars.peek().is_some() {
        let mut number = String::new();
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            number.push(c);
        }
        if number.parse::<f64>().is_err() {
            return false;
        }
        let Some(unit) = chars.next() else {
            return false;
        };
        // each unit at most once, in order
        loop {
            match units.next() {
                Some(&u) if u == unit => break,
                Some(_) => continue,
                None => return false,
            }
        }
        parts += 1;
    }
    parts > 0
}

fn format_seconds(total: u64) -> String {
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut result = String::from("PT");
    if hours > 0 {
        result.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        result.push_str(&format!("{minutes}M"));
    }
    if seconds > 0 || total == 0 {
        result.push_str(&format!("{seconds}S"));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_conversion() {
        assert_eq!(to_iso8601("30 minutes").as_deref(), Some("PT30M"));
        assert_eq!(to_iso8601("1 hour").as_deref(), Some("PT1H"));
        assert_eq!(to_iso8601("1 hr 30 mins").as_deref(), Some("PT1H30M"));
        assert_eq!(to_iso8601("90 min").as_deref(), Some("PT1H30M"));
        assert_eq!(to_iso8601("2 hours and 15 minutes").as_deref(), Some("PT2H15M"));
        assert_eq!(to_iso8601("1h30m").as_deref(), Some("PT1H30M"));
        assert_eq!(to_iso8601("1.5 hours").as_deref(), Some("PT1H30M"));
        assert_eq!(to_iso8601("1 day").as_deref(), Some("PT24H"));
        assert_eq!(to_iso8601("45 secs").as_deref(), Some("PT45S"));
        assert_eq!(to_iso8601("0 min").as_deref(), Some("PT0S"));
    }

    #[test]
    fn test_bare_number_is_minutes() {
        assert_eq!(to_iso8601("20").as_deref(), Some("PT20M"));
        assert_eq!(to_iso8601("20 25"), None);
    }

    #[test]
    fn test_iso_duration_is_kept() {
        assert_eq!(to_iso8601("PT45M").as_deref(), Some("PT45M"));
        assert_eq!(to_iso8601("pt1h").as_deref(), Some("PT1H"));
        assert_eq!(to_iso8601("PT1H30M").as_deref(), Some("PT1H30M"));
        assert_eq!(to_iso8601("PT5400.0S").as_deref(), Some("PT5400.0S"));
    }

    #[test]
    fn test_malformed_iso_duration() {
        assert_eq!(to_iso8601("PT"), None);
        assert_eq!(to_iso8601("PT."), None);
        assert_eq!(to_iso8601("PTMMM"), None);
        assert_eq!(to_iso8601("PT30"), None);
        assert_eq!(to_iso8601("PT30M1H"), None);
        assert_eq!(to_iso8601("PT1H2H"), None);
        assert_eq!(to_iso8601("PTA meeting"), None);
    }

    #[test]
    fn test_unparseable_text() {
        assert_eq!(to_iso8601(""), None);
        assert_eq!(to_iso8601("overnight"), None);
        assert_eq!(to_iso8601("15-20 minutes"), None);
        assert_eq!(to_iso8601("about 10 minutes"), None);
        assert_eq!(to_iso8601("10 fortnights"), None);
    }
}
