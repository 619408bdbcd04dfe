//! Playback position to active lyric line
//!
//! Timestamps look like `mm:ss` (minutes may exceed 59). Bracketed `[mm:ss]`
//! and fractional `mm:ss.xx` forms are accepted as well.

use super::LyricLine;

/// Parse a timestamp string like "00:12", "[03:05]" or "00:12.34" to milliseconds
pub fn parse_timestamp(raw: &str) -> Option<u64> {
    let s = raw.trim();
    let s = s
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(s);

    let (min, rest) = s.split_once(':')?;
    let (sec, frac) = match rest.split_once('.') {
        Some((sec, frac)) => (sec, Some(frac)),
        None => (rest, None),
    };

    let minutes = parse_digits(min)?;
    let seconds = parse_digits(sec)?;
    if seconds > 59 {
        return None;
    }

    let frac_ms = match frac {
        None => 0,
        // Handle "3" (tenths), "34" (centiseconds) and "340" (milliseconds)
        Some(f) => match f.len() {
            1 => parse_digits(f)? * 100,
            2 => parse_digits(f)? * 10,
            3 => parse_digits(f)?,
            _ => return None,
        },
    };

    minutes
        .checked_mul(60_000)?
        .checked_add(seconds * 1000 + frac_ms)
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Index of the line active at `position_ms`.
///
/// Scans backward for the last line whose timestamp is at or before the
/// position. Lines without a parsable timestamp are skipped. When nothing
/// qualifies the `previous` index is returned unchanged.
pub fn resolve_active_index(lines: &[LyricLine], position_ms: f64, previous: usize) -> usize {
    lines
        .iter()
        .enumerate()
        .rev()
        .filter_map(|(i, line)| line.timestamp().and_then(parse_timestamp).map(|ms| (i, ms)))
        .find(|&(_, ms)| ms as f64 <= position_ms)
        .map(|(i, _)| i)
        .unwrap_or(previous)
}

/// Lines plus the sticky active index, re-evaluated on every clock sample
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    lines: Vec<LyricLine>,
    active: usize,
}

impl Timeline {
    pub fn new(lines: Vec<LyricLine>) -> Self {
        Self { lines, active: 0 }
    }

    #[cfg(test)]
    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_line(&self) -> Option<&LyricLine> {
        self.lines.get(self.active)
    }

    /// Feed a clock sample. Returns the new index when the active line changed.
    pub fn update(&mut self, position_ms: f64) -> Option<usize> {
        let next = resolve_active_index(&self.lines, position_ms, self.active);
        if next == self.active {
            return None;
        }
        self.active = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello_world() -> Vec<LyricLine> {
        vec![
            LyricLine::timed("00:12", "Hello"),
            LyricLine::timed("00:18", "World"),
        ]
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:12"), Some(12000));
        assert_eq!(parse_timestamp("01:30"), Some(90000));
        assert_eq!(parse_timestamp("75:00"), Some(4_500_000));
        assert_eq!(parse_timestamp("[00:12]"), Some(12000));
        assert_eq!(parse_timestamp("00:12.34"), Some(12340));
        assert_eq!(parse_timestamp("00:12.340"), Some(12340));
    }

    #[test]
    fn test_parse_timestamp_rejects_malformed() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("12"), None);
        assert_eq!(parse_timestamp("aa:bb"), None);
        assert_eq!(parse_timestamp("00:60"), None);
        assert_eq!(parse_timestamp("-1:10"), None);
        assert_eq!(parse_timestamp("00:12.3456"), None);
    }

    #[test]
    fn test_resolve_examples() {
        let lines = hello_world();
        assert_eq!(resolve_active_index(&lines, 15_000.0, 0), 0);
        assert_eq!(resolve_active_index(&lines, 20_000.0, 0), 1);
        // Before the first timestamp the previous index sticks.
        assert_eq!(resolve_active_index(&lines, 5_000.0, 1), 1);
        assert_eq!(resolve_active_index(&[], 5_000.0, 0), 0);
    }

    #[test]
    fn test_resolve_is_monotone_for_sorted_lines() {
        let lines: Vec<LyricLine> = (0..20)
            .map(|i| LyricLine::timed(format!("00:{:02}", i * 3), format!("line {i}")))
            .collect();

        let mut last = 0;
        for pos in (0..70_000).step_by(250) {
            let idx = resolve_active_index(&lines, pos as f64, last);
            assert!(idx >= last);
            // Last line whose timestamp is <= pos.
            let expected = lines
                .iter()
                .rposition(|l| parse_timestamp(l.timestamp().unwrap()).unwrap() <= pos)
                .unwrap_or(last);
            assert_eq!(idx, expected);
            last = idx;
        }
    }

    #[test]
    fn test_resolve_skips_missing_and_malformed() {
        let lines = vec![
            LyricLine::timed("00:05", "a"),
            LyricLine::untimed("b"),
            LyricLine::timed("oops", "c"),
            LyricLine::timed("", "d"),
        ];
        assert_eq!(resolve_active_index(&lines, 60_000.0, 3), 0);

        let untimed = vec![LyricLine::untimed("x"), LyricLine::untimed("y")];
        assert_eq!(resolve_active_index(&untimed, 60_000.0, 1), 1);
    }

    #[test]
    fn test_resolve_out_of_order_takes_last_qualifying() {
        let lines = vec![
            LyricLine::timed("00:30", "late"),
            LyricLine::timed("00:10", "early"),
        ];
        assert_eq!(resolve_active_index(&lines, 35_000.0, 0), 1);
        assert_eq!(resolve_active_index(&lines, 15_000.0, 0), 1);
    }

    #[test]
    fn test_timeline_reports_changes_and_seek() {
        let mut timeline = Timeline::new(hello_world());
        assert_eq!(timeline.update(1_000.0), None);
        assert_eq!(timeline.active_line().unwrap().text, "Hello");

        assert_eq!(timeline.update(19_000.0), Some(1));
        assert_eq!(timeline.update(19_250.0), None);

        // Seeking back before the first line keeps the current one.
        assert_eq!(timeline.update(2_000.0), None);
        assert_eq!(timeline.active_index(), 1);

        assert_eq!(timeline.update(13_000.0), Some(0));
        assert_eq!(timeline.update(f64::NAN), None);
    }
}
