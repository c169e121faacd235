use crate::models::Series;

/// Find the series a title belongs to.
///
/// Series are tried in list order and the first one whose pattern matches at
/// the start of `title` wins, so earlier entries take priority.
pub fn find_series<'a>(series: &'a [Series], title: &str) -> Option<&'a Series> {
    let found = series.iter().find(|s| s.matches(title));
    if let Some(series) = found {
        tracing::info!("Found match for '{}' :: '{}'", title, series.folder());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(list: &[(&str, &str)]) -> Vec<Series> {
        list.iter()
            .map(|(folder, pattern)| Series::new(*folder, pattern).unwrap())
            .collect()
    }

    #[test]
    fn test_first_match_wins() {
        let list = series(&[("A", "^Ep"), ("B", "^Ep1")]);
        let found = find_series(&list, "Ep1: Intro").unwrap();
        assert_eq!(found.folder(), "A");
    }

    #[test]
    fn test_later_series_used_when_earlier_misses() {
        let list = series(&[("A", "Trailer"), ("B", "Ep\\d+")]);
        assert_eq!(find_series(&list, "Ep12 - Finale").unwrap().folder(), "B");
    }

    #[test]
    fn test_substring_does_not_match() {
        let list = series(&[("A", "Ep1")]);
        assert!(find_series(&list, "Behind the scenes of Ep1").is_none());
    }

    #[test]
    fn test_prefix_is_enough() {
        let list = series(&[("A", "Ep1$|Ep1")]);
        assert!(find_series(&list, "Ep1 and then some").is_some());
    }

    #[test]
    fn test_empty_list() {
        assert!(find_series(&[], "anything").is_none());
    }
}
