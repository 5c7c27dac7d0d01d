use crate::model::Activity;

/// Activity label near the term marker.
///
/// The label's offset from the term cell varies with the activity name, so the search
/// covers `term_index - radius .. term_index + radius` and matches by containment.
pub fn extract_activity(tokens: &[String], term_index: usize, radius: usize) -> Activity {
    let from = term_index.saturating_sub(radius);
    let to = tokens.len().min(term_index.saturating_add(radius));

    tokens
        .get(from..to)
        .unwrap_or_default()
        .iter()
        .find_map(|text| Activity::from_label(text))
        .unwrap_or(Activity::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::tokens;

    #[test]
    fn picks_label_before_term() {
        let page = tokens(&["12345", "T18A", "Lecture", "Open", "24/30", "T3"]);
        assert_eq!(extract_activity(&page, 5, 3), Activity::Lecture);
    }

    #[test]
    fn picks_label_after_term() {
        let page = tokens(&["4567", "H11A", "Open", "3/20", "T2", "Tutorial-Laboratory", "x"]);
        assert_eq!(extract_activity(&page, 4, 3), Activity::Tutorial);
    }

    #[test]
    fn first_match_in_scan_order_wins() {
        let page = tokens(&["Laboratory", "x", "Lecture", "T1"]);
        assert_eq!(extract_activity(&page, 3, 3), Activity::Laboratory);
    }

    #[test]
    fn falls_back_to_unknown() {
        let page = tokens(&["4567", "H11A", "Open", "3/20", "T2"]);
        assert_eq!(extract_activity(&page, 4, 3), Activity::Unknown);
        assert_eq!(extract_activity(&[], 0, 3), Activity::Unknown);
    }
}
