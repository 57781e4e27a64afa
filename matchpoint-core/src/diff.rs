use crate::store::Uid;

/// Returns the ids present in `current` but absent from `previous`, preserving
/// the order they appear in `current`.
///
/// An empty result means the update added nothing (a removal or a no-op) and
/// callers are expected to exit silently. Friends lists are small enough that
/// the quadratic scan doesn't matter.
pub fn added_ids(previous: &[Uid], current: &[Uid]) -> Vec<Uid> {
    current
        .iter()
        .filter(|id| !previous.contains(id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<Uid> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_addition() {
        let previous = ids(&["x"]);
        let current = ids(&["x", "y"]);

        assert_eq!(
            added_ids(&previous, &current),
            ids(&["y"]),
            "the one extra element should be returned"
        );
    }

    #[test]
    fn test_equal_lists_are_a_noop() {
        let list = ids(&["a", "b", "c"]);

        assert!(
            added_ids(&list, &list).is_empty(),
            "identical lists should produce no additions"
        );
    }

    #[test]
    fn test_removal_is_a_noop() {
        let previous = ids(&["a", "b"]);
        let current = ids(&["a"]);

        assert!(added_ids(&previous, &current).is_empty());
    }

    #[test]
    fn test_multiple_additions_keep_positional_order() {
        let previous = ids(&["a"]);
        let current = ids(&["b", "a", "c"]);

        let added = added_ids(&previous, &current);

        assert_eq!(added, ids(&["b", "c"]));
        assert_eq!(
            added.last().map(|s| s.as_str()),
            Some("c"),
            "the last positional addition should come last"
        );
    }
}
