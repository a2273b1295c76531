use std::cmp::Ordering;

/// Compare two keys by their UTF-8 bytes.
///
/// This is the ordering used for every object written by the canonical
/// encoder and for the key order of a `Node`. It is not locale aware:
/// uppercase ASCII sorts before lowercase, and non-ASCII keys sort after
/// all ASCII keys.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use socialize_util::ordinal::ordinal_cmp;
///
/// assert_eq!(ordinal_cmp("C", "a"), Ordering::Less);
/// assert_eq!(ordinal_cmp("a", "b"), Ordering::Less);
/// assert_eq!(ordinal_cmp("ab", "a"), Ordering::Greater);
/// ```
pub fn ordinal_cmp(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Returns `true` when `keys` are in strictly ascending ordinal order.
pub fn is_ordinal_sorted<'a, I>(keys: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut prev: Option<&str> = None;
    for key in keys {
        if let Some(p) = prev {
            if ordinal_cmp(p, key) != Ordering::Less {
                return false;
            }
        }
        prev = Some(key);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_sorts_before_lowercase() {
        assert_eq!(ordinal_cmp("C", "a"), Ordering::Less);
        assert_eq!(ordinal_cmp("Z", "a"), Ordering::Less);
        assert_eq!(ordinal_cmp("a", "B"), Ordering::Greater);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(ordinal_cmp("", "a"), Ordering::Less);
        assert_eq!(ordinal_cmp("a", "aa"), Ordering::Less);
        assert_eq!(ordinal_cmp("a", "a"), Ordering::Equal);
    }

    #[test]
    fn non_ascii_sorts_after_ascii() {
        assert_eq!(ordinal_cmp("é", "z"), Ordering::Greater);
        assert_eq!(ordinal_cmp("z", "é"), Ordering::Less);
    }

    #[test]
    fn sorted_check() {
        assert!(is_ordinal_sorted(["C", "a", "b"]));
        assert!(!is_ordinal_sorted(["a", "C"]));
        assert!(!is_ordinal_sorted(["a", "a"]));
        assert!(is_ordinal_sorted(std::iter::empty::<&str>()));
    }
}
