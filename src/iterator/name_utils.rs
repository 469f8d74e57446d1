use crate::dns::Name;

/// Returns the number of labels in `name`. The root name `.` has 0 labels.
pub fn label_count(name: &Name) -> usize {
    let s = name.as_ref();
    if s == "." {
        0
    } else {
        s[..s.len() - 1].split('.').count()
    }
}

/// Returns the rightmost `k` labels of `name`, i.e. the labels closest to
/// the root. Returns the root name if `k` is 0, and `name` unchanged if
/// `k` is greater than or equal to its label count.
pub fn last_k_labels(name: &Name, k: usize) -> Name {
    if k == 0 {
        return Name::from_string(".").unwrap();
    }
    let trimmed = name.as_ref().trim_end_matches('.');
    let labels: Vec<&str> = trimmed.split('.').collect();
    let start = labels.len().saturating_sub(k);
    let joined = labels[start..].join(".");
    Name::from_string(&format!("{}.", joined)).unwrap()
}

/// Case-insensitive name equality (RFC 1035 §2.3.3: comparisons of ASCII
/// characters in domain names disregard case).
pub fn equal(a: &Name, b: &Name) -> bool {
    a.as_ref().eq_ignore_ascii_case(b.as_ref())
}

/// Reports whether `child` lies in the bailiwick of `parent`, i.e. whether
/// `parent` is a label-wise, case-insensitive suffix of `child`. The root
/// zone is in the bailiwick of every name.
pub fn in_bailiwick(child: &Name, parent: &Name) -> bool {
    if parent.as_ref() == "." {
        return true;
    }
    let mut child_labels = child.as_ref().trim_end_matches('.').rsplit('.');
    let parent_labels = parent.as_ref().trim_end_matches('.').rsplit('.');
    for pl in parent_labels {
        match child_labels.next() {
            Some(cl) if cl.eq_ignore_ascii_case(pl) => continue,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_string(s).unwrap()
    }

    #[test]
    fn test_label_count() {
        assert_eq!(label_count(&name(".")), 0);
        assert_eq!(label_count(&name("com.")), 1);
        assert_eq!(label_count(&name("example.com.")), 2);
        assert_eq!(label_count(&name("www.example.com.")), 3);
    }

    #[test]
    fn test_last_k_labels() {
        let n = name("www.example.com.");
        assert_eq!(last_k_labels(&n, 0), name("."));
        assert_eq!(last_k_labels(&n, 1), name("com."));
        assert_eq!(last_k_labels(&n, 2), name("example.com."));
        assert_eq!(last_k_labels(&n, 3), name("www.example.com."));
        assert_eq!(last_k_labels(&n, 10), name("www.example.com."));
    }

    #[test]
    fn test_equal_is_case_insensitive() {
        assert!(equal(&name("WWW.Example.COM."), &name("www.example.com.")));
        assert!(!equal(&name("www.example.com."), &name("example.com.")));
    }

    #[test]
    fn test_in_bailiwick() {
        assert!(in_bailiwick(&name("www.example.com."), &name("example.com.")));
        assert!(in_bailiwick(&name("www.Example.COM."), &name("example.com.")));
        assert!(in_bailiwick(&name("example.com."), &name(".")));
        assert!(!in_bailiwick(&name("www.example.org."), &name("example.com.")));
        assert!(in_bailiwick(&name("example.com."), &name("example.com.")));
    }
}
