use std::collections::HashMap;

/// Multiset equality of two hostname lists, ignoring order.
///
/// Hostnames are compared byte for byte, the same way the issuer emits them.
pub fn same_domains<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff: HashMap<&str, usize> = HashMap::with_capacity(a.len());
    for domain in a {
        *diff.entry(domain.as_ref()).or_insert(0) += 1;
    }

    for domain in b {
        match diff.get_mut(domain.as_ref()) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    diff.remove(domain.as_ref());
                }
            }
            None => return false,
        }
    }

    diff.is_empty()
}
