//! Canonical form of the merchant's extra ("shp") parameters.
//!
//! Robokassa echoes every `shp_*` parameter back in its callbacks and folds
//! them into both signatures, so composer and verifier must agree on one
//! ordering: lowercase `shp_` prefix, ascending byte-wise by key.

use std::collections::BTreeMap;

use crate::error::InvalidValue;

/// Prefix every extra parameter carries on the wire and in signatures.
pub const USER_PARAMETER_PREFIX: &str = "shp_";

/// Extra parameters in canonical order. Only [`canonicalize`] creates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UserParameters(Vec<(String, String)>);

impl UserParameters {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Prefixed key/value pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(as_pair)
    }

    /// Look a value up by its prefixed or bare key.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = prefixed_key(key);
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a UserParameters {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.0
            .iter()
            .map(as_pair as fn(&'a (String, String)) -> (&'a str, &'a str))
    }
}

fn as_pair(pair: &(String, String)) -> (&str, &str) {
    (pair.0.as_str(), pair.1.as_str())
}

/// Rewrite `key` so it starts with exactly one lowercase `shp_`.
///
/// A key already carrying the prefix in any letter case (`Shp_`, `SHP_`) has
/// the prefix normalized instead of doubled.
pub(crate) fn prefixed_key(key: &str) -> String {
    let name = match key.get(..USER_PARAMETER_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(USER_PARAMETER_PREFIX) => {
            &key[USER_PARAMETER_PREFIX.len()..]
        }
        _ => key,
    };
    format!("{USER_PARAMETER_PREFIX}{name}")
}

/// Whether `key` names an extra parameter (prefix compared case-insensitively).
pub fn is_user_parameter(key: &str) -> bool {
    key.get(..USER_PARAMETER_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(USER_PARAMETER_PREFIX))
}

/// Prefix and order extra parameters.
///
/// Fails when two keys collapse into the same prefixed key, when a name is
/// empty, or when a name contains `:` or `=` (the signing string separators).
pub fn canonicalize<I, K, V>(params: I) -> Result<UserParameters, InvalidValue>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut sorted = BTreeMap::new();
    for (key, value) in params {
        let key = prefixed_key(key.as_ref());
        let name = &key[USER_PARAMETER_PREFIX.len()..];
        if name.is_empty() {
            return Err(InvalidValue::EmptyParameterKey);
        }
        if name.contains([':', '=']) {
            return Err(InvalidValue::AmbiguousParameterKey(key));
        }
        if sorted.contains_key(&key) {
            return Err(InvalidValue::DuplicateParameterKey(key));
        }
        sorted.insert(key, value.as_ref().to_owned());
    }
    Ok(UserParameters(sorted.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_prefix_and_sort() {
        let params = HashMap::from([("b", "2"), ("a", "1")]);
        let canonical = canonicalize(&params).unwrap();
        assert_eq!(
            canonical.as_slice(),
            &[
                ("shp_a".to_string(), "1".to_string()),
                ("shp_b".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let params = vec![("login", "vasya"), ("Shp_Order", "42"), ("SHP_url", "https://x.io/")];
        let once = canonicalize(params).unwrap();
        let twice = canonicalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_existing_prefix_is_normalized() {
        let canonical = canonicalize([("Shp_login", "Vasya"), ("SHP_oplata", "1")]).unwrap();
        let keys: Vec<&str> = canonical.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["shp_login", "shp_oplata"]);
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let canonical = canonicalize([("b", ""), ("B", ""), ("a", ""), ("_", ""), ("10", ""), ("9", "")])
            .unwrap();
        let keys: Vec<&str> = canonical.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["shp_10", "shp_9", "shp_B", "shp__", "shp_a", "shp_b"]
        );
    }

    #[test]
    fn test_duplicate_after_prefixing_is_rejected() {
        let err = canonicalize([("a", "1"), ("Shp_a", "2")]).unwrap_err();
        assert!(matches!(err, InvalidValue::DuplicateParameterKey(k) if k == "shp_a"));
    }

    #[test]
    fn test_bad_keys_are_rejected() {
        assert!(matches!(
            canonicalize([("", "1")]),
            Err(InvalidValue::EmptyParameterKey)
        ));
        assert!(matches!(
            canonicalize([("SHP_", "1")]),
            Err(InvalidValue::EmptyParameterKey)
        ));
        assert!(matches!(
            canonicalize([("a:b", "1")]),
            Err(InvalidValue::AmbiguousParameterKey(_))
        ));
        assert!(matches!(
            canonicalize([("a=b", "1")]),
            Err(InvalidValue::AmbiguousParameterKey(_))
        ));
    }

    #[test]
    fn test_values_may_contain_separators() {
        let canonical = canonicalize([("url", "https://robokassa.com/")]).unwrap();
        assert_eq!(canonical.get("url"), Some("https://robokassa.com/"));
        assert_eq!(canonical.get("Shp_url"), Some("https://robokassa.com/"));
    }

    #[test]
    fn test_multibyte_keys_do_not_panic() {
        let canonical = canonicalize([("имя", "Вася")]).unwrap();
        assert_eq!(canonical.get("имя"), Some("Вася"));
        assert!(!is_user_parameter("имя"));
        assert!(is_user_parameter("Shp_x"));
    }
}
