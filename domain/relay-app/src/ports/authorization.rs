use std::collections::HashSet;

/// Decides whether the holder of a submitter key may file reports.
pub trait KeyAuthorizationPort {
    fn key_allowed(&self, key: Option<&str>) -> bool;
}

/// Lets every submission through, with or without a key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllKeys;

impl KeyAuthorizationPort for AcceptAllKeys {
    fn key_allowed(&self, _key: Option<&str>) -> bool {
        true
    }
}

/// Accepts only keys from a fixed set.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyList {
    keys: HashSet<String>,
}

impl StaticKeyList {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .filter(|key: &String| !key.is_empty())
                .collect(),
        }
    }

    /// Parses a comma separated key list, ignoring surrounding whitespace.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyAuthorizationPort for StaticKeyList {
    fn key_allowed(&self, key: Option<&str>) -> bool {
        match key {
            Some(key) if !key.is_empty() => self.keys.contains(key),
            _ => false,
        }
    }
}
