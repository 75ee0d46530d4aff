//! Extension string parsing.

use fnv::FnvHashSet;
use std::fmt;

/// The tokenised set of extension names advertised by a context.
///
/// Built once from the concatenated GL and window-system extension
/// strings. Iteration follows source order with duplicates removed.
#[derive(Clone, Default)]
pub struct ExtensionSet {
    /// Names in the order they first appeared.
    names: Vec<String>,

    /// Membership index over `names`.
    index: FnvHashSet<String>,
}

impl ExtensionSet {
    /// Constructs an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenises a whitespace-separated extension string.
    pub fn parse(source: &str) -> Self {
        let mut set = Self::new();
        set.extend_from_str(source);
        set
    }

    /// Tokenises and merges several extension strings.
    pub fn from_strings<'a, I>(sources: I) -> Self
        where I: IntoIterator<Item = &'a str>
    {
        let mut set = Self::new();
        for source in sources {
            set.extend_from_str(source);
        }
        set
    }

    /// Merges the tokens of another extension string into the set.
    pub fn extend_from_str(&mut self, source: &str) {
        for token in source.split_ascii_whitespace() {
            self.insert(token);
        }
    }

    /// Adds a single extension name.
    pub fn insert(&mut self, name: &str) {
        if name.is_empty() || self.index.contains(name) {
            return;
        }
        self.index.insert(name.to_owned());
        self.names.push(name.to_owned());
    }

    /// Returns `true` if `name` is advertised.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Returns the number of distinct extension names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no extension is advertised.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates the extension names in source order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Debug for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for name in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}
