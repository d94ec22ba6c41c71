//! Rendering of participant lists.

/// Joins participant names into a natural-language phrase.
pub trait NameListFormatter: Send + Sync + 'static {
    fn format(&self, names: &[&str]) -> String;
}

/// `"A"`, `"A и B"`, `"A, B и C"`, with a configurable conjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjunctionFormatter {
    conjunction: String,
}

impl ConjunctionFormatter {
    pub fn new(conjunction: impl Into<String>) -> Self {
        Self { conjunction: conjunction.into() }
    }

    pub fn russian() -> Self {
        Self::new("и")
    }
}

impl Default for ConjunctionFormatter {
    fn default() -> Self {
        Self::russian()
    }
}

impl NameListFormatter for ConjunctionFormatter {
    fn format(&self, names: &[&str]) -> String {
        match names {
            [] => String::new(),
            [only] => (*only).to_string(),
            [init @ .., last] => format!("{} {} {}", init.join(", "), self.conjunction, last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_russian_conjunction() {
        let formatter = ConjunctionFormatter::russian();

        assert_eq!(formatter.format(&["A"]), "A");
        assert_eq!(formatter.format(&["A", "B"]), "A и B");
        assert_eq!(formatter.format(&["A", "B", "C"]), "A, B и C");
        assert_eq!(formatter.format(&["A", "B", "C", "D"]), "A, B, C и D");
        assert_eq!(formatter.format(&[]), "");
    }

    #[test]
    fn test_other_conjunction() {
        let formatter = ConjunctionFormatter::new("and");

        assert_eq!(formatter.format(&["Ann", "Bob", "Cid"]), "Ann, Bob and Cid");
    }
}
