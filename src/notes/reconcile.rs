//! Duplicate and contradiction removal inside one section.
use std::collections::HashSet;

use super::document::Section;

/// Similarity rule deciding when two statements talk about the same subject.
///
/// The subject key is the first `leading_words` plus the last
/// `trailing_words` normalized words. Two statements with equal keys but
/// different text contradict each other; the later one wins. With both
/// counts at zero only exact duplicates are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectRule {
    pub leading_words: usize,
    pub trailing_words: usize,
}

impl Default for SubjectRule {
    fn default() -> Self {
        Self {
            leading_words: 1,
            trailing_words: 1,
        }
    }
}

impl SubjectRule {
    pub const fn disabled() -> Self {
        Self {
            leading_words: 0,
            trailing_words: 0,
        }
    }

    /// Subject key for normalized `words`, if the statement is long enough.
    pub fn subject_key(&self, words: &[String]) -> Option<String> {
        let span = self.leading_words + self.trailing_words;
        if span == 0 || words.len() < span {
            return None;
        }
        let leading = words[..self.leading_words].join(" ");
        let trailing = words[words.len() - self.trailing_words..].join(" ");
        Some(format!("{leading}|{trailing}"))
    }
}

/// Lower-cased alphanumeric words of a statement.
pub fn normalize(statement: &str) -> Vec<String> {
    statement
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Remove duplicate and contradicted entries, keeping the latest of each.
///
/// Returns the removed statements in document order. Non-entry lines are
/// never touched.
pub fn reconcile_section(section: &mut Section, rule: &SubjectRule) -> Vec<String> {
    let mut seen_statements = HashSet::new();
    let mut seen_subjects = HashSet::new();
    let mut doomed = Vec::new();

    let entries: Vec<_> = section
        .entries()
        .map(|entry| (entry.index, entry.statement.to_string()))
        .collect();

    for (index, statement) in entries.iter().rev() {
        let words = normalize(statement);
        let subject = rule.subject_key(&words);
        let duplicate = !seen_statements.insert(words.join(" "));
        let contradicted = match subject {
            Some(key) => !seen_subjects.insert(key),
            None => false,
        };
        if duplicate || contradicted {
            doomed.push((*index, statement.clone()));
        }
    }

    doomed.reverse();
    let indices: Vec<usize> = doomed.iter().map(|(index, _)| *index).collect();
    section.remove_lines(&indices);
    doomed.into_iter().map(|(_, statement)| statement).collect()
}
