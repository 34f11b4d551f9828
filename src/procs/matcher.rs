// Command-line pattern matching over process snapshots

use super::{ProcessRecord, ProcessSource};
use crate::error::Error;
use anyhow::{bail, Context, Result};
use regex::{Regex, RegexBuilder};

/// Maximum allowed length for match patterns to prevent ReDoS attacks
const MAX_PATTERN_LENGTH: usize = 256;

/// Maximum compiled regex size in bytes (10MB) to prevent memory exhaustion
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Compile a match pattern with safety limits.
fn compile_pattern(pattern: &str) -> Result<Regex> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        bail!(
            "Match pattern too long (max {} chars): {}...",
            MAX_PATTERN_LENGTH,
            &pattern[..50.min(pattern.len())]
        );
    }

    RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .context(format!("Invalid match pattern: {pattern}"))
}

/// An ordered set of pattern terms, all of which must match a process
/// command line (logical AND, order irrelevant).
#[derive(Debug, Clone)]
pub struct MatchCriteria {
    terms: Vec<Regex>,
}

impl MatchCriteria {
    /// Build criteria from one or more pattern strings.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms = Vec::new();
        for pattern in patterns {
            terms.push(compile_pattern(pattern.as_ref())?);
        }
        if terms.is_empty() {
            bail!("At least one match pattern is required");
        }
        Ok(Self { terms })
    }

    /// Build criteria from a single pattern string.
    pub fn single(pattern: &str) -> Result<Self> {
        Self::from_patterns([pattern])
    }

    /// Check whether a command line satisfies every term.
    pub fn matches(&self, command: &str) -> bool {
        self.terms.iter().all(|term| term.is_match(command))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Finds sibling processes whose command lines satisfy a set of criteria.
///
/// The caller's own process is always excluded from results.
pub struct Matcher<S> {
    source: S,
    self_pid: i32,
}

impl<S: ProcessSource> Matcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            self_pid: std::process::id() as i32,
        }
    }

    /// Override the excluded pid. Used by tests with synthetic sources.
    #[cfg(test)]
    pub fn with_self_pid(source: S, self_pid: i32) -> Self {
        Self { source, self_pid }
    }

    /// Enumerate processes and keep those matching every criteria term,
    /// excluding this process itself. Empty is a valid result.
    pub async fn find_matching(
        &self,
        criteria: &MatchCriteria,
    ) -> Result<Vec<ProcessRecord>, Error> {
        let processes = self.source.list().await?;

        Ok(processes
            .into_iter()
            .filter(|p| p.pid != self.self_pid && criteria.matches(&p.command))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(Vec<ProcessRecord>);

    impl ProcessSource for StaticSource {
        async fn list(&self) -> Result<Vec<ProcessRecord>, Error> {
            Ok(self.0.clone())
        }
    }

    fn record(pid: i32, command: &str) -> ProcessRecord {
        ProcessRecord {
            owner: "alice".to_string(),
            pid,
            name: command.split('/').next_back().unwrap_or(command).to_string(),
            command: command.to_string(),
        }
    }

    #[test]
    fn test_all_terms_must_match() {
        let criteria = MatchCriteria::from_patterns(["python", "8888"]).unwrap();
        assert!(criteria.matches("python app.py --port 8888"));
        assert!(!criteria.matches("python app.py --port 9999"));
        assert!(!criteria.matches("node server.js --port 8888"));
    }

    #[test]
    fn test_term_order_is_irrelevant() {
        let criteria = MatchCriteria::from_patterns(["8888", "python"]).unwrap();
        assert!(criteria.matches("python app.py --port 8888"));
    }

    #[test]
    fn test_single_pattern_is_one_term_set() {
        let criteria = MatchCriteria::single("app\\.py").unwrap();
        assert_eq!(criteria.len(), 1);
        assert!(criteria.matches("python app.py"));
        assert!(!criteria.matches("python apppy"));
    }

    #[test]
    fn test_empty_pattern_set_rejected() {
        let patterns: [&str; 0] = [];
        assert!(MatchCriteria::from_patterns(patterns).is_err());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(MatchCriteria::single("[invalid").is_err());
    }

    #[test]
    fn test_pattern_too_long_rejected() {
        let long = "a".repeat(MAX_PATTERN_LENGTH + 1);
        let result = MatchCriteria::single(&long);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too long"));
    }

    #[tokio::test]
    async fn test_find_matching_returns_exact_subset() {
        let source = StaticSource(vec![
            record(100, "python app.py --port 8888"),
            record(101, "python worker.py"),
            record(102, "node server.js"),
            record(103, "python app.py --port 9999"),
        ]);
        let matcher = Matcher::with_self_pid(source, 1);
        let criteria = MatchCriteria::from_patterns(["python", "app\\.py"]).unwrap();

        let matches = matcher.find_matching(&criteria).await.unwrap();
        let pids: Vec<i32> = matches.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![100, 103]);
    }

    #[tokio::test]
    async fn test_find_matching_excludes_self() {
        let source = StaticSource(vec![
            record(100, "python app.py"),
            record(200, "python app.py"),
        ]);
        let matcher = Matcher::with_self_pid(source, 100);
        let criteria = MatchCriteria::single("app\\.py").unwrap();

        let matches = matcher.find_matching(&criteria).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pid, 200);
    }

    #[tokio::test]
    async fn test_find_matching_empty_is_not_an_error() {
        let source = StaticSource(vec![record(100, "node server.js")]);
        let matcher = Matcher::with_self_pid(source, 1);
        let criteria = MatchCriteria::single("python").unwrap();

        let matches = matcher.find_matching(&criteria).await.unwrap();
        assert!(matches.is_empty());
    }
}
