//! Append-only collection of non-fatal errors for one run.

use std::fmt;

/// Collects per-host failures and expiration warnings in push order.
///
/// Owned by the caller of a run and threaded through the fetch and expiration
/// steps. Drained exactly once with [`merge_and_clear`](Self::merge_and_clear).
#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    errors: Vec<anyhow::Error>,
}

impl ErrorAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error.
    pub fn push(&mut self, err: impl Into<anyhow::Error>) {
        self.errors.push(err.into());
    }

    /// Number of errors accumulated so far.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Accumulated errors, in push order.
    pub fn errors(&self) -> &[anyhow::Error] {
        &self.errors
    }

    /// Merges every accumulated error into one, leaving the accumulator empty.
    pub fn merge_and_clear(&mut self) -> Option<CombinedError> {
        if self.errors.is_empty() {
            return None;
        }
        Some(CombinedError {
            errors: std::mem::take(&mut self.errors),
        })
    }
}

/// Summary of every error accumulated during a run.
#[derive(Debug)]
pub struct CombinedError {
    errors: Vec<anyhow::Error>,
}

impl CombinedError {
    /// The merged errors, in push order.
    pub fn errors(&self) -> &[anyhow::Error] {
        &self.errors
    }

    /// Number of merged errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`; an empty merge yields no `CombinedError`.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for CombinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.errors.as_slice() {
            return write!(f, "{only:#}");
        }
        write!(f, "{} errors:", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  {err:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CombinedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator_merges_to_none() {
        let mut acc = ErrorAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.merge_and_clear().is_none());
    }

    #[test]
    fn test_merge_preserves_push_order() {
        let mut acc = ErrorAccumulator::new();
        acc.push(anyhow::anyhow!("first"));
        acc.push(anyhow::anyhow!("second"));
        acc.push(anyhow::anyhow!("third"));
        assert_eq!(acc.len(), 3);

        let combined = acc.merge_and_clear().expect("errors were pushed");
        let messages: Vec<String> = combined.errors().iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(combined.to_string(), "3 errors:\n  first\n  second\n  third");
    }

    #[test]
    fn test_merge_clears() {
        let mut acc = ErrorAccumulator::new();
        acc.push(anyhow::anyhow!("only"));
        let combined = acc.merge_and_clear().unwrap();
        assert_eq!(combined.to_string(), "only");
        assert!(acc.is_empty());
        assert!(acc.merge_and_clear().is_none());
    }

    #[test]
    fn test_push_typed_errors() {
        let mut acc = ErrorAccumulator::new();
        acc.push(crate::error_handling::PolicyError::UnsupportedProxyScheme(
            "ftp".to_string(),
        ));
        assert!(acc.errors()[0]
            .downcast_ref::<crate::error_handling::PolicyError>()
            .is_some());
    }
}
