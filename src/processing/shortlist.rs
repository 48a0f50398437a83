//! Shortlisting decisions

/// Inclusive: a score equal to the threshold is shortlisted.
pub fn is_shortlisted(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// Pick the threshold for a run: explicit override, then the job's own
/// threshold, then the configured HR default.
pub fn resolve_threshold(explicit: Option<f64>, job: Option<f64>, hr_default: f64) -> f64 {
    explicit.or(job).unwrap_or(hr_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortlist_boundaries() {
        assert!(is_shortlisted(72.0, 60.0));
        assert!(!is_shortlisted(59.99, 60.0));
        assert!(is_shortlisted(60.0, 60.0));
    }

    #[test]
    fn test_inflated_scores_still_compare() {
        assert!(is_shortlisted(130.0, 100.0));
    }

    #[test]
    fn test_threshold_precedence() {
        assert_eq!(resolve_threshold(Some(75.0), Some(70.0), 60.0), 75.0);
        assert_eq!(resolve_threshold(None, Some(70.0), 60.0), 70.0);
        assert_eq!(resolve_threshold(None, None, 55.0), 55.0);
    }
}
