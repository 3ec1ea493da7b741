use crate::geom::LoftError;

/// Terminal failures of a belt generation run.
///
/// Any of these aborts the pipeline; the accumulated diagnostics describe
/// where and why it stopped. Non-fatal conditions never surface here, they
/// are recorded as warnings and the run continues with a fallback value.
#[derive(Debug, thiserror::Error)]
pub enum BeltError {
    #[error("could not extract a boundary rail from the {surface} surface: {reason}")]
    Extraction {
        surface: &'static str,
        reason: String,
    },

    #[error("no reference-plane crossing could be derived for the {rail} rail")]
    NoIntersection { rail: &'static str },

    #[error("cross-section at '{label}' is invalid")]
    InvalidCrossSection { label: String },

    #[error(
        "two-rail loft failed: {source} \
         (dome rail closed: {dome_rail_closed}, bowl rail closed: {bowl_rail_closed}, \
         first section valid: {first_section_valid}, last section valid: {last_section_valid})"
    )]
    Loft {
        #[source]
        source: LoftError,
        dome_rail_closed: bool,
        bowl_rail_closed: bool,
        first_section_valid: bool,
        last_section_valid: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loft_error_reports_rail_flags() {
        let err = BeltError::Loft {
            source: LoftError::OpenRail { which: "second" },
            dome_rail_closed: true,
            bowl_rail_closed: false,
            first_section_valid: true,
            last_section_valid: true,
        };
        let message = err.to_string();
        assert!(message.contains("second rail is not closed"));
        assert!(message.contains("bowl rail closed: false"));
        assert!(message.contains("dome rail closed: true"));
    }

    #[test]
    fn test_cross_section_error_names_the_point() {
        let err = BeltError::InvalidCrossSection {
            label: "A_to_exit_2".to_string(),
        };
        assert!(err.to_string().contains("A_to_exit_2"));
    }
}
