/**
This modules gives a few tools to prettyprint the outcome of a run: the counts of every completed
pass and, when the run stopped early, the pass that failed.
*/
use crate::error::Stage;
use crate::metrics::{DivByZeroStrat, Score};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Outcome of one completed pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassReport {
    pub pass: u32,
    /// Counts summed over every scored test profile
    pub score: Score,
    /// Number of test profiles compared with their prediction
    pub scored_profiles: usize,
    /// Test profiles without a counterpart in the search partition, in id order
    pub missing_counterparts: Vec<String>,
    /// Gold mentions that could not be aligned with the tokens of their document
    pub unaligned_entities: usize,
}

impl PassReport {
    pub fn new(pass: u32) -> Self {
        PassReport {
            pass,
            ..Default::default()
        }
    }
}

/// The summary line of the pass.
impl Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass {}: {}", self.pass, self.score)
    }
}

/// A pass that stopped the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPass {
    pub pass: u32,
    pub stage: Stage,
    pub message: String,
}

impl Display for FailedPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed pass {} during {}: {}",
            self.pass, self.stage, self.message
        )
    }
}

/// The reporter holds the report of every completed pass, in order, and the failure that stopped
/// the run, if any. When displayed, it is printed as if the passes were collected into a
/// dataframe.
///
/// # Example
///
/// ```rust
/// use nerpass::{DivByZeroStrat, PassReport, Reporter, Score};
///
/// let mut reporter = Reporter::new(DivByZeroStrat::ReplaceBy0);
/// reporter.push(PassReport {
///     score: Score::new(1, 1, 3),
///     scored_profiles: 1,
///     ..PassReport::new(1)
/// });
///
/// let expected_report =
/// "Pass, Wrong, Found, Missing, Total, Precision, Recall, Fscore
/// 1, 3, 1, 1, 2, 0.25, 0.5, 0.33333334\n";
///
/// assert_eq!(expected_report, reporter.to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reporter {
    pub(crate) passes: Vec<PassReport>,
    pub(crate) failure: Option<FailedPass>,
    pub(crate) zero_division: DivByZeroStrat,
}

impl Reporter {
    pub fn new(zero_division: DivByZeroStrat) -> Self {
        Reporter {
            passes: Vec::new(),
            failure: None,
            zero_division,
        }
    }

    pub fn push(&mut self, report: PassReport) {
        self.passes.push(report)
    }

    pub fn fail(&mut self, failure: FailedPass) {
        self.failure = Some(failure)
    }

    pub fn passes(&self) -> &[PassReport] {
        &self.passes
    }

    pub fn failure(&self) -> Option<&FailedPass> {
        self.failure.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// A metric that could not be computed is printed as `NaN`.
struct Metric(Result<f32, crate::metrics::DivisionByZeroError>);

impl Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Ok(value) => write!(f, "{}", value),
            Err(_) => write!(f, "NaN"),
        }
    }
}

impl Display for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pass, Wrong, Found, Missing, Total, Precision, Recall, Fscore"
        )?;
        for report in self.passes.iter() {
            let score = report.score;
            writeln!(
                f,
                "{}, {}, {}, {}, {}, {}, {}, {}",
                report.pass,
                score.wrong,
                score.found,
                score.missing,
                score.total(),
                Metric(score.precision(self.zero_division)),
                Metric(score.recall(self.zero_division)),
                Metric(score.fscore(self.zero_division)),
            )?
        }
        if let Some(failure) = &self.failure {
            writeln!(f, "{}", failure)?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> Reporter {
        let mut reporter = Reporter::new(DivByZeroStrat::ReturnError);
        reporter.push(PassReport {
            score: Score::new(2, 0, 2),
            scored_profiles: 2,
            ..PassReport::new(1)
        });
        reporter.push(PassReport::new(2));
        reporter
    }

    #[test]
    fn test_pass_report_display() {
        let report = PassReport {
            score: Score::new(3, 1, 2),
            ..PassReport::new(2)
        };
        assert_eq!(
            report.to_string(),
            "pass 2: 2 wrong, 3 found, 1 missing, 4 total"
        );
    }

    #[test]
    fn test_reporter_display() {
        let mut reporter = reporter();
        reporter.fail(FailedPass {
            pass: 3,
            stage: Stage::Extraction,
            message: String::from("Profile `9`: broken"),
        });
        let expected = "Pass, Wrong, Found, Missing, Total, Precision, Recall, Fscore
1, 2, 2, 0, 2, 0.5, 1, 0.6666667
2, 0, 0, 0, 0, NaN, NaN, NaN
failed pass 3 during extraction: Profile `9`: broken\n";
        assert_eq!(reporter.to_string(), expected);
        assert!(!reporter.is_complete());
    }

    #[test]
    fn test_reporter_serialization() {
        let reporter = reporter();
        let json = serde_json::to_value(&reporter).unwrap();
        assert_eq!(json["passes"][0]["score"]["found"], 2);
        assert_eq!(json["passes"][1]["pass"], 2);
        assert!(json["failure"].is_null());
        let back: Reporter = serde_json::from_value(json).unwrap();
        assert_eq!(back, reporter);
    }
}
