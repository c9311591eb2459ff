/*!
Scoring of predicted entities against gold entities. Entities are compared on their
`(text, start, end)` key only: a prediction with the right text and offsets but another category
is found.
*/
use crate::entity::EntitySet;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Counts of a comparison between predicted and gold entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Score {
    /// Predicted entities present in the gold set
    pub found: usize,
    /// Gold entities that were not predicted
    pub missing: usize,
    /// Predicted entities absent from the gold set
    pub wrong: usize,
}

impl Score {
    pub fn new(found: usize, missing: usize, wrong: usize) -> Self {
        Score {
            found,
            missing,
            wrong,
        }
    }

    /// Size of the gold set, `found + missing`.
    pub fn total(&self) -> usize {
        self.found + self.missing
    }

    /// `found / (found + wrong)`
    pub fn precision(&self, zero_division: DivByZeroStrat) -> Result<f32, DivisionByZeroError> {
        divide(self.found, self.found + self.wrong, zero_division)
    }

    /// `found / (found + missing)`
    pub fn recall(&self, zero_division: DivByZeroStrat) -> Result<f32, DivisionByZeroError> {
        divide(self.found, self.total(), zero_division)
    }

    /// Harmonic mean of the precision and the recall.
    pub fn fscore(&self, zero_division: DivByZeroStrat) -> Result<f32, DivisionByZeroError> {
        let precision = self.precision(zero_division)?;
        let recall = self.recall(zero_division)?;
        let denominator = precision + recall;
        if denominator == 0.0 {
            return match zero_division {
                DivByZeroStrat::ReturnError => Err(DivisionByZeroError),
                DivByZeroStrat::ReplaceBy1 => Ok(1.0),
                DivByZeroStrat::ReplaceBy0 => Ok(0.0),
            };
        }
        Ok(2.0 * precision * recall / denominator)
    }
}

impl Add for Score {
    type Output = Score;
    fn add(self, rhs: Self) -> Self::Output {
        Score {
            found: self.found + rhs.found,
            missing: self.missing + rhs.missing,
            wrong: self.wrong + rhs.wrong,
        }
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs
    }
}

impl Sum for Score {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Self {
        iter.fold(Score::default(), Add::add)
    }
}

impl<'a> Sum<&'a Score> for Score {
    fn sum<I: Iterator<Item = &'a Score>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wrong, {} found, {} missing, {} total",
            self.wrong,
            self.found,
            self.missing,
            self.total()
        )
    }
}

/// Compares the predictions of one document with its gold entities.
///
/// ```rust
/// use nerpass::{score, Category, Entity, EntitySet, Score};
///
/// let gold: EntitySet = [
///     Entity::new("Ana Silva", 0, 2, Category::Person),
///     Entity::new("Acme", 4, 5, Category::Organization),
/// ]
/// .into_iter()
/// .collect();
/// let predicted: EntitySet = [
///     Entity::new("Ana Silva", 0, 2, Category::Abstract),
///     Entity::new("works", 2, 3, Category::Person),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(score(&predicted, &gold), Score::new(1, 1, 1));
/// ```
pub fn score(predicted: &EntitySet, gold: &EntitySet) -> Score {
    let found = predicted.iter().filter(|p| gold.contains(*p)).count();
    Score {
        found,
        missing: gold.len() - found,
        wrong: predicted.len() - found,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// How do we handle cases with a division by zero? Do we make the result 1, return an error, or
/// make the result 0? A pass without any prediction has an undefined precision, so the
/// `ReplaceBy0` strategy is the default.
pub enum DivByZeroStrat {
    /// A division by zero gives `1`
    ReplaceBy1,
    /// Returns an error
    ReturnError,
    /// A division by zero gives `0`
    #[default]
    ReplaceBy0,
}

impl Display for DivByZeroStrat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Could not parse `{0}` into a `DivByZeroStrat`")]
pub struct ParsingDivisionByZeroStrategyError(String);

impl FromStr for DivByZeroStrat {
    type Err = ParsingDivisionByZeroStrategyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "replaceby1" | "replacebyone" => Ok(DivByZeroStrat::ReplaceBy1),
            "replaceby0" | "replacebyzero" => Ok(DivByZeroStrat::ReplaceBy0),
            "returnerror" | "error" => Ok(DivByZeroStrat::ReturnError),
            _ => Err(ParsingDivisionByZeroStrategyError(String::from(s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Encountered division by zero")]
pub struct DivisionByZeroError;

fn divide(
    numerator: usize,
    denominator: usize,
    zero_division: DivByZeroStrat,
) -> Result<f32, DivisionByZeroError> {
    if denominator != 0 {
        return Ok(numerator as f32 / denominator as f32);
    }
    match zero_division {
        DivByZeroStrat::ReturnError => Err(DivisionByZeroError),
        DivByZeroStrat::ReplaceBy1 => Ok(1.0),
        DivByZeroStrat::ReplaceBy0 => Ok(0.0),
    }
}
