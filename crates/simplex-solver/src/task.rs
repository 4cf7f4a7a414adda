use std::fmt;
use std::str::FromStr;

use crate::error::SolverError;

/// Relation between a constraint row and its right-hand side
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    LessEqual,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Equal (=)
    Equal,
}

/// Optimization direction of the objective
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::LessEqual => "<=",
            Relation::GreaterEqual => ">=",
            Relation::Equal => "=",
        }
    }
}

impl Sense {
    pub fn symbol(self) -> &'static str {
        match self {
            Sense::Maximize => "max",
            Sense::Minimize => "min",
        }
    }

    pub fn flipped(self) -> Sense {
        match self {
            Sense::Maximize => Sense::Minimize,
            Sense::Minimize => Sense::Maximize,
        }
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<=" => Ok(Relation::LessEqual),
            ">=" => Ok(Relation::GreaterEqual),
            "=" => Ok(Relation::Equal),
            other => Err(format!("unknown relation '{}'", other)),
        }
    }
}

impl FromStr for Sense {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(Sense::Maximize),
            "min" => Ok(Sense::Minimize),
            other => Err(format!("unknown objective type '{}'", other)),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One linear programming instance.
///
/// A task is never mutated after construction; every converter returns a new
/// task. The constructor guarantees that `matrix` has `n` rows of `m` entries,
/// where `m` is the objective length and `n` the number of right-hand sides.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTask"))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpTask {
    objective: Vec<f64>,
    sense: Sense,
    matrix: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    relations: Vec<Relation>,
}

/// Unchecked wire form of [`LpTask`]
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTask {
    objective: Vec<f64>,
    sense: Sense,
    matrix: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    relations: Vec<Relation>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTask> for LpTask {
    type Error = SolverError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        Self::new(raw.objective, raw.sense, raw.matrix, raw.rhs, raw.relations)
    }
}

impl LpTask {
    pub fn new(
        objective: Vec<f64>,
        sense: Sense,
        matrix: Vec<Vec<f64>>,
        rhs: Vec<f64>,
        relations: Vec<Relation>,
    ) -> Result<Self, SolverError> {
        let n = rhs.len();
        let m = objective.len();

        if matrix.len() != n {
            return Err(SolverError::DimensionMismatch {
                what: "constraint rows",
                expected: n,
                found: matrix.len(),
            });
        }
        if relations.len() != n {
            return Err(SolverError::DimensionMismatch {
                what: "relations",
                expected: n,
                found: relations.len(),
            });
        }
        if let Some(row) = matrix.iter().find(|row| row.len() != m) {
            return Err(SolverError::DimensionMismatch {
                what: "constraint columns",
                expected: m,
                found: row.len(),
            });
        }

        Ok(Self::from_parts(objective, sense, matrix, rhs, relations))
    }

    /// Builds a task whose dimensions the caller has already established.
    pub(crate) fn from_parts(
        objective: Vec<f64>,
        sense: Sense,
        matrix: Vec<Vec<f64>>,
        rhs: Vec<f64>,
        relations: Vec<Relation>,
    ) -> Self {
        debug_assert_eq!(matrix.len(), rhs.len());
        debug_assert_eq!(relations.len(), rhs.len());
        debug_assert!(matrix.iter().all(|row| row.len() == objective.len()));
        Self {
            objective,
            sense,
            matrix,
            rhs,
            relations,
        }
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Number of variables (`m`)
    pub fn variable_count(&self) -> usize {
        self.objective.len()
    }

    /// Number of constraints (`n`)
    pub fn constraint_count(&self) -> usize {
        self.rhs.len()
    }
}

impl fmt::Display for LpTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ((row, relation), rhs) in self.matrix.iter().zip(&self.relations).zip(&self.rhs) {
            for coef in row {
                write!(f, "{} ", coef)?;
            }
            writeln!(f, "{} {}", relation, rhs)?;
        }
        for coef in &self.objective {
            write!(f, "{} ", coef)?;
        }
        write!(f, "{}", self.sense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_mapping() {
        for relation in [Relation::LessEqual, Relation::GreaterEqual, Relation::Equal] {
            assert_eq!(relation.symbol().parse::<Relation>(), Ok(relation));
        }
        for sense in [Sense::Maximize, Sense::Minimize] {
            assert_eq!(sense.symbol().parse::<Sense>(), Ok(sense));
        }
        assert!("=<".parse::<Relation>().is_err());
        assert!("maximize".parse::<Sense>().is_err());
    }

    #[test]
    fn test_rejects_ragged_matrix() {
        let err = LpTask::new(
            vec![1.0, 2.0],
            Sense::Maximize,
            vec![vec![1.0, 1.0], vec![1.0]],
            vec![4.0, 3.0],
            vec![Relation::LessEqual, Relation::LessEqual],
        )
        .unwrap_err();

        assert_eq!(
            err,
            SolverError::DimensionMismatch {
                what: "constraint columns",
                expected: 2,
                found: 1,
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_dimensions() {
        let task = LpTask::new(
            vec![3.0, 2.0],
            Sense::Maximize,
            vec![vec![1.0, 1.0]],
            vec![4.0],
            vec![Relation::LessEqual],
        )
        .unwrap();
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(serde_json::from_str::<LpTask>(&json).unwrap(), task);

        let ragged = r#"{"objective":[3.0,2.0],"sense":"Maximize","matrix":[[1.0]],"rhs":[4.0],"relations":["LessEqual"]}"#;
        let err = serde_json::from_str::<LpTask>(ragged).unwrap_err();
        assert!(err.to_string().contains("constraint columns"), "{}", err);

        let short = r#"{"objective":[1.0],"sense":"Minimize","matrix":[[1.0],[2.0]],"rhs":[4.0,5.0],"relations":["Equal"]}"#;
        assert!(serde_json::from_str::<LpTask>(short).is_err());
    }

    #[test]
    fn test_rejects_missing_relation() {
        let err = LpTask::new(
            vec![1.0],
            Sense::Minimize,
            vec![vec![1.0], vec![2.0]],
            vec![1.0, 2.0],
            vec![Relation::GreaterEqual],
        )
        .unwrap_err();

        assert!(matches!(err, SolverError::DimensionMismatch { what: "relations", .. }));
    }

    #[test]
    fn test_display_uses_row_format() {
        let task = LpTask::new(
            vec![3.0, 5.0],
            Sense::Maximize,
            vec![vec![1.0, 0.0], vec![0.0, 2.0]],
            vec![4.0, 12.0],
            vec![Relation::LessEqual, Relation::GreaterEqual],
        )
        .unwrap();

        assert_eq!(task.to_string(), "1 0 <= 4\n0 2 >= 12\n3 5 max");
        assert_eq!(task.variable_count(), 2);
        assert_eq!(task.constraint_count(), 2);
    }
}
