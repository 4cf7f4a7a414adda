use thiserror::Error;

/// Reasons a transform or solve cannot continue.
///
/// None of these are transient: they describe the structure of the input, so
/// the solver never retries after reporting one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Constraint {row} is an equality, which the dual form does not accept")]
    EqualityInDual { row: usize },
    #[error("Constraint {row} is not an equality; convert the task to standard form first")]
    NotStandardForm { row: usize },
    #[error("No initial basis: found {found} unit columns for {needed} constraints")]
    NoInitialBasis { found: usize, needed: usize },
    #[error("There is no starting solution: objective coefficient {column} is {value}")]
    NoStartingSolution { column: usize, value: f64 },
    #[error("The problem is unbounded: column {column} has no positive entry")]
    Unbounded { column: usize },
    #[error("The problem is infeasible: row {row} has no eligible entering column")]
    Infeasible { row: usize },
    #[error("Iteration limit of {limit} reached without an optimal tableau")]
    IterationLimit { limit: usize },
}
