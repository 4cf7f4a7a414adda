//! Rewrites of an [`LpTask`] into the forms the solvers start from.
//!
//! Every function here is pure: it reads the input task and returns a fresh
//! one, leaving the input untouched.

use log::debug;

use crate::error::SolverError;
use crate::task::{LpTask, Relation, Sense};

/// Convert to standard form: only `=` relations and a non-negative RHS.
///
/// Each `<=` row gains a slack column and each `>=` row a surplus column.
/// Rows with a negative RHS are negated first, so the appended column carries
/// that sign too. Rows that already are equalities gain nothing.
pub fn to_standard_form(task: &LpTask) -> LpTask {
    expand_with_slacks(task, |rhs, relation| {
        let sign = if rhs >= 0.0 { 1.0 } else { -1.0 };
        let slack = match relation {
            Relation::LessEqual => Some(sign),
            Relation::GreaterEqual => Some(-sign),
            Relation::Equal => None,
        };
        (sign, slack)
    })
}

/// Convert to the standard form used by the dual simplex method.
///
/// Every `>=` (and `=`) row is negated so inequalities read as `<=`, then each
/// inequality gains a `+1` slack column. The slacks form an identity basis
/// immediately; the price is that RHS entries may end up negative.
pub fn to_dual_standard_form(task: &LpTask) -> LpTask {
    expand_with_slacks(task, |_, relation| match relation {
        Relation::LessEqual => (1.0, Some(1.0)),
        Relation::GreaterEqual => (-1.0, Some(1.0)),
        Relation::Equal => (-1.0, None),
    })
}

/// Shared row rewrite: `row_rule(rhs, relation)` yields the factor applied to
/// the row and, for rows that get one, the coefficient of their new column.
fn expand_with_slacks<F>(task: &LpTask, row_rule: F) -> LpTask
where
    F: Fn(f64, Relation) -> (f64, Option<f64>),
{
    let n_vars = task.variable_count();
    let n_slack = task
        .relations()
        .iter()
        .filter(|&&r| r != Relation::Equal)
        .count();
    let width = n_vars + n_slack;

    let mut matrix = vec![vec![0.0; width]; task.constraint_count()];
    let mut rhs = vec![0.0; task.constraint_count()];
    let mut slack_idx = n_vars;

    for (i, row) in task.matrix().iter().enumerate() {
        let (sign, slack) = row_rule(task.rhs()[i], task.relations()[i]);
        for (j, &coef) in row.iter().enumerate() {
            matrix[i][j] = sign * coef;
        }
        if let Some(coef) = slack {
            matrix[i][slack_idx] = coef;
            slack_idx += 1;
        }
        rhs[i] = sign * task.rhs()[i];
    }

    let mut objective = task.objective().to_vec();
    objective.resize(width, 0.0);

    debug!(
        "standardised {} constraints: {} variables -> {}",
        task.constraint_count(),
        n_vars,
        width
    );

    LpTask::from_parts(
        objective,
        task.sense(),
        matrix,
        rhs,
        vec![Relation::Equal; task.constraint_count()],
    )
}

/// Normalise every row to the relation the dual transpose expects.
///
/// Maximisation tasks end up all `<=`, minimisation tasks all `>=`; rows that
/// point the other way are negated.
pub fn prepare_dual_form(task: &LpTask) -> Result<LpTask, SolverError> {
    let target = match task.sense() {
        Sense::Maximize => Relation::LessEqual,
        Sense::Minimize => Relation::GreaterEqual,
    };

    let mut matrix = Vec::with_capacity(task.constraint_count());
    let mut rhs = Vec::with_capacity(task.constraint_count());

    for (i, row) in task.matrix().iter().enumerate() {
        let relation = task.relations()[i];
        if relation == Relation::Equal {
            return Err(SolverError::EqualityInDual { row: i });
        }
        let sign = if relation == target { 1.0 } else { -1.0 };
        matrix.push(row.iter().map(|&coef| sign * coef).collect());
        rhs.push(sign * task.rhs()[i]);
    }

    Ok(LpTask::from_parts(
        task.objective().to_vec(),
        task.sense(),
        matrix,
        rhs,
        vec![target; task.constraint_count()],
    ))
}

/// Build the dual of an inequality-only task.
///
/// The rows are first normalised with [`prepare_dual_form`], then the matrix
/// is transposed, objective and RHS swap roles, and the sense flips. All dual
/// rows share one relation: `>=` for the dual of a maximisation, `<=` for the
/// dual of a minimisation.
pub fn to_dual_form(task: &LpTask) -> Result<LpTask, SolverError> {
    let prepared = prepare_dual_form(task)?;

    let n_dual_vars = prepared.constraint_count();
    let n_dual_rows = prepared.variable_count();

    let matrix: Vec<Vec<f64>> = (0..n_dual_rows)
        .map(|i| (0..n_dual_vars).map(|j| prepared.matrix()[j][i]).collect())
        .collect();

    let relation = match prepared.sense() {
        Sense::Maximize => Relation::GreaterEqual,
        Sense::Minimize => Relation::LessEqual,
    };

    debug!(
        "built dual: {} variables x {} constraints, sense {}",
        n_dual_vars,
        n_dual_rows,
        prepared.sense().flipped()
    );

    Ok(LpTask::from_parts(
        prepared.rhs().to_vec(),
        prepared.sense().flipped(),
        matrix,
        prepared.objective().to_vec(),
        vec![relation; n_dual_rows],
    ))
}
