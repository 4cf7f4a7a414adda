//! Pivot selection and Gauss-Jordan elimination on a [`Tableau`].
//!
//! The free functions are stateless and shared by both methods; [`PivotRule`]
//! bundles the pieces each method needs so one solver type can drive either.

use log::debug;

use crate::convert::{to_dual_standard_form, to_standard_form};
use crate::error::SolverError;
use crate::tableau::Tableau;
use crate::task::{LpTask, Sense};

/// Tolerance shared by the optimality tests and ratio tests of both methods
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Primal optimality: no objective-row entry (excluding RHS) is negative.
pub fn is_optimal(tableau: &Tableau, tolerance: f64) -> bool {
    let row = tableau.objective_row();
    row[..tableau.variable_count()].iter().all(|&d| d >= -tolerance)
}

/// Column with the most negative reduced cost, first one on ties.
///
/// `None` means the tableau is already optimal.
pub fn find_entering_column(tableau: &Tableau, tolerance: f64) -> Option<usize> {
    let row = tableau.objective_row();

    let mut min_val = -tolerance;
    let mut min_col = None;

    for (j, &d) in row[..tableau.variable_count()].iter().enumerate() {
        if d < min_val {
            min_val = d;
            min_col = Some(j);
        }
    }

    min_col
}

/// Minimum-ratio test over rows with a positive entry in `column`.
///
/// `None` means the column is unbounded.
pub fn find_leaving_row(tableau: &Tableau, column: usize, tolerance: f64) -> Option<usize> {
    let rhs_col = tableau.rhs_column();

    let mut min_ratio = f64::INFINITY;
    let mut min_row = None;

    for (i, row) in tableau.rows()[..tableau.constraint_count()].iter().enumerate() {
        let val = row[column];
        if val > tolerance {
            let ratio = row[rhs_col] / val;
            if ratio < min_ratio {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }
    }

    min_row
}

/// Dual feasibility of the basic solution: every constraint RHS is non-negative.
pub fn is_dual_feasible(tableau: &Tableau, tolerance: f64) -> bool {
    (0..tableau.constraint_count()).all(|i| tableau.rhs(i) >= -tolerance)
}

/// Row with the most negative RHS, first one on ties.
///
/// `None` means the basic solution is already feasible.
pub fn find_dual_leaving_row(tableau: &Tableau, tolerance: f64) -> Option<usize> {
    let mut min_val = -tolerance;
    let mut min_row = None;

    for i in 0..tableau.constraint_count() {
        let rhs = tableau.rhs(i);
        if rhs < min_val {
            min_val = rhs;
            min_row = Some(i);
        }
    }

    min_row
}

/// Dual ratio test on the leaving `row`.
///
/// Only columns with a negative coefficient in the leaving row are eligible;
/// among them the smallest `|objective / coefficient|` wins, first one on
/// ties. `None` means no column can repair the row, so the task is infeasible.
pub fn find_dual_entering_column(tableau: &Tableau, row: usize, tolerance: f64) -> Option<usize> {
    let objective = tableau.objective_row();
    let leaving = &tableau.rows()[row];

    let mut min_ratio = f64::INFINITY;
    let mut min_col = None;

    for j in 0..tableau.variable_count() {
        let coef = leaving[j];
        if coef < -tolerance {
            let ratio = (objective[j] / coef).abs();
            if ratio < min_ratio {
                min_ratio = ratio;
                min_col = Some(j);
            }
        }
    }

    min_col
}

/// Gauss-Jordan step on `(row, column)` and the matching basis update.
///
/// The pivot row is scaled so the pivot cell is `1`, then `column` is
/// eliminated from every other row, the objective row included.
pub fn pivot(tableau: &mut Tableau, basis: &mut [usize], row: usize, column: usize) {
    basis[row] = column;

    let data = tableau.rows_mut();
    let n_cols = data[row].len();

    let pivot_val = data[row][column];
    for j in 0..n_cols {
        data[row][j] /= pivot_val;
    }
    // the pivot column is exact: 1 here, 0 in every other row
    data[row][column] = 1.0;

    let pivot_row = data[row].clone();
    for (i, other) in data.iter_mut().enumerate() {
        if i == row {
            continue;
        }
        let factor = other[column];
        if factor != 0.0 {
            for j in 0..n_cols {
                other[j] -= factor * pivot_row[j];
            }
            other[column] = 0.0;
        }
    }
}

/// The method-specific half of a simplex solve.
pub trait PivotRule {
    /// Short name for logs and display
    fn name(&self) -> &'static str;

    /// Rewrite the input task into the equality form this method starts from.
    fn transform(&self, task: &LpTask) -> LpTask;

    /// Reject tasks this method has no starting tableau for.
    fn check_start(&self, _task: &LpTask, _tolerance: f64) -> Result<(), SolverError> {
        Ok(())
    }

    /// Whether the tableau needs no further pivots.
    fn is_optimal(&self, tableau: &Tableau, tolerance: f64) -> bool;

    /// Choose the next `(row, column)` pivot.
    ///
    /// `Ok(None)` means the tableau is already optimal for this method.
    fn select_pivot(&self, tableau: &Tableau, tolerance: f64) -> Result<Option<(usize, usize)>, SolverError>;
}

/// Primal simplex: keep the RHS feasible, drive reduced costs non-negative.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimalRule;

/// Dual simplex: keep reduced costs non-negative, drive the RHS feasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct DualRule;

impl PivotRule for PrimalRule {
    fn name(&self) -> &'static str {
        "primal"
    }

    fn transform(&self, task: &LpTask) -> LpTask {
        to_standard_form(task)
    }

    fn is_optimal(&self, tableau: &Tableau, tolerance: f64) -> bool {
        is_optimal(tableau, tolerance)
    }

    fn select_pivot(&self, tableau: &Tableau, tolerance: f64) -> Result<Option<(usize, usize)>, SolverError> {
        let Some(column) = find_entering_column(tableau, tolerance) else {
            return Ok(None);
        };
        let Some(row) = find_leaving_row(tableau, column, tolerance) else {
            return Err(SolverError::Unbounded { column });
        };
        debug!("primal pivot: column {} enters, row {} leaves", column, row);
        Ok(Some((row, column)))
    }
}

impl PivotRule for DualRule {
    fn name(&self) -> &'static str {
        "dual"
    }

    fn transform(&self, task: &LpTask) -> LpTask {
        to_dual_standard_form(task)
    }

    fn check_start(&self, task: &LpTask, tolerance: f64) -> Result<(), SolverError> {
        let admissible = |c: f64| match task.sense() {
            Sense::Minimize => c >= -tolerance,
            Sense::Maximize => c <= tolerance,
        };
        match task.objective().iter().position(|&c| !admissible(c)) {
            Some(column) => Err(SolverError::NoStartingSolution {
                column,
                value: task.objective()[column],
            }),
            None => Ok(()),
        }
    }

    fn is_optimal(&self, tableau: &Tableau, tolerance: f64) -> bool {
        is_dual_feasible(tableau, tolerance)
    }

    fn select_pivot(&self, tableau: &Tableau, tolerance: f64) -> Result<Option<(usize, usize)>, SolverError> {
        let Some(row) = find_dual_leaving_row(tableau, tolerance) else {
            return Ok(None);
        };
        let Some(column) = find_dual_entering_column(tableau, row, tolerance) else {
            return Err(SolverError::Infeasible { row });
        };
        debug!("dual pivot: row {} leaves, column {} enters", row, column);
        Ok(Some((row, column)))
    }
}
