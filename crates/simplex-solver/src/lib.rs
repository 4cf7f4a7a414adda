mod convert;
mod error;
mod pivot;
mod solution;
mod solver;
mod tableau;
mod task;

pub use convert::{prepare_dual_form, to_dual_form, to_dual_standard_form, to_standard_form};
pub use error::SolverError;
pub use pivot::{
    find_dual_entering_column, find_dual_leaving_row, find_entering_column, find_leaving_row,
    is_dual_feasible, is_optimal, pivot, DualRule, PivotRule, PrimalRule, DEFAULT_TOLERANCE,
};
pub use solution::Solution;
pub use solver::{DualSolver, PrimalSolver, Solver, SolverStep, StepData};
pub use tableau::{build_tableau, find_basis, Tableau};
pub use task::{LpTask, Relation, Sense};
