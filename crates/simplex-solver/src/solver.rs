use log::{debug, trace, warn};

use crate::error::SolverError;
use crate::pivot::{self, DualRule, PivotRule, PrimalRule, DEFAULT_TOLERANCE};
use crate::solution::Solution;
use crate::tableau::{self, Tableau};
use crate::task::LpTask;

/// Stage of a step-by-step solve. Steps only ever move forward.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SolverStep {
    Init,
    Transform,
    BuildTableau,
    Iteration,
    Complete,
}

/// Read-only snapshot of what the current step produced
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum StepData<'a> {
    /// The task after conversion to the method's standard form
    Transform(&'a LpTask),
    /// The current tableau and its basis (one column index per row)
    Tableau {
        tableau: &'a Tableau,
        basis: &'a [usize],
    },
    /// The final basic solution
    Solution(Solution),
}

/// What the solver holds at each step; the tableau exists exactly from
/// `BuildTableau` on.
#[derive(Debug, Clone)]
enum Stage {
    Init,
    Transformed,
    Pivoting {
        tableau: Tableau,
        basis: Vec<usize>,
        iterated: bool,
    },
    Complete {
        tableau: Tableau,
        basis: Vec<usize>,
    },
}

/// Step-by-step simplex solver.
///
/// The pivot rule decides which standard form the task is converted to and
/// how pivots are chosen; everything else is shared. Use [`PrimalSolver`] or
/// [`DualSolver`] rather than naming the rule directly.
#[derive(Debug, Clone)]
pub struct Solver<R: PivotRule> {
    rule: R,
    task: LpTask,
    stage: Stage,
    optimal: bool,
    iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Maximum iterations before giving up, unlimited when `None`
    max_iterations: Option<usize>,
    failure: Option<SolverError>,
}

pub type PrimalSolver = Solver<PrimalRule>;
pub type DualSolver = Solver<DualRule>;

impl<R: PivotRule + Default> Solver<R> {
    pub fn new(task: LpTask) -> Self {
        Self::with_rule(R::default(), task)
    }
}

impl<R: PivotRule> Solver<R> {
    pub fn with_rule(rule: R, task: LpTask) -> Self {
        Self {
            rule,
            task,
            stage: Stage::Init,
            optimal: false,
            iterations: 0,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: None,
            failure: None,
        }
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_max_iterations(mut self, max: Option<usize>) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn current_step(&self) -> SolverStep {
        match &self.stage {
            Stage::Init => SolverStep::Init,
            Stage::Transformed => SolverStep::Transform,
            Stage::Pivoting { iterated: false, .. } => SolverStep::BuildTableau,
            Stage::Pivoting { iterated: true, .. } => SolverStep::Iteration,
            Stage::Complete { .. } => SolverStep::Complete,
        }
    }

    /// The task as given, or as transformed once past `Init`
    pub fn task(&self) -> &LpTask {
        &self.task
    }

    pub fn tableau(&self) -> Option<&Tableau> {
        match &self.stage {
            Stage::Pivoting { tableau, .. } | Stage::Complete { tableau, .. } => Some(tableau),
            Stage::Init | Stage::Transformed => None,
        }
    }

    /// Basic column of every row; empty until the tableau is built
    pub fn basis(&self) -> &[usize] {
        match &self.stage {
            Stage::Pivoting { basis, .. } | Stage::Complete { basis, .. } => basis,
            Stage::Init | Stage::Transformed => &[],
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn method(&self) -> &'static str {
        self.rule.name()
    }

    /// Cached result of the last optimality test.
    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    /// The error that stopped this solve, if any.
    pub fn failure(&self) -> Option<&SolverError> {
        self.failure.as_ref()
    }

    pub fn state_description(&self) -> &'static str {
        match self.current_step() {
            SolverStep::Init => "Waiting to start.",
            SolverStep::Transform => "Transforming task to standard form.",
            SolverStep::BuildTableau => "Building initial simplex tableau.",
            SolverStep::Iteration => "Performing simplex iteration.",
            SolverStep::Complete => "Solution is complete.",
        }
    }

    /// Advance exactly one transition. A no-op once `Complete`.
    ///
    /// On failure the step does not advance, and every later call returns
    /// the same error.
    pub fn move_to_next_step(&mut self) -> Result<SolverStep, SolverError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let from = self.current_step();
        let stage = std::mem::replace(&mut self.stage, Stage::Init);
        let (stage, result) = self.advance(stage);
        self.stage = stage;
        let next = self.current_step();

        match result {
            Ok(()) => {
                if next != from {
                    debug!("{} solver: {:?} -> {:?}", self.rule.name(), from, next);
                }
                Ok(next)
            }
            Err(err) => {
                warn!("{} solver failed at {:?}: {}", self.rule.name(), from, err);
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Run until `Complete` and return the solution.
    pub fn solve(&mut self) -> Result<Solution, SolverError> {
        loop {
            if let Some(solution) = self.solution() {
                return Ok(solution);
            }
            self.move_to_next_step()?;
        }
    }

    /// The solution, once the solve is complete.
    pub fn solution(&self) -> Option<Solution> {
        match &self.stage {
            Stage::Complete { tableau, basis } => Some(Solution::from_tableau(tableau, basis)),
            _ => None,
        }
    }

    /// Snapshot for display; `None` before the first step.
    pub fn step_data(&self) -> Option<StepData<'_>> {
        match &self.stage {
            Stage::Init => None,
            Stage::Transformed => Some(StepData::Transform(&self.task)),
            Stage::Pivoting { tableau, basis, .. } => Some(StepData::Tableau { tableau, basis }),
            Stage::Complete { tableau, basis } => {
                Some(StepData::Solution(Solution::from_tableau(tableau, basis)))
            }
        }
    }

    /// One transition out of `stage`; a failed transition hands back the stage it started from.
    fn advance(&mut self, stage: Stage) -> (Stage, Result<(), SolverError>) {
        match stage {
            Stage::Init => {
                self.task = self.rule.transform(&self.task);
                (Stage::Transformed, Ok(()))
            }
            Stage::Transformed => match self.build_tableau() {
                Ok((tableau, basis)) => (
                    Stage::Pivoting {
                        tableau,
                        basis,
                        iterated: false,
                    },
                    Ok(()),
                ),
                Err(err) => (Stage::Transformed, Err(err)),
            },
            Stage::Pivoting { tableau, basis, .. } if self.optimal => {
                (Stage::Complete { tableau, basis }, Ok(()))
            }
            Stage::Pivoting {
                mut tableau,
                mut basis,
                iterated,
            } => {
                let result = self.perform_iteration(&mut tableau, &mut basis);
                let iterated = iterated || result.is_ok();
                (
                    Stage::Pivoting {
                        tableau,
                        basis,
                        iterated,
                    },
                    result,
                )
            }
            complete @ Stage::Complete { .. } => (complete, Ok(())),
        }
    }

    fn build_tableau(&mut self) -> Result<(Tableau, Vec<usize>), SolverError> {
        self.rule.check_start(&self.task, self.tolerance)?;

        let basis = tableau::find_basis(self.task.matrix())?;
        let tableau = tableau::build_tableau(&self.task, &basis)?;

        self.optimal = self.rule.is_optimal(&tableau, self.tolerance);
        Ok((tableau, basis))
    }

    fn perform_iteration(&mut self, tableau: &mut Tableau, basis: &mut [usize]) -> Result<(), SolverError> {
        if let Some(limit) = self.max_iterations {
            if self.iterations >= limit {
                return Err(SolverError::IterationLimit { limit });
            }
        }

        match self.rule.select_pivot(tableau, self.tolerance)? {
            Some((row, column)) => {
                pivot::pivot(tableau, basis, row, column);
                self.iterations += 1;
                trace!("tableau after iteration {}: {:?}", self.iterations, tableau.rows());
                self.optimal = self.rule.is_optimal(tableau, self.tolerance);
            }
            None => self.optimal = true,
        }
        Ok(())
    }
}
