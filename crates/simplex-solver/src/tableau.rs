use log::trace;

use crate::error::SolverError;
use crate::task::{LpTask, Relation, Sense};

/// Dense simplex tableau.
///
/// Rows `0..n` are constraints and row `n` is the objective (reduced cost)
/// row; columns `0..m` are variables and column `m` is the RHS. The objective
/// row is always kept in "maximise" orientation: a negative entry means the
/// column can still improve the objective.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTableau"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    sense: Sense,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTableau {
    data: Vec<Vec<f64>>,
    sense: Sense,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTableau> for Tableau {
    type Error = SolverError;

    fn try_from(raw: RawTableau) -> Result<Self, Self::Error> {
        Self::from_rows(raw.data, raw.sense)
    }
}

impl Tableau {
    /// Wrap raw rows; the last row is the objective row and the last column the RHS.
    pub fn from_rows(data: Vec<Vec<f64>>, sense: Sense) -> Result<Self, SolverError> {
        let width = data.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(SolverError::DimensionMismatch {
                what: "tableau columns",
                expected: 1,
                found: 0,
            });
        }
        if let Some(row) = data.iter().find(|row| row.len() != width) {
            return Err(SolverError::DimensionMismatch {
                what: "tableau columns",
                expected: width,
                found: row.len(),
            });
        }
        Ok(Self { data, sense })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn constraint_count(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of variable columns, excluding the RHS
    pub fn variable_count(&self) -> usize {
        self.data[0].len() - 1
    }

    pub fn rhs_column(&self) -> usize {
        self.variable_count()
    }

    pub fn objective_row(&self) -> &[f64] {
        &self.data[self.constraint_count()]
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.data[row][self.rhs_column()]
    }

    /// Bottom-right cell, in the tableau's internal maximising orientation
    pub fn value(&self) -> f64 {
        self.rhs(self.constraint_count())
    }

    /// Objective value of the current basic solution in the task's own sense
    pub fn objective_value(&self) -> f64 {
        match self.sense {
            Sense::Maximize => self.value(),
            Sense::Minimize => -self.value(),
        }
    }
}

/// Find one unit column per constraint row.
///
/// Columns are scanned left to right; a column counts when it holds exactly
/// one `1` and zeros elsewhere. Each such column is assigned to the row
/// holding its `1`, unless that row already has one. The result is indexed by
/// row and is returned only when every row is covered.
pub fn find_basis(matrix: &[Vec<f64>]) -> Result<Vec<usize>, SolverError> {
    let n_rows = matrix.len();
    let n_cols = matrix.first().map(Vec::len).unwrap_or(0);

    let mut basis: Vec<Option<usize>> = vec![None; n_rows];
    let mut found = 0;

    for j in 0..n_cols {
        if found == n_rows {
            break;
        }
        if let Some(row) = unit_row(matrix, j) {
            if basis[row].is_none() {
                basis[row] = Some(j);
                found += 1;
            }
        }
    }

    if found < n_rows {
        return Err(SolverError::NoInitialBasis {
            found,
            needed: n_rows,
        });
    }
    Ok(basis.into_iter().flatten().collect())
}

/// Row of the single `1` in column `col`, if the column is a unit column
fn unit_row(matrix: &[Vec<f64>], col: usize) -> Option<usize> {
    let mut one_at = None;
    for (i, row) in matrix.iter().enumerate() {
        let val = row[col];
        if val == 1.0 && one_at.is_none() {
            one_at = Some(i);
        } else if val != 0.0 {
            return None;
        }
    }
    one_at
}

/// Assemble the initial tableau of a standardised task.
///
/// Constraint rows are copied verbatim. The objective row starts as `-c` for
/// maximisation and `c` for minimisation, then every basic column is priced
/// out so the basis columns read zero in the objective row. After that the
/// bottom-right cell holds the objective at the starting basic solution.
pub fn build_tableau(task: &LpTask, basis: &[usize]) -> Result<Tableau, SolverError> {
    let n_rows = task.constraint_count();
    let n_vars = task.variable_count();

    if let Some(row) = task.relations().iter().position(|&r| r != Relation::Equal) {
        return Err(SolverError::NotStandardForm { row });
    }
    if basis.len() != n_rows {
        return Err(SolverError::DimensionMismatch {
            what: "basis",
            expected: n_rows,
            found: basis.len(),
        });
    }
    if let Some(&col) = basis.iter().find(|&&col| col >= n_vars) {
        return Err(SolverError::DimensionMismatch {
            what: "basis column",
            expected: n_vars,
            found: col,
        });
    }

    let mut data = vec![vec![0.0; n_vars + 1]; n_rows + 1];

    for (i, row) in task.matrix().iter().enumerate() {
        data[i][..n_vars].copy_from_slice(row);
        data[i][n_vars] = task.rhs()[i];
    }

    let sign = match task.sense() {
        Sense::Maximize => -1.0,
        Sense::Minimize => 1.0,
    };
    for (j, &coef) in task.objective().iter().enumerate() {
        data[n_rows][j] = sign * coef;
    }

    for (i, &col) in basis.iter().enumerate() {
        let factor = data[n_rows][col];
        if factor != 0.0 {
            for j in 0..=n_vars {
                data[n_rows][j] -= factor * data[i][j];
            }
        }
    }

    let tableau = Tableau {
        data,
        sense: task.sense(),
    };
    trace!("initial tableau: {:?}", tableau.rows());
    Ok(tableau)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::to_standard_form;

    fn scenario_a() -> LpTask {
        LpTask::new(
            vec![3.0, 5.0, 2.0],
            Sense::Maximize,
            vec![
                vec![1.0, 0.0, 1.0],
                vec![0.0, 2.0, 2.0],
                vec![3.0, 2.0, 1.0],
            ],
            vec![4.0, 12.0, 18.0],
            vec![Relation::LessEqual; 3],
        )
        .unwrap()
    }

    #[test]
    fn test_find_basis_picks_slacks() {
        let standard = to_standard_form(&scenario_a());
        let basis = find_basis(standard.matrix()).unwrap();
        assert_eq!(basis, vec![3, 4, 5]);
    }

    #[test]
    fn test_find_basis_indexes_by_row() {
        // column 0 is the unit column of row 1, column 2 of row 0
        let matrix = vec![vec![0.0, 2.0, 1.0], vec![1.0, 3.0, 0.0]];
        assert_eq!(find_basis(&matrix).unwrap(), vec![2, 0]);
    }

    #[test]
    fn test_find_basis_skips_duplicate_rows() {
        let matrix = vec![vec![1.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        assert_eq!(find_basis(&matrix).unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_find_basis_fails_without_unit_columns() {
        let matrix = vec![vec![1.0, 2.0], vec![1.0, 1.0]];
        assert_eq!(
            find_basis(&matrix),
            Err(SolverError::NoInitialBasis { found: 0, needed: 2 })
        );
    }

    #[test]
    fn test_build_tableau_layout() {
        let standard = to_standard_form(&scenario_a());
        let basis = find_basis(standard.matrix()).unwrap();
        let tableau = build_tableau(&standard, &basis).unwrap();

        assert_eq!(tableau.constraint_count(), 3);
        assert_eq!(tableau.variable_count(), 6);
        assert_eq!(tableau.objective_row(), &[-3.0, -5.0, -2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(tableau.rows()[1], vec![0.0, 2.0, 2.0, 0.0, 1.0, 0.0, 12.0]);
        assert_eq!(tableau.value(), 0.0);
    }

    #[test]
    fn test_build_tableau_minimize_keeps_costs() {
        let task = LpTask::new(
            vec![2.0, 1.0],
            Sense::Minimize,
            vec![vec![1.0, 1.0]],
            vec![3.0],
            vec![Relation::LessEqual],
        )
        .unwrap();
        let standard = to_standard_form(&task);
        let tableau = build_tableau(&standard, &[2]).unwrap();

        assert_eq!(tableau.objective_row(), &[2.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_build_tableau_prices_out_basic_costs() {
        // x2 is already a unit column of row 0 and has cost 4
        let task = LpTask::new(
            vec![1.0, 4.0, 0.0],
            Sense::Maximize,
            vec![vec![2.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]],
            vec![6.0, 5.0],
            vec![Relation::Equal, Relation::Equal],
        )
        .unwrap();
        let basis = find_basis(task.matrix()).unwrap();
        let tableau = build_tableau(&task, &basis).unwrap();

        assert_eq!(basis, vec![1, 2]);
        // dot product of basic costs with their RHS: 4 * 6 + 0 * 5
        assert!((tableau.value() - 24.0).abs() < 1e-9);
        assert_eq!(tableau.objective_row()[1], 0.0);
        assert!((tableau.objective_row()[0] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_tableau_rejects_short_basis() {
        let standard = to_standard_form(&scenario_a());
        assert!(matches!(
            build_tableau(&standard, &[3, 4]),
            Err(SolverError::DimensionMismatch { what: "basis", .. })
        ));
    }

    #[test]
    fn test_build_tableau_rejects_inequalities() {
        // raw task: its rows still carry <= relations
        let task = scenario_a();
        assert_eq!(
            build_tableau(&task, &[0, 1, 2]),
            Err(SolverError::NotStandardForm { row: 0 })
        );

        let mut relations = vec![Relation::Equal; 3];
        relations[2] = Relation::GreaterEqual;
        let mixed = LpTask::new(
            task.objective().to_vec(),
            task.sense(),
            task.matrix().to_vec(),
            task.rhs().to_vec(),
            relations,
        )
        .unwrap();
        assert_eq!(
            build_tableau(&mixed, &[0, 1, 2]),
            Err(SolverError::NotStandardForm { row: 2 })
        );
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Tableau::from_rows(vec![vec![1.0, 2.0], vec![1.0]], Sense::Maximize).unwrap_err();
        assert!(matches!(err, SolverError::DimensionMismatch { .. }));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_rows() {
        let tableau: Tableau =
            serde_json::from_str(r#"{"data":[[1.0,0.0,4.0],[-3.0,0.0,0.0]],"sense":"Maximize"}"#).unwrap();
        assert_eq!(tableau.variable_count(), 2);

        let ragged = serde_json::from_str::<Tableau>(r#"{"data":[[1.0,2.0],[1.0]],"sense":"Maximize"}"#);
        assert!(ragged.is_err());
        let empty = serde_json::from_str::<Tableau>(r#"{"data":[],"sense":"Minimize"}"#);
        assert!(empty.is_err());
    }
}
