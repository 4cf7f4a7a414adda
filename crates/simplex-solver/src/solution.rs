use crate::tableau::Tableau;

/// The result of a completed solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Value of every tableau variable, slacks included; non-basic ones are 0
    pub values: Vec<f64>,
    /// Optimal objective value, in the sense of the solved task
    pub objective_value: f64,
}

impl Solution {
    /// Read the basic solution off a tableau.
    pub fn from_tableau(tableau: &Tableau, basis: &[usize]) -> Self {
        let mut values = vec![0.0; tableau.variable_count()];
        for (i, &basic) in basis.iter().enumerate() {
            values[basic] = tableau.rhs(i);
        }

        Self {
            values,
            objective_value: tableau.objective_value(),
        }
    }

    /// Values of the first `count` variables, i.e. those of the task before
    /// slack and surplus columns were appended.
    pub fn original_values(&self, count: usize) -> &[f64] {
        &self.values[..count.min(self.values.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Sense;

    #[test]
    fn test_reads_basic_values() {
        let tableau = Tableau::from_rows(
            vec![
                vec![0.0, 1.0, 1.0, 3.0],
                vec![1.0, 0.0, -1.0, 2.0],
                vec![0.0, 0.0, 4.0, -9.0],
            ],
            Sense::Minimize,
        )
        .unwrap();

        let solution = Solution::from_tableau(&tableau, &[1, 0]);

        assert_eq!(solution.values, vec![2.0, 3.0, 0.0]);
        assert_eq!(solution.original_values(2), &[2.0, 3.0]);
        assert_eq!(solution.original_values(10).len(), 3);
        // minimisation tableaux hold the negated objective
        assert_eq!(solution.objective_value, 9.0);
    }
}
