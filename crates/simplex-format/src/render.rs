use std::fmt::Write;

use simplex_solver::{LpTask, Solution, StepData, Tableau};

const CELL_WIDTH: usize = 10;

/// Task in the same row format the parser reads.
pub fn render_task(task: &LpTask) -> String {
    task.to_string()
}

/// Tableau as an aligned grid, one labelled row per basic variable plus `z`.
pub fn render_tableau(tableau: &Tableau, basis: &[usize]) -> String {
    let mut out = String::new();

    let _ = write!(out, "{:<6}|", "basis");
    for j in 0..tableau.variable_count() {
        let _ = write!(out, "{:>width$}", format!("x{}", j + 1), width = CELL_WIDTH);
    }
    let _ = writeln!(out, "{:>width$}", "rhs", width = CELL_WIDTH);

    for (i, row) in tableau.rows().iter().enumerate() {
        let label = match basis.get(i) {
            Some(col) if i < tableau.constraint_count() => format!("x{}", col + 1),
            _ => "z".to_string(),
        };
        let _ = write!(out, "{:<6}|", label);
        for &value in row {
            let _ = write!(out, "{:>width$.3}", clean(value), width = CELL_WIDTH);
        }
        out.push('\n');
    }

    out
}

/// Variable values followed by the optimal objective value.
///
/// With `original_count` set, only the first that many variables are listed.
pub fn render_solution(solution: &Solution, original_count: Option<usize>) -> String {
    let values = match original_count {
        Some(count) => solution.original_values(count),
        None => &solution.values,
    };

    let mut out = String::new();
    for (j, &value) in values.iter().enumerate() {
        let _ = writeln!(out, "  x{:<4} = {:.4}", j + 1, clean(value));
    }
    let _ = write!(out, "Optimal value: {:.4}", clean(solution.objective_value));
    out
}

pub fn render_step(data: &StepData<'_>) -> String {
    match data {
        StepData::Transform(task) => render_task(task),
        StepData::Tableau { tableau, basis } => render_tableau(tableau, basis),
        StepData::Solution(solution) => render_solution(solution, None),
    }
}

/// Avoid printing `-0.000`
fn clean(value: f64) -> f64 {
    if value.abs() < 5e-13 { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplex_solver::{PrimalSolver, Relation, Sense, SolverStep};

    fn small_task() -> LpTask {
        LpTask::new(
            vec![3.0, 2.0],
            Sense::Maximize,
            vec![vec![1.0, 1.0], vec![1.0, 0.0]],
            vec![4.0, 3.0],
            vec![Relation::LessEqual, Relation::LessEqual],
        )
        .unwrap()
    }

    #[test]
    fn test_render_tableau_labels_rows() {
        let mut solver = PrimalSolver::new(small_task());
        solver.move_to_next_step().unwrap();
        solver.move_to_next_step().unwrap();

        let text = render_step(&solver.step_data().unwrap());
        println!("{}", text);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("basis |"));
        assert!(lines[0].ends_with("rhs"));
        // x2 is already a unit column of row 0, so it starts basic there
        assert_eq!(solver.basis(), &[1, 3]);
        assert!(lines[1].starts_with("x2"));
        assert!(lines[2].starts_with("x4"));
        assert!(lines[3].starts_with("z"));
        // priced out: -3 + 1 in x1, 2 * 4 at the origin
        assert!(lines[3].contains("-1.000"), "{}", lines[3]);
        assert!(lines[3].contains("8.000"), "{}", lines[3]);
        assert!(!lines[3].contains("-2.000"), "{}", lines[3]);
    }

    #[test]
    fn test_render_solution() {
        let mut solver = PrimalSolver::new(small_task());
        let solution = solver.solve().unwrap();
        assert_eq!(solver.current_step(), SolverStep::Complete);

        let text = render_solution(&solution, Some(2));
        println!("{}", text);

        assert!(text.contains("x1    = 3.0000"));
        assert!(text.contains("x2    = 1.0000"));
        assert!(!text.contains("x3"));
        assert!(text.ends_with("Optimal value: 11.0000"));
    }

    #[test]
    fn test_render_task_round_trips_through_parser() {
        let task = small_task();
        let parsed = crate::Parser::parse(&render_task(&task)).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn test_clean_hides_negative_zero() {
        assert_eq!(format!("{:.3}", clean(-1e-15)), "0.000");
        assert_eq!(clean(-2.5), -2.5);
    }
}
