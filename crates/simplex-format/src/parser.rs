use simplex_solver::{LpTask, Relation, Sense, SolverError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Line {line}: expected {expected} tokens, found {found}")]
    TokenCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: invalid number '{text}'")]
    InvalidNumber { line: usize, text: String },
    #[error("Line {line}: unknown relation '{text}' (expected <=, >= or =)")]
    UnknownRelation { line: usize, text: String },
    #[error("Line {line}: unknown objective type '{text}' (expected max or min)")]
    UnknownSense { line: usize, text: String },
    #[error("Missing objective line")]
    MissingObjective,
    #[error("No constraints given")]
    NoConstraints,
    #[error("Objective has no coefficients")]
    EmptyObjective,
    #[error("Invalid task: {0}")]
    Task(#[from] SolverError),
}

/// One meaningful input line with its 1-based line number
struct Line<'a> {
    number: usize,
    tokens: Vec<&'a str>,
}

/// Parser for the line-oriented task format.
///
/// ```text
/// # x1 x2 x3 relation rhs
/// 1 0 1 <= 4
/// 0 2 2 <= 12
/// 3 2 1 <= 18
/// 3 5 2 max
/// ```
///
/// Blank lines and `#` comments are skipped. The last line is the objective
/// and fixes the variable count; every other line is a constraint.
pub struct Parser;

impl Parser {
    pub fn parse(source: &str) -> Result<LpTask, ParseError> {
        let mut lines: Vec<Line<'_>> = source
            .lines()
            .enumerate()
            .filter_map(|(i, text)| {
                let text = text.trim();
                if text.is_empty() || text.starts_with('#') {
                    return None;
                }
                Some(Line {
                    number: i + 1,
                    tokens: text.split([' ', '\t']).filter(|t| !t.is_empty()).collect(),
                })
            })
            .collect();

        let objective_line = lines.pop().ok_or(ParseError::MissingObjective)?;
        if lines.is_empty() {
            return Err(ParseError::NoConstraints);
        }

        let (objective, sense) = Self::parse_objective(&objective_line)?;
        let n_vars = objective.len();

        let mut matrix = Vec::with_capacity(lines.len());
        let mut rhs = Vec::with_capacity(lines.len());
        let mut relations = Vec::with_capacity(lines.len());

        for line in &lines {
            let (coefficients, relation, value) = Self::parse_constraint(line, n_vars)?;
            matrix.push(coefficients);
            relations.push(relation);
            rhs.push(value);
        }

        Ok(LpTask::new(objective, sense, matrix, rhs, relations)?)
    }

    /// `c1 ... cm max|min`
    fn parse_objective(line: &Line<'_>) -> Result<(Vec<f64>, Sense), ParseError> {
        let Some((sense_text, coefficients)) = line.tokens.split_last() else {
            return Err(ParseError::MissingObjective);
        };
        if coefficients.is_empty() {
            return Err(ParseError::EmptyObjective);
        }

        let sense = sense_text
            .parse::<Sense>()
            .map_err(|_| ParseError::UnknownSense {
                line: line.number,
                text: sense_text.to_string(),
            })?;
        let coefficients = Self::parse_numbers(line.number, coefficients)?;

        Ok((coefficients, sense))
    }

    /// `a1 ... am REL b`
    fn parse_constraint(line: &Line<'_>, n_vars: usize) -> Result<(Vec<f64>, Relation, f64), ParseError> {
        if line.tokens.len() != n_vars + 2 {
            return Err(ParseError::TokenCount {
                line: line.number,
                expected: n_vars + 2,
                found: line.tokens.len(),
            });
        }

        let coefficients = Self::parse_numbers(line.number, &line.tokens[..n_vars])?;
        let relation_text = line.tokens[n_vars];
        let relation = relation_text
            .parse::<Relation>()
            .map_err(|_| ParseError::UnknownRelation {
                line: line.number,
                text: relation_text.to_string(),
            })?;
        let rhs = Self::parse_number(line.number, line.tokens[n_vars + 1])?;

        Ok((coefficients, relation, rhs))
    }

    fn parse_numbers(line: usize, tokens: &[&str]) -> Result<Vec<f64>, ParseError> {
        tokens.iter().map(|t| Self::parse_number(line, t)).collect()
    }

    fn parse_number(line: usize, text: &str) -> Result<f64, ParseError> {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseError::InvalidNumber {
                line,
                text: text.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task() {
        let source = "# classic example
            1 0 1 <= 4
            0 2 2 <= 12

            3 2 1 <= 18
            3 5 2 max";
        let task = Parser::parse(source).unwrap();

        assert_eq!(task.variable_count(), 3);
        assert_eq!(task.constraint_count(), 3);
        assert_eq!(task.sense(), Sense::Maximize);
        assert_eq!(task.objective(), &[3.0, 5.0, 2.0]);
        assert_eq!(task.matrix()[2], vec![3.0, 2.0, 1.0]);
        assert_eq!(task.rhs(), &[4.0, 12.0, 18.0]);
    }

    #[test]
    fn test_parse_mixed_relations_and_tabs() {
        let source = "1.5\t-2 >= -3\n1 1 = 2e1\n0.5 0.25 min\n";
        let task = Parser::parse(source).unwrap();

        assert_eq!(task.relations(), &[Relation::GreaterEqual, Relation::Equal]);
        assert_eq!(task.matrix()[0], vec![1.5, -2.0]);
        assert_eq!(task.rhs(), &[-3.0, 20.0]);
        assert_eq!(task.sense(), Sense::Minimize);
    }

    #[test]
    fn test_wrong_token_count_names_line() {
        let source = "1 2 <= 4\n1 <= 3\n1 1 max";
        assert_eq!(
            Parser::parse(source),
            Err(ParseError::TokenCount {
                line: 2,
                expected: 4,
                found: 3,
            })
        );
    }

    #[test]
    fn test_unknown_symbols() {
        let err = Parser::parse("1 1 =< 4\n1 1 max").unwrap_err();
        assert!(matches!(err, ParseError::UnknownRelation { line: 1, .. }));

        let err = Parser::parse("1 1 <= 4\n1 1 maximize").unwrap_err();
        assert!(matches!(err, ParseError::UnknownSense { line: 2, .. }));
    }

    #[test]
    fn test_invalid_number() {
        let err = Parser::parse("1 x <= 4\n1 1 max").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                line: 1,
                text: "x".to_string(),
            }
        );
        assert!(Parser::parse("1 NaN <= 4\n1 1 max").is_err());
    }

    #[test]
    fn test_missing_parts() {
        assert_eq!(Parser::parse("# nothing\n\n"), Err(ParseError::MissingObjective));
        assert_eq!(Parser::parse("1 2 max"), Err(ParseError::NoConstraints));
        assert_eq!(Parser::parse("1 <= 2\nmax"), Err(ParseError::EmptyObjective));
    }
}
