pub mod parser;
pub mod render;

pub use parser::{ParseError, Parser};
pub use render::{render_solution, render_step, render_tableau, render_task};
