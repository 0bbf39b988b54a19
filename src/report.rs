//! Result block printed after a solve.

use std::fmt;

use crate::regression::L0Fit;

/// Summary statistics of a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Solve time in seconds.
    pub solve_time: f64,
    pub objective: f64,
    pub loss: f64,
    pub nonzeros: usize,
}

impl From<&L0Fit> for Report {
    fn from(fit: &L0Fit) -> Self {
        Report {
            solve_time: fit.solve_time,
            objective: fit.objective,
            loss: fit.loss,
            nonzeros: fit.nonzeros,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results")?;
        writeln!(f, " - sol. time : {:.2} sec", self.solve_time)?;
        writeln!(f, " - obj. value: {:.2}", self.objective)?;
        writeln!(f, " - loss value: {:.2}", self.loss)?;
        write!(f, " - non-zeros : {}", self.nonzeros)
    }
}
