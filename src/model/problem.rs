//! The `Model` container and its solve entry point.
//!
//! A model owns its variables, a list of named linear constraints, and a
//! quadratic objective. Solving lowers it to a [`StandardForm`] and hands that
//! to a [`Backend`]:
//! ```ignore
//! let mut model = Model::new("demo");
//! let x = model.add_var(VariableBuilder::continuous().name("x"));
//! let z = model.add_var(VariableBuilder::binary().name("z"));
//! model.add_constr("link", (x - 10.0 * z).leq(0.0));
//! model.set_objective(QuadExpr::square(x - 3.0, 1.0) + LinExpr::from(z), ObjSense::Minimize);
//! let solution = model.optimize(&Scip)?;
//! ```

use log::{debug, warn};

use super::constraint::Constraint;
use super::expr::QuadExpr;
use super::variable::{Var, VarKind, VarVec, VariableBuilder, VariableData};
use crate::error::{L0Error, Result};
use crate::solver::{stuff_problem, Backend, Settings, Solution, SolveStatus};

/// Direction of optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjSense {
    Minimize,
    Maximize,
}

/// Objective of a model.
#[derive(Debug, Clone)]
pub struct Objective {
    pub sense: ObjSense,
    pub expr: QuadExpr,
}

impl Objective {
    /// Check if this is a minimization.
    pub fn is_minimize(&self) -> bool {
        self.sense == ObjSense::Minimize
    }
}

/// A named constraint.
#[derive(Debug, Clone)]
pub struct NamedConstraint {
    pub name: String,
    pub constraint: Constraint,
}

/// A mixed-integer quadratic model.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    vars: Vec<VariableData>,
    constraints: Vec<NamedConstraint>,
    objective: Option<Objective>,
    settings: Settings,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Model {
            name: name.into(),
            vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            settings: Settings::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a single variable.
    pub fn add_var(&mut self, builder: VariableBuilder) -> Var {
        let var = Var::new(self.vars.len());
        let name = builder
            .base_name()
            .map(str::to_owned)
            .unwrap_or_else(|| default_name(builder.kind(), var.index()));
        self.vars.push(builder.build(name));
        var
    }

    /// Declare `n` variables sharing the same attributes, named `prefix[j]`.
    pub fn add_vars(&mut self, n: usize, builder: VariableBuilder) -> VarVec {
        let vars = (0..n)
            .map(|j| {
                let var = Var::new(self.vars.len());
                let name = match builder.base_name() {
                    Some(prefix) => format!("{}[{}]", prefix, j),
                    None => default_name(builder.kind(), var.index()),
                };
                self.vars.push(builder.build(name));
                var
            })
            .collect();
        VarVec::new(vars)
    }

    /// Add a named constraint and return its index.
    pub fn add_constr(&mut self, name: impl Into<String>, constraint: Constraint) -> usize {
        self.constraints.push(NamedConstraint {
            name: name.into(),
            constraint,
        });
        self.constraints.len() - 1
    }

    /// Add a family of constraints named `prefix[j]`.
    pub fn add_constrs(
        &mut self,
        prefix: &str,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Vec<usize> {
        constraints
            .into_iter()
            .enumerate()
            .map(|(j, c)| self.add_constr(format!("{}[{}]", prefix, j), c))
            .collect()
    }

    /// Set the objective, replacing any previous one.
    pub fn set_objective(&mut self, expr: impl Into<QuadExpr>, sense: ObjSense) {
        self.objective = Some(Objective {
            sense,
            expr: expr.into(),
        });
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn vars(&self) -> &[VariableData] {
        &self.vars
    }

    pub fn var_data(&self, var: Var) -> Option<&VariableData> {
        self.vars.get(var.index())
    }

    pub fn constraints(&self) -> &[NamedConstraint] {
        &self.constraints
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constrs(&self) -> usize {
        self.constraints.len()
    }

    /// Check if any variable is integer-constrained.
    pub fn has_integers(&self) -> bool {
        self.vars.iter().any(|v| v.kind.is_integer())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Toggle solver console output.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.settings.verbose = verbose;
    }

    /// Copy of this model with binary variables relaxed to continuous [0, 1].
    pub fn relaxed(&self) -> Model {
        let mut relaxed = self.clone();
        relaxed.name = format!("{}_relaxed", self.name);
        for v in &mut relaxed.vars {
            if v.kind == VarKind::Binary {
                v.kind = VarKind::Continuous;
            }
        }
        relaxed
    }

    /// Objective value at a point (one value per variable).
    pub fn evaluate_objective(&self, values: &[f64]) -> Result<f64> {
        let objective = self.require_objective()?;
        self.check_point(values)?;
        Ok(objective.expr.evaluate(values))
    }

    /// Largest bound or constraint violation at a point.
    pub fn max_violation(&self, values: &[f64]) -> Result<f64> {
        self.check_point(values)?;
        let bounds = self
            .vars
            .iter()
            .zip(values)
            .map(|(v, &x)| (v.lb - x).max(x - v.ub).max(0.0));
        let rows = self
            .constraints
            .iter()
            .map(|c| c.constraint.violation(values));
        Ok(bounds.chain(rows).fold(0.0, f64::max))
    }

    /// Check that every expression refers to variables of this model.
    pub fn validate(&self) -> Result<()> {
        let n = self.vars.len();
        for v in &self.vars {
            if v.lb.is_nan() || v.ub.is_nan() || v.lb > v.ub {
                return Err(L0Error::InvalidModel(format!(
                    "variable {} has invalid bounds [{}, {}]",
                    v.name, v.lb, v.ub
                )));
            }
        }
        let out_of_range = |vars: Vec<Var>| vars.into_iter().find(|v| v.index() >= n);
        for c in &self.constraints {
            if let Some(v) = out_of_range(c.constraint.variables()) {
                return Err(L0Error::InvalidModel(format!(
                    "constraint {} references unknown variable {}",
                    c.name,
                    v.index()
                )));
            }
        }
        if let Some(obj) = &self.objective {
            if let Some(v) = out_of_range(obj.expr.variables()) {
                return Err(L0Error::InvalidModel(format!(
                    "objective references unknown variable {}",
                    v.index()
                )));
            }
        }
        Ok(())
    }

    /// Solve the model with its own settings.
    pub fn optimize(&self, backend: &dyn Backend) -> Result<Solution> {
        self.optimize_with(backend, &self.settings)
    }

    /// Solve the model with custom settings.
    pub fn optimize_with(&self, backend: &dyn Backend, settings: &Settings) -> Result<Solution> {
        let objective = self.require_objective()?;
        self.validate()?;

        if self.has_integers() && !backend.supports_integers() {
            return Err(L0Error::Unsupported {
                backend: backend.name(),
                reason: "model has integer variables; solve `relaxed()` instead".into(),
            });
        }

        let stuffed = stuff_problem(self)?;
        debug!(
            "model {}: {} columns ({} user), {} rows, {} squared terms -> {}",
            self.name,
            stuffed.columns.len(),
            stuffed.num_user_vars,
            stuffed.rows.len(),
            stuffed.squares.len(),
            backend.name()
        );

        let mut solution = backend.solve(&stuffed, settings)?;

        // Adjust for maximization
        if !objective.is_minimize() {
            solution.value = solution.value.map(|v| -v);
        }
        // Drop auxiliary columns introduced by lowering
        if let Some(primal) = solution.primal.as_mut() {
            primal.truncate(self.vars.len());
        }

        // Check solution status
        match solution.status {
            SolveStatus::Optimal => Ok(solution),
            SolveStatus::Infeasible => Err(L0Error::SolverError("Problem is infeasible".into())),
            SolveStatus::Unbounded => Err(L0Error::SolverError("Problem is unbounded".into())),
            SolveStatus::InfeasibleOrUnbounded => Err(L0Error::SolverError(
                "Problem is infeasible or unbounded".into(),
            )),
            SolveStatus::NumericalError => Err(L0Error::NumericalError(
                "Solver encountered numerical difficulties".into(),
            )),
            status if solution.has_incumbent() => {
                warn!(
                    "model {}: solver stopped with status {:?}; reporting best solution found",
                    self.name, status
                );
                Ok(solution)
            }
            status => Err(L0Error::NoSolution(status)),
        }
    }

    fn require_objective(&self) -> Result<&Objective> {
        self.objective
            .as_ref()
            .ok_or_else(|| L0Error::InvalidModel("objective has not been set".into()))
    }

    fn check_point(&self, values: &[f64]) -> Result<()> {
        if values.len() != self.vars.len() {
            return Err(L0Error::ShapeMismatch {
                expected: format!("{} values", self.vars.len()),
                got: format!("{} values", values.len()),
            });
        }
        Ok(())
    }
}

fn default_name(kind: VarKind, index: usize) -> String {
    match kind {
        VarKind::Continuous => format!("C{}", index),
        VarKind::Binary => format!("B{}", index),
    }
}
