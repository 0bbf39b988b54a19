//! Variable declaration with builder pattern.

use std::ops::Index;

use super::expr::LinExpr;

/// Handle to a variable owned by a [`Model`](super::Model).
///
/// Handles are plain column indices; they are only meaningful for the model
/// that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(usize);

impl Var {
    pub(crate) fn new(index: usize) -> Self {
        Var(index)
    }

    /// Column index of this variable in its model.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Real-valued.
    Continuous,
    /// Takes values in {0, 1}.
    Binary,
}

impl VarKind {
    /// Whether the solver must enforce integrality.
    pub fn is_integer(&self) -> bool {
        matches!(self, VarKind::Binary)
    }
}

/// Stored attributes of a declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableData {
    pub name: String,
    pub kind: VarKind,
    pub lb: f64,
    pub ub: f64,
}

/// Builder for declaring variables with various attributes.
#[derive(Debug, Clone)]
pub struct VariableBuilder {
    kind: VarKind,
    lb: f64,
    ub: f64,
    name: Option<String>,
}

impl VariableBuilder {
    /// A continuous variable with unbounded sign.
    pub fn continuous() -> Self {
        Self {
            kind: VarKind::Continuous,
            lb: f64::NEG_INFINITY,
            ub: f64::INFINITY,
            name: None,
        }
    }

    /// A binary variable.
    pub fn binary() -> Self {
        Self {
            kind: VarKind::Binary,
            lb: 0.0,
            ub: 1.0,
            name: None,
        }
    }

    /// Set the name of the variable.
    ///
    /// When used with [`Model::add_vars`](super::Model::add_vars) the name is
    /// a prefix and each element is named `name[j]`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set lower and upper bounds.
    pub fn bounds(mut self, lb: f64, ub: f64) -> Self {
        self.lb = lb;
        self.ub = ub;
        self
    }

    /// Constrain the variable to be non-negative (x >= 0).
    pub fn nonneg(mut self) -> Self {
        self.lb = self.lb.max(0.0);
        self
    }

    pub(crate) fn kind(&self) -> VarKind {
        self.kind
    }

    pub(crate) fn base_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn build(&self, name: String) -> VariableData {
        let (lb, ub) = match self.kind {
            VarKind::Binary => (self.lb.max(0.0), self.ub.min(1.0)),
            VarKind::Continuous => (self.lb, self.ub),
        };
        VariableData {
            name,
            kind: self.kind,
            lb,
            ub,
        }
    }
}

/// A vector of variables declared together, like `x[0..n]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarVec {
    vars: Vec<Var>,
}

impl VarVec {
    pub(crate) fn new(vars: Vec<Var>) -> Self {
        Self { vars }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Var> {
        self.vars.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Var> + '_ {
        self.vars.iter().copied()
    }

    pub fn as_slice(&self) -> &[Var] {
        &self.vars
    }

    /// Sum of all elements.
    pub fn sum(&self) -> LinExpr {
        let mut expr = LinExpr::zero();
        for &v in &self.vars {
            expr.add_term(v, 1.0);
        }
        expr
    }
}

impl Index<usize> for VarVec {
    type Output = Var;

    fn index(&self, i: usize) -> &Var {
        &self.vars[i]
    }
}

impl<'a> IntoIterator for &'a VarVec {
    type Item = Var;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Var>>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_is_free() {
        let data = VariableBuilder::continuous().build("x".into());
        assert_eq!(data.kind, VarKind::Continuous);
        assert!(data.lb.is_infinite() && data.lb < 0.0);
        assert!(data.ub.is_infinite() && data.ub > 0.0);
    }

    #[test]
    fn test_binary_bounds_clamped() {
        let data = VariableBuilder::binary().bounds(-3.0, 7.0).build("z".into());
        assert_eq!((data.lb, data.ub), (0.0, 1.0));
        assert!(data.kind.is_integer());
    }

    #[test]
    fn test_var_vec_sum() {
        let v = VarVec::new(vec![Var::new(0), Var::new(2), Var::new(5)]);
        let s = v.sum();
        assert_eq!(s.variables(), vec![Var::new(0), Var::new(2), Var::new(5)]);
        assert_eq!(s.evaluate(&[1.0, 9.0, 2.0, 9.0, 9.0, 3.0]), 6.0);
    }
}
