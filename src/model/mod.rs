//! Solver-agnostic modeling layer.
//!
//! This module provides:
//! - Variable declaration (continuous and binary, named, bounded)
//! - Linear, affine-vector and quadratic expressions
//! - Linear constraints
//! - The `Model` container with objective and solve entry point

pub mod constraint;
pub mod expr;
pub mod problem;
pub mod variable;

pub use constraint::{Constraint, ConstraintExt};
pub use expr::{AffineVec, LinExpr, QuadExpr};
pub use problem::{Model, NamedConstraint, ObjSense, Objective};
pub use variable::{Var, VarKind, VarVec, VariableBuilder, VariableData};
