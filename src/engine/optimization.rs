use super::registry::{VarId, VarRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Facteur de virgule fixe appliqué à la frontière du solveur.
pub const SCALE: i64 = 1000;

/// Plus petit écart représentable côté solveur.
pub const RESOLUTION: f64 = 1.0 / SCALE as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Binary,
    Integer,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
}

impl Comparison {
    pub fn flipped(self) -> Self {
        match self {
            Self::Le => Self::Ge,
            Self::Ge => Self::Le,
            Self::Eq => Self::Eq,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveSense {
    Minimize,
    Maximize,
}

/// Coefficients d'une expression linéaire, ordonnés par variable.
/// Ajouter deux fois la même variable cumule les coefficients.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientMap(BTreeMap<VarId, f64>);

impl CoefficientMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, var: VarId, coefficient: f64) {
        *self.0.entry(var).or_insert(0.0) += coefficient;
    }

    pub fn with(mut self, var: VarId, coefficient: f64) -> Self {
        self.add(var, coefficient);
        self
    }

    /// Ajoute `factor × other` terme à terme.
    pub fn extend_scaled(&mut self, other: &CoefficientMap, factor: f64) {
        for (var, c) in other.iter() {
            self.add(var, c * factor);
        }
    }

    pub fn get(&self, var: VarId) -> Option<f64> {
        self.0.get(&var).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.0.iter().map(|(v, c)| (*v, *c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub coefficients: CoefficientMap,
    pub op: Comparison,
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveTerm {
    pub var: VarId,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: ObjectiveSense,
    pub terms: Vec<ObjectiveTerm>,
}

/// Modèle d'optimisation abstrait : construit une fois par requête, jeté après résolution.
#[derive(Debug, Clone)]
pub struct OptimizationModel {
    pub variables: VarRegistry,
    pub constraints: Vec<LinearConstraint>,
    pub objective: Option<Objective>,
}

impl OptimizationModel {
    pub fn new(variables: VarRegistry) -> Self {
        Self {
            variables,
            constraints: Vec::new(),
            objective: Some(Objective {
                sense: ObjectiveSense::Minimize,
                terms: Vec::new(),
            }),
        }
    }

    pub fn push(&mut self, name: String, coefficients: CoefficientMap, op: Comparison, rhs: f64) {
        self.constraints.push(LinearConstraint {
            name,
            coefficients,
            op,
            rhs,
        });
    }

    /// Ajoute un terme à l'objectif (créé en minimisation s'il manque).
    pub fn add_objective_term(&mut self, var: VarId, coefficient: f64) {
        self.objective
            .get_or_insert_with(|| Objective {
                sense: ObjectiveSense::Minimize,
                terms: Vec::new(),
            })
            .terms
            .push(ObjectiveTerm { var, coefficient });
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn constraints_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a LinearConstraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.name.starts_with(prefix))
    }
}
