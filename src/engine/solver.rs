//! Adaptateur vers le solveur externe (HTTP/JSON).
//!
//! Le solveur ne manipule que des entiers : chaque ligne du modèle est
//! multipliée par [`SCALE`]. Les variables binaires gardent leur domaine
//! {0, 1} et leurs coefficients sont arrondis après mise à l'échelle ; les
//! variables entières/continues sont transmises en virgule fixe (valeur ×
//! `SCALE`) et portent donc l'échelle elles-mêmes.

use super::optimization::{Comparison, ObjectiveSense, OptimizationModel, VarKind, SCALE};
use super::registry::{VarId, VarRegistry};
use crate::config::SchedulerConfig;
use crate::error::SchedError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Borne de sécurité des entiers transmis (entiers 32 bits côté solveur).
pub const SAFE_INT_LIMIT: i64 = i32::MAX as i64;

pub fn scale_for_solver(value: f64) -> i64 {
    clamp_int((value * SCALE as f64).round())
}

pub fn unscale_from_solver(value: f64) -> f64 {
    value / SCALE as f64
}

fn clamp_int(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    (value as i64).clamp(-SAFE_INT_LIMIT, SAFE_INT_LIMIT)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolverOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadVarType {
    Bool,
    Int,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: PayloadVarType,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadTerm {
    pub var: String,
    pub coeff: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadConstraint {
    pub name: String,
    pub terms: Vec<PayloadTerm>,
    pub rhs: i64,
    pub op: Comparison,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadObjective {
    pub sense: ObjectiveSense,
    pub terms: Vec<PayloadTerm>,
}

/// Corps de la requête `POST <solver_url>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverPayload {
    pub variables: Vec<PayloadVariable>,
    pub constraints: Vec<PayloadConstraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<PayloadObjective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SolverOptions>,
}

/// Sérialise le modèle au format du solveur.
pub fn build_payload(model: &OptimizationModel, options: Option<&SolverOptions>) -> SolverPayload {
    let registry = &model.variables;

    let variables = registry
        .iter()
        .map(|(_, def)| match def.kind {
            VarKind::Binary => PayloadVariable {
                name: def.name.clone(),
                var_type: PayloadVarType::Bool,
                min: 0,
                max: 1,
            },
            VarKind::Integer | VarKind::Continuous => PayloadVariable {
                name: def.name.clone(),
                var_type: PayloadVarType::Int,
                min: def.lower.map_or(-SAFE_INT_LIMIT, scale_for_solver),
                max: def.upper.map_or(SAFE_INT_LIMIT, scale_for_solver),
            },
        })
        .collect();

    let constraints = model
        .constraints
        .iter()
        .map(|c| PayloadConstraint {
            name: c.name.clone(),
            terms: payload_terms(registry, &c.name, c.coefficients.iter()),
            rhs: scale_for_solver(c.rhs),
            op: c.op,
        })
        .collect();

    let objective = model.objective.as_ref().map(|o| PayloadObjective {
        sense: o.sense,
        terms: payload_terms(
            registry,
            "objective",
            o.terms.iter().map(|t| (t.var, t.coefficient)),
        ),
    });

    SolverPayload {
        variables,
        constraints,
        objective,
        options: options.cloned(),
    }
}

fn payload_terms(
    registry: &VarRegistry,
    row: &str,
    terms: impl Iterator<Item = (VarId, f64)>,
) -> Vec<PayloadTerm> {
    terms
        .map(|(var, coefficient)| {
            let fixed_point = registry
                .get(var)
                .is_some_and(|def| def.kind != VarKind::Binary);
            let coeff = if fixed_point {
                let rounded = coefficient.round();
                if (coefficient - rounded).abs() > f64::EPSILON {
                    warn!(row, var = registry.name(var), coefficient, "fractional coefficient on fixed-point variable rounded");
                }
                clamp_int(rounded)
            } else {
                scale_for_solver(coefficient)
            };
            PayloadTerm {
                var: registry.name(var).to_string(),
                coeff,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    ModelInvalid,
    #[serde(other)]
    Unknown,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

/// Réponse du solveur. `values` est `None` dès qu'il n'y a pas de solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub status: SolveStatus,
    #[serde(default)]
    pub values: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub objective_value: Option<f64>,
    #[serde(default)]
    pub solution_info: Option<String>,
    #[serde(default)]
    pub added_constraints: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SolverResult {
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: None,
            objective_value: None,
            solution_info: None,
            added_constraints: None,
            error: None,
        }
    }

    /// Valeur brute renvoyée par le solveur (en virgule fixe pour les
    /// variables non binaires, cf. [`unscale_from_solver`]).
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.as_ref()?.get(name).copied()
    }

    fn normalized(mut self) -> Self {
        if !self.status.has_solution() {
            self.values = None;
        }
        self
    }
}

/// Résolution d'un modèle.
///
/// Deux issues distinctes :
/// - `Ok(SolverResult)` sans `values` : le modèle est infaisable (ou non
///   résolu dans le temps imparti). Ce n'est pas une erreur.
/// - `Err(..)` : échec de transport ou réponse HTTP non 2xx. Fatal pour la
///   requête en cours, aucune nouvelle tentative.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(&self, model: &OptimizationModel) -> Result<SolverResult, SchedError>;
}

pub struct HttpSolver {
    client: reqwest::Client,
    url: String,
    options: SolverOptions,
}

impl HttpSolver {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, SchedError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            options: SolverOptions::default(),
        })
    }

    pub fn from_config(config: &SchedulerConfig) -> Result<Self, SchedError> {
        Ok(Self::new(config.solver_url.clone(), config.request_timeout)?
            .with_options(config.solver_options()))
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Solver for HttpSolver {
    async fn solve(&self, model: &OptimizationModel) -> Result<SolverResult, SchedError> {
        let payload = build_payload(model, Some(&self.options));
        debug!(
            url = %self.url,
            variables = payload.variables.len(),
            constraints = payload.constraints.len(),
            "sending model to solver"
        );

        let response = self.client.post(&self.url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SchedError::SolverHttp { status, body });
        }

        let result: SolverResult = response.json().await?;
        debug!(status = ?result.status, objective = ?result.objective_value, "solver answered");
        Ok(result.normalized())
    }
}
