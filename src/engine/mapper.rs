use super::optimization::OptimizationModel;
use super::solver::{unscale_from_solver, SolverResult};
use crate::context::SchedulerContext;
use crate::model::ProposedAssignment;
use serde::Serialize;
use std::collections::BTreeSet;

/// Indicateurs d'une exécution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchedulerMetrics {
    /// jours × types de créneau
    pub total_slots_required: usize,
    pub total_slots_filled: usize,
    /// Part des jours ayant au moins une affectation.
    pub total_operational_coverage: f64,
    /// Écart-type (population) du nombre d'affectations par membre.
    pub fairness_std_deviation: f64,
    pub total_hard_constraint_violations: usize,
    pub total_soft_penalty: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchedulerResult {
    pub success: bool,
    pub proposed_assignments: Vec<ProposedAssignment>,
    pub metrics: SchedulerMetrics,
}

/// Relit une réponse du solveur à travers le registre du modèle.
pub struct SolutionMapper<'a> {
    ctx: &'a SchedulerContext,
    model: &'a OptimizationModel,
}

impl<'a> SolutionMapper<'a> {
    pub fn new(ctx: &'a SchedulerContext, model: &'a OptimizationModel) -> Self {
        Self { ctx, model }
    }

    /// N'échoue jamais : sans valeurs, résultat vide et `success = false`.
    pub fn map(&self, result: &SolverResult) -> SchedulerResult {
        let Some(values) = result.values.as_ref() else {
            return SchedulerResult::default();
        };

        let registry = &self.model.variables;
        let mut proposed: Vec<ProposedAssignment> = registry
            .iter()
            .filter_map(|(id, def)| {
                let slot = registry.slot_of(id)?;
                let value = values.get(&def.name)?;
                if (value - 1.0).abs() > f64::EPSILON {
                    return None;
                }
                Some(ProposedAssignment {
                    date: self.ctx.date_at(slot.day),
                    team_member_id: self.ctx.members[slot.member].id.clone(),
                    shift_type_id: self.ctx.shift_types[slot.shift].id.clone(),
                })
            })
            .collect();
        proposed.sort();

        let metrics = self.metrics(&proposed, result);
        SchedulerResult {
            success: true,
            proposed_assignments: proposed,
            metrics,
        }
    }

    fn metrics(&self, proposed: &[ProposedAssignment], result: &SolverResult) -> SchedulerMetrics {
        let num_days = self.ctx.num_days() as usize;

        let covered_days: BTreeSet<_> = proposed.iter().map(|a| a.date).collect();
        let total_operational_coverage = if num_days == 0 {
            0.0
        } else {
            covered_days.len() as f64 / num_days as f64
        };

        let counts: Vec<f64> = self
            .ctx
            .members
            .iter()
            .map(|m| proposed.iter().filter(|a| a.team_member_id == m.id).count() as f64)
            .collect();

        SchedulerMetrics {
            total_slots_required: num_days * self.ctx.shift_types.len(),
            total_slots_filled: proposed.len(),
            total_operational_coverage,
            fairness_std_deviation: population_std_dev(&counts),
            total_hard_constraint_violations: 0,
            total_soft_penalty: result.objective_value.map_or(0.0, unscale_from_solver),
        }
    }
}

fn population_std_dev(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
