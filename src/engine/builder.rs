use super::optimization::{CoefficientMap, Comparison, OptimizationModel};
use super::registry::VarRegistry;
use super::{objectives, rules};
use crate::config::ClosedDayPolicy;
use crate::context::SchedulerContext;
use crate::error::SchedError;
use tracing::{debug, warn};

/// Construit le modèle complet à partir d'un contexte zoné.
///
/// Passe unique, sans état partagé : le contexte n'est jamais modifié.
pub struct ModelBuilder<'a> {
    ctx: &'a SchedulerContext,
    closed_days: ClosedDayPolicy,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(ctx: &'a SchedulerContext) -> Self {
        Self {
            ctx,
            closed_days: ClosedDayPolicy::default(),
        }
    }

    pub fn with_closed_day_policy(mut self, policy: ClosedDayPolicy) -> Self {
        self.closed_days = policy;
        self
    }

    pub fn build(&self) -> Result<OptimizationModel, SchedError> {
        let mut model = OptimizationModel::new(VarRegistry::for_context(self.ctx)?);

        // contraintes dures
        self.add_eligibility_constraints(&mut model);
        self.add_availability_constraints(&mut model);
        self.add_max_one_shift_per_day_constraints(&mut model);
        self.add_min_members_per_day_constraints(&mut model);
        rules::add_pay_grade_rule_constraints(self.ctx, &mut model)?;
        self.add_operational_coverage_constraints(&mut model)?;

        // objectifs souples, additionnés sans pondération
        objectives::add_balance_workload(self.ctx, &mut model)?;
        objectives::add_minimize_shift_changes(self.ctx, &mut model)?;

        debug!(
            variables = model.variables.len(),
            constraints = model.constraints.len(),
            objective_terms = model.objective.as_ref().map_or(0, |o| o.terms.len()),
            "optimization model built"
        );
        Ok(model)
    }

    fn add_eligibility_constraints(&self, model: &mut OptimizationModel) {
        for (m, member) in self.ctx.members.iter().enumerate() {
            for (s, shift) in self.ctx.shift_types.iter().enumerate() {
                if self.ctx.is_eligible(member, shift) {
                    continue;
                }
                for day in 0..self.ctx.num_days() {
                    let var = model.variables.slot(m, day, s);
                    model.push(
                        format!("eligibility__{}__{day}__{}", member.id, shift.id),
                        CoefficientMap::new().with(var, 1.0),
                        Comparison::Eq,
                        0.0,
                    );
                }
            }
        }
    }

    fn add_availability_constraints(&self, model: &mut OptimizationModel) {
        for (m, member) in self.ctx.members.iter().enumerate() {
            for day in 0..self.ctx.num_days() {
                if !self.ctx.is_unavailable(&member.id, self.ctx.date_at(day)) {
                    continue;
                }
                for (s, shift) in self.ctx.shift_types.iter().enumerate() {
                    let var = model.variables.slot(m, day, s);
                    model.push(
                        format!("availability__{}__{day}__{}", member.id, shift.id),
                        CoefficientMap::new().with(var, 1.0),
                        Comparison::Eq,
                        0.0,
                    );
                }
            }
        }
    }

    fn add_max_one_shift_per_day_constraints(&self, model: &mut OptimizationModel) {
        for (m, member) in self.ctx.members.iter().enumerate() {
            for day in 0..self.ctx.num_days() {
                let mut coefficients = CoefficientMap::new();
                for s in 0..self.ctx.shift_types.len() {
                    coefficients.add(model.variables.slot(m, day, s), 1.0);
                }
                model.push(
                    format!("maxOneShiftPerDay__{}__{day}", member.id),
                    coefficients,
                    Comparison::Le,
                    1.0,
                );
            }
        }
    }

    fn add_min_members_per_day_constraints(&self, model: &mut OptimizationModel) {
        let min = f64::from(self.ctx.staffing.min_members_per_day);
        for day in 0..self.ctx.num_days() {
            let mut coefficients = CoefficientMap::new();
            for m in 0..self.ctx.members.len() {
                for s in 0..self.ctx.shift_types.len() {
                    coefficients.add(model.variables.slot(m, day, s), 1.0);
                }
            }
            model.push(
                format!("minMembersPerDay__{day}"),
                coefficients,
                Comparison::Ge,
                min,
            );
        }
    }

    /// Couverture des heures d'ouverture, chaque jour ouvert :
    /// Σ chevauchement·x ≥ durée d'ouverture (en minutes), soit Σ fraction·x ≥ 1.
    fn add_operational_coverage_constraints(
        &self,
        model: &mut OptimizationModel,
    ) -> Result<(), SchedError> {
        for day in 0..self.ctx.num_days() {
            let Some(window) = self.ctx.operational_span_on(day) else {
                let date = self.ctx.date_at(day);
                let weekday = self.ctx.weekday_at(day);
                match self.closed_days {
                    ClosedDayPolicy::Skip => {
                        debug!(%date, weekday, "no operational hours, day treated as closed");
                        continue;
                    }
                    ClosedDayPolicy::Reject => {
                        return Err(SchedError::MissingOperationalHours { date, weekday });
                    }
                }
            };

            // minutes entières : la ligne reste exacte en virgule fixe
            let mut coefficients = CoefficientMap::new();
            for (s, shift) in self.ctx.shift_types.iter().enumerate() {
                let minutes = self.ctx.shift_span_on(day, shift).overlap(&window);
                if minutes <= 0 {
                    continue;
                }
                for m in 0..self.ctx.members.len() {
                    coefficients.add(model.variables.slot(m, day, s), minutes as f64);
                }
            }

            if coefficients.is_empty() {
                warn!(day, date = %self.ctx.date_at(day), "operational coverage impossible");
                continue;
            }
            model.push(
                format!("operationalCoverage__{day}"),
                coefficients,
                Comparison::Ge,
                window.len() as f64,
            );
        }
        Ok(())
    }
}
