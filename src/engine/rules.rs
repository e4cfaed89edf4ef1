//! Règles de grade (contraintes dures uniquement).
//!
//! Fenêtres : `Day` = chaque jour ; `Week`/`RollingWeek` = chaque fenêtre
//! glissante de 7 jours entièrement dans la période ; `Month`/`RollingMonth`
//! = fenêtres glissantes de la longueur du mois de départ. Une fenêtre plus
//! longue que la période se réduit à une seule fenêtre couvrant la période.

use super::optimization::{CoefficientMap, Comparison, OptimizationModel, VarKind};
use crate::context::SchedulerContext;
use crate::error::SchedError;
use crate::model::{Metric, PayGradeRule, RuleOperator, TeamMember, TimeWindow};
use crate::time::{self, ZonedPeriod};

pub(crate) fn add_pay_grade_rule_constraints(
    ctx: &SchedulerContext,
    model: &mut OptimizationModel,
) -> Result<(), SchedError> {
    for rule in ctx.rules.iter().filter(|r| r.hard_constraint) {
        match rule.metric {
            Metric::ConsecutiveDaysWorked => add_consecutive_days(ctx, model, rule),
            Metric::UniqueMembersAssigned => add_unique_members(ctx, model, rule)?,
            Metric::DaysWorked | Metric::HoursWorked | Metric::DaysOff => {
                add_window_sums(ctx, model, rule)
            }
        }
    }
    Ok(())
}

/// Jours (indices) de chaque fenêtre de la règle.
pub fn rule_windows(window: TimeWindow, period: &ZonedPeriod) -> Vec<Vec<u32>> {
    let len = match window {
        TimeWindow::Day => 1,
        TimeWindow::Week | TimeWindow::RollingWeek => 7,
        TimeWindow::Month | TimeWindow::RollingMonth => time::days_in_month(period.first_date()),
    };
    sliding_windows(period.num_days(), len)
}

fn sliding_windows(num_days: u32, len: u32) -> Vec<Vec<u32>> {
    if num_days == 0 || len == 0 {
        return Vec::new();
    }
    if len >= num_days {
        return vec![(0..num_days).collect()];
    }
    (0..=num_days - len)
        .map(|start| (start..start + len).collect())
        .collect()
}

fn comparison_for(operator: RuleOperator) -> Comparison {
    match operator {
        RuleOperator::Max => Comparison::Le,
        RuleOperator::Min => Comparison::Ge,
    }
}

fn members_in_scope<'c>(
    ctx: &'c SchedulerContext,
    rule: &'c PayGradeRule,
) -> impl Iterator<Item = (usize, &'c TeamMember)> + 'c {
    ctx.members
        .iter()
        .enumerate()
        .filter(move |(_, member)| rule.applies_to(member))
}

/// Fenêtres de `threshold + 1` jours entièrement dans la période.
fn add_consecutive_days(ctx: &SchedulerContext, model: &mut OptimizationModel, rule: &PayGradeRule) {
    let num_days = ctx.num_days();
    let window_len = (rule.threshold as u32).saturating_add(1);
    if window_len > num_days {
        return;
    }
    let op = comparison_for(rule.operator);
    for (m, member) in members_in_scope(ctx, rule) {
        for start in 0..=num_days - window_len {
            let mut coefficients = CoefficientMap::new();
            for day in start..start + window_len {
                for s in 0..ctx.shift_types.len() {
                    coefficients.add(model.variables.slot(m, day, s), 1.0);
                }
            }
            model.push(
                format!("payGradeRule__{}__consec__{}__{start}", rule.id, member.id),
                coefficients,
                op,
                rule.threshold,
            );
        }
    }
}

/// Un indicateur binaire par membre et par fenêtre, lié dans les deux sens
/// aux affectations de la fenêtre ; la somme des indicateurs est bornée.
fn add_unique_members(
    ctx: &SchedulerContext,
    model: &mut OptimizationModel,
    rule: &PayGradeRule,
) -> Result<(), SchedError> {
    let op = comparison_for(rule.operator);
    for (w, days) in rule_windows(rule.time_window, &ctx.period).iter().enumerate() {
        let mut window_sum = CoefficientMap::new();
        for (m, member) in members_in_scope(ctx, rule) {
            let aux_name = format!("uniqueMember__{}__{}__{w}", rule.id, member.id);
            let aux = model
                .variables
                .add(aux_name.clone(), VarKind::Binary, None, None)?;

            // indicateur ≥ x : toute affectation force l'indicateur à 1
            let mut reverse = CoefficientMap::new().with(aux, 1.0);
            for &day in days {
                for s in 0..ctx.shift_types.len() {
                    let x = model.variables.slot(m, day, s);
                    let x_name = model.variables.name(x).to_string();
                    model.push(
                        format!("link_{aux_name}__{x_name}"),
                        CoefficientMap::new().with(aux, 1.0).with(x, -1.0),
                        Comparison::Ge,
                        0.0,
                    );
                    reverse.add(x, -1.0);
                }
            }
            // indicateur ≤ Σ x : pas d'indicateur à 1 pour un membre inactif
            model.push(format!("reverse_link_{aux_name}"), reverse, Comparison::Le, 0.0);
            window_sum.add(aux, 1.0);
        }
        model.push(
            format!("payGradeRule__{}__uniqueMembers_window_{w}", rule.id),
            window_sum,
            op,
            rule.threshold,
        );
    }
    Ok(())
}

/// Jours travaillés, heures travaillées, jours de repos.
///
/// Les jours de repos n'ont pas de variable propre : « au moins k jours de
/// repos sur n » devient « au plus n − k jours travaillés ».
fn add_window_sums(ctx: &SchedulerContext, model: &mut OptimizationModel, rule: &PayGradeRule) {
    let base_op = comparison_for(rule.operator);
    let windows = rule_windows(rule.time_window, &ctx.period);
    for (m, member) in members_in_scope(ctx, rule) {
        for (w, days) in windows.iter().enumerate() {
            let mut coefficients = CoefficientMap::new();
            for &day in days {
                for (s, shift) in ctx.shift_types.iter().enumerate() {
                    let coefficient = match rule.metric {
                        Metric::HoursWorked => ctx.shift_hours_on(day, shift),
                        _ => 1.0,
                    };
                    coefficients.add(model.variables.slot(m, day, s), coefficient);
                }
            }
            let (op, rhs) = match rule.metric {
                Metric::DaysOff => (base_op.flipped(), days.len() as f64 - rule.threshold),
                _ => (base_op, rule.threshold),
            };
            model.push(
                format!("payGradeRule__{}__{}__{w}", rule.id, member.id),
                coefficients,
                op,
                rhs,
            );
        }
    }
}
