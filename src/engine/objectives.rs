//! Objectifs souples, ajoutés sans pondération à l'objectif de minimisation.

use super::optimization::{CoefficientMap, Comparison, OptimizationModel, VarKind, RESOLUTION};
use crate::context::SchedulerContext;
use crate::error::SchedError;

/// Équilibrage de la charge : Σ |heures(m) − moyenne|.
///
/// La moyenne est une variable continue encadrée à la résolution du solveur
/// (`0 ≤ Σ heures − n·moy ≤ n·RESOLUTION`) : une égalité stricte ne tient pas
/// une fois les coefficients passés en virgule fixe.
pub(crate) fn add_balance_workload(
    ctx: &SchedulerContext,
    model: &mut OptimizationModel,
) -> Result<(), SchedError> {
    let n = ctx.members.len();
    if n == 0 || ctx.shift_types.is_empty() {
        return Ok(());
    }

    // heures maximales atteignables par un membre : un créneau, le plus long, chaque jour
    let max_hours: f64 = (0..ctx.num_days())
        .map(|day| {
            ctx.shift_types
                .iter()
                .map(|shift| ctx.shift_hours_on(day, shift))
                .fold(0.0, f64::max)
        })
        .sum();

    let hours_by_member: Vec<CoefficientMap> = (0..n)
        .map(|m| {
            let mut hours = CoefficientMap::new();
            for day in 0..ctx.num_days() {
                for (s, shift) in ctx.shift_types.iter().enumerate() {
                    hours.add(model.variables.slot(m, day, s), ctx.shift_hours_on(day, shift));
                }
            }
            hours
        })
        .collect();

    let avg = model.variables.add(
        "balance_avgHours".to_string(),
        VarKind::Continuous,
        Some(0.0),
        Some(max_hours),
    )?;

    let mut total = CoefficientMap::new();
    for hours in &hours_by_member {
        total.extend_scaled(hours, 1.0);
    }
    total.add(avg, -(n as f64));
    model.push(
        "balance_avgHours_lower".to_string(),
        total.clone(),
        Comparison::Ge,
        0.0,
    );
    model.push(
        "balance_avgHours_upper".to_string(),
        total,
        Comparison::Le,
        n as f64 * RESOLUTION,
    );

    for (member, hours) in ctx.members.iter().zip(&hours_by_member) {
        let dev = model.variables.add(
            format!("balanceDeviation__{}", member.id),
            VarKind::Continuous,
            Some(0.0),
            Some(max_hours),
        )?;

        // heures − moy − dev ≤ 0
        let mut upper = hours.clone();
        upper.add(avg, -1.0);
        upper.add(dev, -1.0);
        model.push(
            format!("balance_dev_upper__{}", member.id),
            upper,
            Comparison::Le,
            0.0,
        );

        // moy − heures − dev ≤ 0
        let mut lower = CoefficientMap::new().with(avg, 1.0).with(dev, -1.0);
        lower.extend_scaled(hours, -1.0);
        model.push(
            format!("balance_dev_lower__{}", member.id),
            lower,
            Comparison::Le,
            0.0,
        );

        model.add_objective_term(dev, 1.0);
    }
    Ok(())
}

/// Changements de type de créneau d'un jour au suivant.
///
/// `aux ≥ x[d][i] + x[d+1][j] − 1` pour tout i ≠ j ; sans objet sous deux types.
pub(crate) fn add_minimize_shift_changes(
    ctx: &SchedulerContext,
    model: &mut OptimizationModel,
) -> Result<(), SchedError> {
    let shifts = &ctx.shift_types;
    if shifts.len() < 2 || ctx.num_days() < 2 {
        return Ok(());
    }

    for (m, member) in ctx.members.iter().enumerate() {
        for day in 0..ctx.num_days() - 1 {
            let aux = model.variables.add(
                format!("shiftChange__{}__{day}", member.id),
                VarKind::Binary,
                None,
                None,
            )?;
            for (i, from) in shifts.iter().enumerate() {
                for (j, to) in shifts.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let coefficients = CoefficientMap::new()
                        .with(model.variables.slot(m, day, i), 1.0)
                        .with(model.variables.slot(m, day + 1, j), 1.0)
                        .with(aux, -1.0);
                    model.push(
                        format!("shiftChange__{}__{day}__{}__{}", member.id, from.id, to.id),
                        coefficients,
                        Comparison::Le,
                        1.0,
                    );
                }
            }
            model.add_objective_term(aux, 1.0);
        }
    }
    Ok(())
}
