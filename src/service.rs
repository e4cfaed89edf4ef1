//! Point d'entrée : génération d'un planning mensuel.

use crate::config::SchedulerConfig;
use crate::context::SchedulerContext;
use crate::engine::{ModelBuilder, OptimizationModel, SchedulerMetrics, SolutionMapper, Solver};
use crate::error::SchedError;
use crate::model::{Assignment, GenerationMode, ProposedAssignment, TeamId};
use crate::repository::TeamRepository;
use crate::time::{self, Period};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub team_id: TeamId,
    pub year: i32,
    pub month: u32,
    pub time_zone: String,
    pub mode: GenerationMode,
}

impl GenerateRequest {
    pub fn new<S: AsRef<str>>(team_id: S, year: i32, month: u32, time_zone: &str) -> Self {
        Self {
            team_id: TeamId::new(team_id),
            year,
            month,
            time_zone: time_zone.to_string(),
            mode: GenerationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Résultat d'une génération.
///
/// `assignments` n'a pas de type de créneau ; `proposed_assignments` l'a.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySchedule {
    pub run_id: Uuid,
    pub team_id: TeamId,
    pub year: i32,
    pub month: u32,
    pub mode: GenerationMode,
    pub success: bool,
    pub metrics: SchedulerMetrics,
    pub proposed_assignments: Vec<ProposedAssignment>,
    pub assignments: Vec<Assignment>,
}

/// Orchestration : période → photo → contexte → modèle → solveur → affectations.
///
/// Aucun état mutable : des appels concurrents pour des équipes différentes
/// sont indépendants.
#[derive(Clone)]
pub struct SchedulerService {
    repository: Arc<dyn TeamRepository>,
    solver: Arc<dyn Solver>,
    config: SchedulerConfig,
}

impl SchedulerService {
    pub fn new(
        repository: Arc<dyn TeamRepository>,
        solver: Arc<dyn Solver>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            repository,
            solver,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub async fn prepare_context(
        &self,
        team_id: &TeamId,
        period: &Period,
    ) -> Result<SchedulerContext, SchedError> {
        let snapshot = self.repository.get_team_snapshot(team_id, period).await?;
        SchedulerContext::from_snapshot(snapshot, self.config.staffing())
    }

    /// Contexte et modèle, sans appel au solveur.
    pub async fn prepare(
        &self,
        request: &GenerateRequest,
    ) -> Result<(SchedulerContext, OptimizationModel), SchedError> {
        let period = time::get_period(request.year, request.month, &request.time_zone)?;
        let ctx = self.prepare_context(&request.team_id, &period).await?;
        let model = ModelBuilder::new(&ctx)
            .with_closed_day_policy(self.config.closed_day_policy)
            .build()?;
        Ok((ctx, model))
    }

    pub async fn generate_monthly(
        &self,
        request: GenerateRequest,
    ) -> Result<MonthlySchedule, SchedError> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "generate_monthly",
            %run_id,
            team = %request.team_id,
            year = request.year,
            month = request.month,
        );
        self.run(run_id, request).instrument(span).await
    }

    async fn run(&self, run_id: Uuid, request: GenerateRequest) -> Result<MonthlySchedule, SchedError> {
        let (ctx, model) = self.prepare(&request).await?;
        let result = self.solver.solve(&model).await?;
        let mapped = SolutionMapper::new(&ctx, &model).map(&result);

        let tz = ctx.time_zone();
        let assignments = mapped
            .proposed_assignments
            .iter()
            .map(|a| Assignment {
                team_member_id: a.team_member_id.clone(),
                date: time::local_midnight(a.date, tz).with_timezone(&Utc),
            })
            .collect();

        info!(
            status = ?result.status,
            success = mapped.success,
            assignments = mapped.proposed_assignments.len(),
            mode = %request.mode,
            "schedule generated"
        );

        Ok(MonthlySchedule {
            run_id,
            team_id: request.team_id,
            year: request.year,
            month: request.month,
            mode: request.mode,
            success: mapped.success,
            metrics: mapped.metrics,
            proposed_assignments: mapped.proposed_assignments,
            assignments,
        })
    }
}
