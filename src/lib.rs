#![forbid(unsafe_code)]
//! Roulement — moteur de planification mensuelle d'équipes.
//!
//! - Contexte zoné : tout est calculé dans le fuseau de l'équipe.
//! - Compilation des règles en modèle d'optimisation linéaire.
//! - Résolution déléguée à un solveur externe (HTTP/JSON).
//! - Aucune persistance des résultats ; exports JSON/CSV en dehors du service.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod interval;
pub mod io;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;

pub use config::{ClosedDayPolicy, SchedulerConfig};
pub use context::SchedulerContext;
pub use engine::{
    DayCoverage, HttpSolver, ModelBuilder, OptimizationModel, SchedulerMetrics, SchedulerResult,
    ShiftCoverage, SolutionMapper, SolveStatus, Solver, SolverResult,
};
pub use error::SchedError;
pub use model::{
    Assignment, GenerationMode, Metric, PayGradeRule, ProposedAssignment, RuleOperator,
    ShiftType, TeamId, TeamMember, TeamSnapshot, TimeWindow,
};
pub use repository::{JsonTeamRepository, MemoryTeamRepository, TeamRecord, TeamRepository};
pub use service::{GenerateRequest, MonthlySchedule, SchedulerService};
pub use time::{get_period, Period, ZonedPeriod};
