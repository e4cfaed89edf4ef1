//! Moteur : couverture, registre de variables, construction du modèle,
//! adaptateur solveur et relecture de la solution.

mod builder;
pub mod coverage;
mod mapper;
mod objectives;
pub mod optimization;
pub mod registry;
pub mod rules;
pub mod solver;

pub use builder::ModelBuilder;
pub use coverage::{DayCoverage, Segment, SegmentMask, ShiftCoverage, MAX_SEGMENTS};
pub use mapper::{SchedulerMetrics, SchedulerResult, SolutionMapper};
pub use optimization::{
    CoefficientMap, Comparison, LinearConstraint, Objective, ObjectiveSense, ObjectiveTerm,
    OptimizationModel, VarKind, RESOLUTION, SCALE,
};
pub use registry::{assignment_name, SlotKey, VarId, VarRegistry, VariableDef};
pub use rules::rule_windows;
pub use solver::{
    build_payload, scale_for_solver, unscale_from_solver, HttpSolver, SolveStatus, Solver,
    SolverOptions, SolverPayload, SolverResult,
};
