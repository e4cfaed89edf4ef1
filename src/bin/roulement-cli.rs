#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use roulement::{
    engine::{build_payload, HttpSolver, ShiftCoverage},
    io,
    model::{GenerationMode, TeamId},
    repository::JsonTeamRepository,
    service::{GenerateRequest, SchedulerService},
    time, ClosedDayPolicy, SchedulerConfig,
};
use std::sync::Arc;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification mensuelle (solveur externe)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON des équipes
    #[arg(long, global = true, default_value = "teams.json")]
    teams: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug)]
struct MonthArgs {
    #[arg(long)]
    team: String,
    #[arg(long)]
    year: i32,
    /// 1..=12
    #[arg(long)]
    month: u32,
    /// Fuseau IANA de l'équipe
    #[arg(long, default_value = "UTC")]
    tz: String,
}

#[derive(Args, Debug)]
struct ModelArgs {
    #[arg(long, default_value_t = 3)]
    min_members: u32,
    /// skip | reject
    #[arg(long, default_value_t = ClosedDayPolicy::Skip)]
    closed_days: ClosedDayPolicy,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer le planning d'un mois
    Generate {
        #[command(flatten)]
        month: MonthArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long, env = "ROULEMENT_SOLVER_URL", default_value = "http://localhost:8000/solve")]
        solver_url: String,
        /// Limite de résolution (secondes)
        #[arg(long, default_value_t = 100)]
        time_limit: u32,
        /// dry-run | replace
        #[arg(long, default_value_t = GenerationMode::DryRun)]
        mode: GenerationMode,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Exporter le modèle tel qu'il serait envoyé au solveur
    Model {
        #[command(flatten)]
        month: MonthArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long)]
        out: String,
    },

    /// Afficher les segments de couverture d'un jour de semaine
    Coverage {
        #[command(flatten)]
        month: MonthArgs,
        /// 1 = lundi … 7 = dimanche
        #[arg(long)]
        weekday: u8,
    },
}

fn config_from(model: &ModelArgs) -> SchedulerConfig {
    SchedulerConfig {
        min_members_per_day: model.min_members,
        closed_day_policy: model.closed_days,
        ..SchedulerConfig::default()
    }
}

fn service_for(teams: &str, config: SchedulerConfig) -> Result<SchedulerService> {
    let solver = HttpSolver::from_config(&config).context("building solver client")?;
    Ok(SchedulerService::new(
        Arc::new(JsonTeamRepository::open(teams)),
        Arc::new(solver),
        config,
    ))
}

fn request_from(month: &MonthArgs) -> GenerateRequest {
    GenerateRequest::new(&month.team, month.year, month.month, &month.tz)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Generate {
            month,
            model,
            solver_url,
            time_limit,
            mode,
            out_json,
            out_csv,
        } => {
            let config = SchedulerConfig {
                solver_url,
                time_limit_seconds: Some(time_limit),
                ..config_from(&model)
            };
            let service = service_for(&cli.teams, config)?;
            let schedule = service
                .generate_monthly(request_from(&month).with_mode(mode))
                .await?;

            if let Some(path) = out_json {
                io::export_schedule_json(path, &schedule)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &schedule)?;
            }
            for a in &schedule.proposed_assignments {
                println!("{} | {} | {}", a.date, a.team_member_id, a.shift_type_id);
            }

            if schedule.success {
                println!(
                    "OK: {} assignment(s), coverage {:.2}, fairness {:.2}",
                    schedule.metrics.total_slots_filled,
                    schedule.metrics.total_operational_coverage,
                    schedule.metrics.fairness_std_deviation
                );
                0
            } else {
                eprintln!("No feasible schedule for {} {}-{:02}", schedule.team_id, schedule.year, schedule.month);
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Model { month, model, out } => {
            let service = service_for(&cli.teams, config_from(&model))?;
            let (_, built) = service.prepare(&request_from(&month)).await?;
            let payload = build_payload(&built, Some(&service.config().solver_options()));
            io::export_payload_json(&out, &payload)?;
            println!(
                "Model written to {out}: {} variable(s), {} constraint(s)",
                payload.variables.len(),
                payload.constraints.len()
            );
            0
        }
        Commands::Coverage { month, weekday } => {
            let service = service_for(&cli.teams, SchedulerConfig::default())?;
            let period = time::get_period(month.year, month.month, &month.tz)?;
            let ctx = service
                .prepare_context(&TeamId::new(&month.team), &period)
                .await?;
            let coverage = ShiftCoverage::new(&ctx).calculate(weekday)?;
            println!("{}", coverage.render());
            for shift in &ctx.shift_types {
                println!("{}: scarcity {:.3}", shift.id, coverage.scarcity_score(&shift.id));
            }
            0
        }
    };

    std::process::exit(code);
}
