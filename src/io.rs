use crate::engine::SolverPayload;
use crate::service::MonthlySchedule;
use anyhow::Context;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Export JSON du planning (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, schedule: &MonthlySchedule) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(schedule)?;
    write_atomic(path.as_ref(), &json)
}

/// Export CSV des affectations proposées: header `date,team_member_id,shift_type_id`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, schedule: &MonthlySchedule) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    w.write_record(["date", "team_member_id", "shift_type_id"])?;
    for a in &schedule.proposed_assignments {
        let date = a.date.format("%Y-%m-%d").to_string();
        w.write_record([date.as_str(), a.team_member_id.as_str(), a.shift_type_id.as_str()])?;
    }
    let data = w.into_inner().context("flushing csv")?;
    write_atomic(path.as_ref(), &data)
}

/// Export du modèle tel qu'envoyé au solveur.
pub fn export_payload_json<P: AsRef<Path>>(path: P, payload: &SolverPayload) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(payload)?;
    write_atomic(path.as_ref(), &json)
}

/// Écriture dans un fichier temporaire du même dossier puis renommage.
fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("atomic rename to {}", path.display()))?;
    Ok(())
}
