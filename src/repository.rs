//! Accès aux données d'équipe.
//!
//! Le service ne connaît que le trait [`TeamRepository`] ; deux
//! implémentations locales sont fournies (mémoire, fichier JSON).

use crate::error::SchedError;
use crate::model::{
    ExistingAssignment, OperationalHour, PayGrade, PayGradeRule, PayGradeShiftType, ShiftType,
    Team, TeamId, TeamMember, TeamSnapshot, Unavailability,
};
use crate::time::Period;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Photo de l'équipe pour la période ; `UnknownTeam` si absente.
    async fn get_team_snapshot(
        &self,
        team_id: &TeamId,
        period: &Period,
    ) -> Result<TeamSnapshot, SchedError>;
}

/// Équipe telle que stockée, indépendamment de toute période.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team: Team,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub pay_grades: Vec<PayGrade>,
    #[serde(default)]
    pub shift_types: Vec<ShiftType>,
    #[serde(default)]
    pub pay_grade_shift_types: Vec<PayGradeShiftType>,
    #[serde(default)]
    pub pay_grade_rules: Vec<PayGradeRule>,
    #[serde(default)]
    pub operational_hours: Vec<OperationalHour>,
    #[serde(default)]
    pub unavailabilities: Vec<Unavailability>,
    #[serde(default)]
    pub assignments: Vec<ExistingAssignment>,
}

impl TeamRecord {
    /// Ne garde que les indisponibilités et affectations comprises dans la période.
    pub fn snapshot(&self, period: &Period) -> TeamSnapshot {
        TeamSnapshot {
            team: self.team.clone(),
            team_members: self.team_members.clone(),
            pay_grades: self.pay_grades.clone(),
            shift_types: self.shift_types.clone(),
            pay_grade_shift_types: self.pay_grade_shift_types.clone(),
            pay_grade_rules: self.pay_grade_rules.clone(),
            operational_hours: self.operational_hours.clone(),
            unavailabilities: self
                .unavailabilities
                .iter()
                .filter(|u| period.contains(u.date))
                .cloned()
                .collect(),
            assignments: self
                .assignments
                .iter()
                .filter(|a| period.contains(a.date))
                .cloned()
                .collect(),
            period: *period,
        }
    }
}

/// Fichier de stockage : `{ "teams": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStore {
    #[serde(default)]
    pub teams: Vec<TeamRecord>,
}

impl TeamStore {
    pub fn find(&self, team_id: &TeamId) -> Option<&TeamRecord> {
        self.teams.iter().find(|t| &t.team.id == team_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTeamRepository {
    store: TeamStore,
}

impl MemoryTeamRepository {
    pub fn new(teams: Vec<TeamRecord>) -> Self {
        Self {
            store: TeamStore { teams },
        }
    }

    pub fn insert(&mut self, record: TeamRecord) {
        self.store.teams.retain(|t| t.team.id != record.team.id);
        self.store.teams.push(record);
    }
}

#[async_trait]
impl TeamRepository for MemoryTeamRepository {
    async fn get_team_snapshot(
        &self,
        team_id: &TeamId,
        period: &Period,
    ) -> Result<TeamSnapshot, SchedError> {
        self.store
            .find(team_id)
            .map(|record| record.snapshot(period))
            .ok_or_else(|| SchedError::UnknownTeam(team_id.to_string()))
    }
}

/// Relit le fichier à chaque requête : les modifications externes sont vues
/// sans redémarrage.
pub struct JsonTeamRepository {
    path: PathBuf,
}

impl JsonTeamRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> anyhow::Result<TeamStore> {
        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let store: TeamStore = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(store)
    }
}

#[async_trait]
impl TeamRepository for JsonTeamRepository {
    async fn get_team_snapshot(
        &self,
        team_id: &TeamId,
        period: &Period,
    ) -> Result<TeamSnapshot, SchedError> {
        let store = self.load().await?;
        store
            .find(team_id)
            .map(|record| record.snapshot(period))
            .ok_or_else(|| SchedError::UnknownTeam(team_id.to_string()))
    }
}
