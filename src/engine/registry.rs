//! Registre des variables de décision.
//!
//! Les variables d'affectation (membre, jour, créneau) sont allouées en premier
//! et de façon dense : leur handle *est* l'index du créneau, ce qui donne la
//! correspondance dans les deux sens sans table. Les noms ne servent qu'à la
//! frontière du solveur ; toute collision de nom est refusée.

use super::optimization::VarKind;
use crate::context::SchedulerContext;
use crate::error::SchedError;
use crate::model::{ShiftTypeId, TeamMemberId};
use std::collections::HashMap;

/// Handle opaque d'une variable du modèle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Créneau (membre, jour, type de créneau), en indices du contexte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub member: usize,
    pub day: u32,
    pub shift: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotDims {
    members: usize,
    days: u32,
    shifts: usize,
}

impl SlotDims {
    fn total(&self) -> usize {
        self.members * self.days as usize * self.shifts
    }
}

#[derive(Debug, Clone)]
pub struct VarRegistry {
    dims: SlotDims,
    defs: Vec<VariableDef>,
    by_name: HashMap<String, VarId>,
}

pub fn assignment_name(member: &TeamMemberId, day: u32, shift: &ShiftTypeId) -> String {
    format!("assign__{member}__{day}__{shift}")
}

impl VarRegistry {
    /// Alloue une variable binaire par (membre, jour, créneau).
    pub fn for_context(ctx: &SchedulerContext) -> Result<Self, SchedError> {
        let dims = SlotDims {
            members: ctx.members.len(),
            days: ctx.num_days(),
            shifts: ctx.shift_types.len(),
        };
        let mut registry = Self {
            dims,
            defs: Vec::with_capacity(dims.total()),
            by_name: HashMap::with_capacity(dims.total()),
        };
        for member in &ctx.members {
            for day in 0..dims.days {
                for shift in &ctx.shift_types {
                    registry.add(
                        assignment_name(&member.id, day, &shift.id),
                        VarKind::Binary,
                        None,
                        None,
                    )?;
                }
            }
        }
        Ok(registry)
    }

    /// Enregistre une variable ; erreur si le nom existe déjà.
    pub fn add(
        &mut self,
        name: String,
        kind: VarKind,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<VarId, SchedError> {
        if self.by_name.contains_key(&name) {
            return Err(SchedError::DuplicateVariable(name));
        }
        let id = VarId(self.defs.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.defs.push(VariableDef {
            name,
            kind,
            lower,
            upper,
        });
        Ok(id)
    }

    /// Variable d'affectation du créneau. Les indices doivent venir du même contexte.
    pub fn slot(&self, member: usize, day: u32, shift: usize) -> VarId {
        debug_assert!(member < self.dims.members && day < self.dims.days && shift < self.dims.shifts);
        let idx = (member * self.dims.days as usize + day as usize) * self.dims.shifts + shift;
        VarId(idx as u32)
    }

    /// Créneau d'une variable d'affectation ; `None` pour une variable auxiliaire.
    pub fn slot_of(&self, id: VarId) -> Option<SlotKey> {
        let idx = id.index();
        if idx >= self.dims.total() {
            return None;
        }
        let shift = idx % self.dims.shifts;
        let rest = idx / self.dims.shifts;
        let day = (rest % self.dims.days as usize) as u32;
        let member = rest / self.dims.days as usize;
        Some(SlotKey { member, day, shift })
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: VarId) -> Option<&VariableDef> {
        self.defs.get(id.index())
    }

    pub fn name(&self, id: VarId) -> &str {
        self.defs.get(id.index()).map_or("", |d| d.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &VariableDef)> + '_ {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, d)| (VarId(i as u32), d))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn assignment_count(&self) -> usize {
        self.dims.total()
    }
}
