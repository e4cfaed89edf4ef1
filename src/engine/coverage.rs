//! Découpe d'une journée en segments et masques de couverture par créneau.
//!
//! Les points de rupture (débuts/fins de créneaux + heures d'ouverture du
//! jour) sont triés et dédoublonnés ; deux points consécutifs forment un
//! segment. Les segments sont ordonnés, contigus et disjoints : on peut donc
//! les désigner par leur index, ce que font les masques.

use crate::context::SchedulerContext;
use crate::error::SchedError;
use crate::interval::{format_minutes, MinuteSpan};
use crate::model::ShiftTypeId;
use std::collections::{BTreeMap, BTreeSet};

/// Largeur des masques ; au-delà, `TooManySegments`.
pub const MAX_SEGMENTS: usize = u64::BITS as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub span: MinuteSpan,
    pub covering: Vec<ShiftTypeId>,
}

/// Un bit par segment couvert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SegmentMask(u64);

impl SegmentMask {
    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn contains(self, segment: usize) -> bool {
        segment < MAX_SEGMENTS && self.0 & (1u64 << segment) != 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    fn set(&mut self, segment: usize) {
        self.0 |= 1u64 << segment;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCoverage {
    pub weekday: u8,
    pub segments: Vec<Segment>,
    pub masks: BTreeMap<ShiftTypeId, SegmentMask>,
}

impl DayCoverage {
    pub fn mask(&self, shift: &ShiftTypeId) -> SegmentMask {
        self.masks.get(shift).copied().unwrap_or_default()
    }

    /// Rareté : somme de `1 / nb_créneaux_couvrants` sur les segments couverts.
    /// Un créneau qui couvre des segments peu couverts par ailleurs score plus haut.
    pub fn scarcity_score(&self, shift: &ShiftTypeId) -> f64 {
        let mask = self.mask(shift);
        self.segments
            .iter()
            .enumerate()
            .filter(|(idx, seg)| mask.contains(*idx) && !seg.covering.is_empty())
            .map(|(_, seg)| 1.0 / seg.covering.len() as f64)
            .sum()
    }

    /// Une ligne par segment : `HH:MM-HH:MM id1,id2` (`-` si rien ne couvre).
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|seg| {
                let covering = if seg.covering.is_empty() {
                    "-".to_string()
                } else {
                    seg.covering
                        .iter()
                        .map(ShiftTypeId::as_str)
                        .collect::<Vec<_>>()
                        .join(",")
                };
                format!(
                    "{}-{} {}",
                    format_minutes(seg.span.start),
                    format_minutes(seg.span.end),
                    covering
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct ShiftCoverage<'a> {
    ctx: &'a SchedulerContext,
}

impl<'a> ShiftCoverage<'a> {
    pub fn new(ctx: &'a SchedulerContext) -> Self {
        Self { ctx }
    }

    /// `weekday` : 1 = lundi … 7 = dimanche.
    pub fn calculate(&self, weekday: u8) -> Result<DayCoverage, SchedError> {
        if !(1..=7).contains(&weekday) {
            return Err(SchedError::InvalidWeekday(weekday));
        }
        let segments = self.sorted_segments(weekday)?;
        let masks = self.shift_masks(&segments);
        Ok(DayCoverage {
            weekday,
            segments,
            masks,
        })
    }

    fn sorted_segments(&self, weekday: u8) -> Result<Vec<Segment>, SchedError> {
        let mut points = BTreeSet::new();
        for st in &self.ctx.shift_types {
            let span = st.nominal_span();
            points.insert(span.start);
            points.insert(span.end);
        }
        if let Some(window) = self
            .ctx
            .operational_window(weekday)
            .filter(|w| !w.is_closed())
        {
            let span = MinuteSpan::from_times(window.start, window.end);
            points.insert(span.start);
            points.insert(span.end);
        }

        let points: Vec<i64> = points.into_iter().collect();
        let count = points.len().saturating_sub(1);
        if count > MAX_SEGMENTS {
            return Err(SchedError::TooManySegments {
                count,
                max: MAX_SEGMENTS,
            });
        }

        Ok(points
            .windows(2)
            .map(|pair| {
                let span = MinuteSpan::new(pair[0], pair[1]);
                let covering = self
                    .ctx
                    .shift_types
                    .iter()
                    .filter(|st| st.nominal_span().overlaps(&span))
                    .map(|st| st.id.clone())
                    .collect();
                Segment { span, covering }
            })
            .collect())
    }

    fn shift_masks(&self, segments: &[Segment]) -> BTreeMap<ShiftTypeId, SegmentMask> {
        let mut masks: BTreeMap<ShiftTypeId, SegmentMask> = self
            .ctx
            .shift_types
            .iter()
            .map(|st| (st.id.clone(), SegmentMask::default()))
            .collect();
        for (idx, segment) in segments.iter().enumerate() {
            for id in &segment.covering {
                if let Some(mask) = masks.get_mut(id) {
                    mask.set(idx);
                }
            }
        }
        masks
    }
}
