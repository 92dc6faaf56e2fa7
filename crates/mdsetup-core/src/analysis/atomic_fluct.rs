use super::align::align_to_first;
use super::error::AnalysisError;
use super::progress::{Progress, ProgressReporter};
use crate::core::io::results::{DataField, NamedFields};
use crate::core::models::table::Table;
use crate::core::models::trajectory::Trajectory;
use crate::core::selection::AtomMask;
use nalgebra::DMatrix;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub const RESIDUE_COLUMN: &str = "Residue";
pub const RMSF_COLUMN: &str = "r.m.s.f. (Å)";

/// Per-residue RMSF tables keyed by the atom selection they were computed for, kept in the
/// order the selections were requested.
#[derive(Debug, Clone, Default)]
pub struct ResidueFluctuationSet {
    tables: Vec<(AtomMask, Table)>,
}

impl ResidueFluctuationSet {
    pub fn get(&self, mask: AtomMask) -> Option<&Table> {
        self.tables
            .iter()
            .find(|(m, _)| *m == mask)
            .map(|(_, table)| table)
    }

    pub fn contains(&self, mask: AtomMask) -> bool {
        self.get(mask).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AtomMask, &Table)> {
        self.tables.iter().map(|(mask, table)| (*mask, table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl NamedFields for ResidueFluctuationSet {
    fn fields(&self) -> Vec<(&str, DataField<'_>)> {
        self.tables
            .iter()
            .map(|(mask, table)| (mask.key(), DataField::Table(table)))
            .collect()
    }
}

/// Computes the per-residue RMSF for every mask in `masks`.
///
/// Duplicate masks (such as `heavy` and `noh`) are computed once.
#[instrument(skip_all, name = "residue_fluctuations")]
pub fn calculate_residue_fluctuations(
    trajectory: &Trajectory,
    masks: &[AtomMask],
    reporter: &ProgressReporter,
) -> Result<ResidueFluctuationSet, AnalysisError> {
    let mut set = ResidueFluctuationSet::default();
    reporter.report(Progress::TaskStart {
        total_steps: masks.len() as u64,
    });
    for &mask in masks {
        if !set.contains(mask) {
            debug!(selection = mask.expression(), "Calculating r.m.s.f. by residue");
            set.tables.push((mask, residue_fluctuations(trajectory, mask)?));
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    Ok(set)
}

/// RMSF of the atoms selected by `mask`, averaged per residue with mass weights.
///
/// Frames are first fitted onto the first frame using the selected atoms. Residues without any
/// selected atom are left out of the table.
pub fn residue_fluctuations(
    trajectory: &Trajectory,
    mask: AtomMask,
) -> Result<Table, AnalysisError> {
    let topology = trajectory.topology();
    let atoms = topology.select(mask);
    if atoms.is_empty() {
        return Err(AnalysisError::EmptySelection(mask));
    }
    let masses: Vec<f64> = atoms
        .iter()
        .map(|&i| topology.atoms()[i].mass)
        .collect();

    let aligned = align_to_first(trajectory.frames(), &atoms, &masses)?;
    let mean = aligned.average();
    let n_frames = aligned.n_frames() as f64;

    // residue index -> (sum of mass * rmsf, sum of mass, sum of rmsf, atom count)
    let mut per_residue: BTreeMap<usize, (f64, f64, f64, usize)> = BTreeMap::new();
    for (k, &atom_index) in atoms.iter().enumerate() {
        let msf = aligned
            .positions
            .iter()
            .map(|frame| (frame[k] - mean[k]).norm_squared())
            .sum::<f64>()
            / n_frames;
        let rmsf = msf.sqrt();
        let entry = per_residue
            .entry(topology.atoms()[atom_index].residue_index)
            .or_default();
        entry.0 += masses[k] * rmsf;
        entry.1 += masses[k];
        entry.2 += rmsf;
        entry.3 += 1;
    }

    let mut index = Vec::with_capacity(per_residue.len());
    let mut values = Vec::with_capacity(per_residue.len());
    for (residue_index, (weighted, total_mass, plain, count)) in per_residue {
        index.push(topology.residues()[residue_index].original_id as i64);
        values.push(if total_mass > 0.0 {
            weighted / total_mass
        } else {
            plain / count as f64
        });
    }

    Ok(Table::new(
        RESIDUE_COLUMN,
        vec![RMSF_COLUMN.to_string()],
        index,
        DMatrix::from_column_slice(values.len(), 1, &values),
    )?)
}
