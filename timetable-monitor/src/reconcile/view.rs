//! The reconciled set of stop records.

use std::collections::HashMap;

use tracing::trace;

use crate::domain::{MergeError, StopIdentity, StopRecord};

/// Stop records keyed by identity, in order of first appearance.
///
/// Keeping feed order lets the board break time ties the way the
/// upstream service lists them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopView {
    records: Vec<StopRecord>,
    index: HashMap<StopIdentity, usize>,
}

/// Whether a record with no existing entry may create one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Any record is admitted; used for plan snapshots, whose partial
    /// records are completed by later feeds.
    Always,
    /// Only complete records are admitted; used for change feeds, whose
    /// records for unknown stops cannot be shown.
    CompleteOnly,
}

impl StopView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, identity: &StopIdentity) -> Option<&StopRecord> {
        self.index.get(identity).map(|&i| &self.records[i])
    }

    /// Records in order of first appearance.
    pub fn records(&self) -> &[StopRecord] {
        &self.records
    }

    /// Merge `record` into the entry with the same identity, or admit it as
    /// a new entry under `admission`. Returns whether the view changed.
    pub fn integrate(
        &mut self,
        record: StopRecord,
        admission: Admission,
    ) -> Result<bool, MergeError> {
        let identity = record.identity();

        if let Some(&i) = self.index.get(&identity) {
            trace!(%identity, "merging stop record");
            let base = std::mem::replace(&mut self.records[i], StopRecord::new(identity));
            self.records[i] = StopRecord::merged(base, record)?;
            return Ok(true);
        }

        if admission == Admission::CompleteOnly && !record.is_complete() {
            trace!(%identity, "discarding change for unknown stop");
            return Ok(false);
        }

        self.index.insert(identity, self.records.len());
        self.records.push(record);
        Ok(true)
    }

    /// Integrate every record of a feed, in feed order.
    pub fn integrate_all(
        &mut self,
        records: impl IntoIterator<Item = StopRecord>,
        admission: Admission,
    ) -> Result<(), MergeError> {
        for record in records {
            self.integrate(record, admission)?;
        }
        Ok(())
    }
}
