use crate::vendor::SummaryRecord;
use serde::Serialize;

const METRES_PER_KILOMETRE: f64 = 1000.0;

/// Aggregated records with distances in kilometres.
///
/// Only [`convert`] builds one, so the renderer can never see unconverted data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConvertedReport {
    records: Vec<SummaryRecord>,
}

impl ConvertedReport {
    pub fn records(&self) -> &[SummaryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Converts vendor distances from metres to kilometres. Other fields are untouched.
pub fn convert(records: Vec<SummaryRecord>) -> ConvertedReport {
    let records = records
        .into_iter()
        .map(|record| SummaryRecord {
            distance: record.distance / METRES_PER_KILOMETRE,
            ..record
        })
        .collect();

    ConvertedReport { records }
}
