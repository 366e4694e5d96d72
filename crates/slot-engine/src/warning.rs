//! Non-fatal data-quality warnings attached to an availability response.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::model::WorkerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A weekly window with an unparseable time, a weekday outside 0..=6, or
    /// identical start and end times.
    MalformedWindow,
    /// A busy block whose end is not after its start.
    MalformedBusyBlock,
    /// An assigned worker the provider did not return.
    UnknownWorker,
}

/// A skipped record. The request still succeeds without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityWarning {
    pub kind: WarningKind,
    pub worker_id: WorkerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub detail: String,
}

impl DataQualityWarning {
    pub fn new(kind: WarningKind, worker_id: &WorkerId, detail: impl Into<String>) -> Self {
        Self {
            kind,
            worker_id: worker_id.clone(),
            date: None,
            detail: detail.into(),
        }
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Log a warning and keep it for the response.
pub(crate) fn record(sink: &mut Vec<DataQualityWarning>, warning: DataQualityWarning) {
    warn!(
        kind = ?warning.kind,
        worker = %warning.worker_id,
        detail = %warning.detail,
        "data-quality warning, record skipped"
    );
    sink.push(warning);
}
