//! Conversion from timetable XML documents to domain types.
//!
//! All three feeds share one document shape:
//!
//! ```xml
//! <timetable station="Karlsruhe Hbf">
//!   <s id="5-1805220800-3">
//!     <tl f="D" t="p" o="800725" c="RB" n="38824"/>
//!     <ar pt="1805220823" pp="3" ppth="Baden-Baden|Rastatt"/>
//!     <dp pt="1805220825" pp="3" ppth="Bruchsal|Mannheim"/>
//!   </s>
//! </timetable>
//! ```
//!
//! Every attribute is optional; plan documents carry the `p*` attributes,
//! change documents the `c*` ones.

use roxmltree::{Document, Node};
use tracing::warn;

use crate::domain::{
    EventPart, EventStatus, InvalidEventStatus, InvalidStopId, StopIdentity, StopRecord,
    TimeError, TripLabel, parse_feed_time,
};

use super::error::FeedError;

/// Error converting a single `<s>` element.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordError {
    /// The element has no `id` attribute
    #[error("missing stop id")]
    MissingId,

    #[error(transparent)]
    InvalidId(#[from] InvalidStopId),

    #[error("attribute {attribute}: {source}")]
    InvalidTime {
        attribute: &'static str,
        source: TimeError,
    },

    #[error("attribute {attribute}: {source}")]
    InvalidStatus {
        attribute: &'static str,
        source: InvalidEventStatus,
    },
}

/// Parse a timetable document into stop records, in document order.
///
/// Records that fail to convert are logged and skipped; only a document
/// that is not well-formed XML fails as a whole.
pub fn parse_timetable(xml: &str) -> Result<Vec<StopRecord>, FeedError> {
    let doc = Document::parse(xml).map_err(|e| FeedError::Xml {
        message: e.to_string(),
    })?;

    let mut records = Vec::new();
    for node in doc.descendants().filter(|n| n.has_tag_name("s")) {
        match convert_stop(node) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(id = node.attribute("id").unwrap_or(""), error = %e, "skipping stop record");
            }
        }
    }

    Ok(records)
}

/// Convert one `<s>` element.
pub fn convert_stop(node: Node<'_, '_>) -> Result<StopRecord, RecordError> {
    let identity: StopIdentity = node.attribute("id").ok_or(RecordError::MissingId)?.parse()?;

    let mut record = StopRecord::new(identity);
    if let Some(ar) = first_child(node, "ar") {
        record.arrival = Some(convert_event(ar)?);
    }
    if let Some(dp) = first_child(node, "dp") {
        record.departure = Some(convert_event(dp)?);
    }
    if let Some(tl) = first_child(node, "tl") {
        record.label = Some(convert_label(tl));
    }

    Ok(record)
}

fn first_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

/// Convert an `<ar>` or `<dp>` element.
fn convert_event(node: Node<'_, '_>) -> Result<EventPart, RecordError> {
    Ok(EventPart {
        planned_path: node.attribute("ppth").map(parse_path),
        changed_path: node.attribute("cpth").map(parse_path),
        planned_time: time_attr(node, "pt")?,
        changed_time: time_attr(node, "ct")?,
        planned_status: status_attr(node, "ps")?,
        changed_status: status_attr(node, "cs")?,
        planned_platform: node.attribute("pp").map(str::to_string),
        changed_platform: node.attribute("cp").map(str::to_string),
        line: node.attribute("l").map(str::to_string),
        cancellation_time: time_attr(node, "clt")?,
    })
}

fn convert_label(node: Node<'_, '_>) -> TripLabel {
    TripLabel {
        category: node.attribute("c").unwrap_or_default().to_string(),
        number: node.attribute("n").unwrap_or_default().to_string(),
        trip_type: node.attribute("t").map(str::to_string),
        filter_flags: node.attribute("f").map(str::to_string),
        operator: node.attribute("o").map(str::to_string),
    }
}

/// Split a `|`-separated station path. An empty attribute is an empty path.
fn parse_path(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split('|').map(str::to_string).collect()
}

fn time_attr(
    node: Node<'_, '_>,
    attribute: &'static str,
) -> Result<Option<chrono::NaiveDateTime>, RecordError> {
    node.attribute(attribute)
        .map(parse_feed_time)
        .transpose()
        .map_err(|source| RecordError::InvalidTime { attribute, source })
}

fn status_attr(
    node: Node<'_, '_>,
    attribute: &'static str,
) -> Result<Option<EventStatus>, RecordError> {
    node.attribute(attribute)
        .map(EventStatus::from_code)
        .transpose()
        .map_err(|source| RecordError::InvalidStatus { attribute, source })
}
