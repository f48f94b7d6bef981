use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Number;

use crate::error::{ChoreError, Result};
use crate::schedule::{next_due, parse_timestamp};
use crate::status::{classify, Status};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ─── Domain models ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id:   String,
    pub name: String,
}

/// A recurring household task as the data store hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ChoreRecord")]
pub struct Chore {
    pub id:              String,
    pub name:            String,
    pub assignees:       Vec<Person>,
    pub recurrence_days: u32,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_completed:  Option<NaiveDateTime>,
}

impl Chore {
    pub fn new(id: &str, name: &str, recurrence_days: u32) -> Self {
        Self {
            id: id.to_owned(), name: name.to_owned(),
            assignees: Vec::new(), recurrence_days, last_completed: None,
        }
    }

    pub fn assigned_to(mut self, person: Person) -> Self {
        self.assignees.push(person);
        self
    }

    pub fn completed_at(mut self, at: NaiveDateTime) -> Self {
        self.last_completed = Some(at);
        self
    }

    /// Comma-separated assignee names, or `"Unassigned"`.
    pub fn assignee_names(&self) -> String {
        if self.assignees.is_empty() {
            return "Unassigned".to_owned();
        }
        self.assignees.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
    }
}

/// A chore with its derived due date and status for one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoreWithStatus {
    #[serde(flatten)]
    pub chore:    Chore,
    pub next_due: NaiveDate,
    pub status:   Status,
}

impl ChoreWithStatus {
    pub fn evaluate(chore: Chore, now: NaiveDateTime) -> Self {
        let next_due = next_due(chore.last_completed, chore.recurrence_days, now);
        let status   = classify(chore.last_completed, next_due, now);
        Self { chore, next_due, status }
    }
}

// ─── Evaluation & completion ──────────────────────────────────────────────────

/// Derives due date and status for every chore against a single `now`.
pub fn evaluate(chores: &[Chore], now: NaiveDateTime) -> Vec<ChoreWithStatus> {
    let out: Vec<ChoreWithStatus> = chores
        .iter()
        .cloned()
        .map(|c| ChoreWithStatus::evaluate(c, now))
        .collect();
    tracing::debug!("evaluated {} chores at {now}", out.len());
    out
}

/// Records a completion at `now` on the chore with `id`.
///
/// Only the in-memory snapshot changes; writing the completion log entry is
/// up to the caller.
pub fn complete<'a>(chores: &'a mut [Chore], id: &str, now: NaiveDateTime) -> Result<&'a Chore> {
    let chore = chores
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| ChoreError::UnknownChore(id.to_owned()))?;
    chore.last_completed = Some(now);
    tracing::info!("completed chore {} ({})", chore.id, chore.name);
    Ok(chore)
}

/// Parses a JSON array of chore records, rejecting the whole snapshot on the
/// first invalid record.
pub fn load_snapshot(json: &str) -> Result<Vec<Chore>> {
    let records: Vec<ChoreRecord> = serde_json::from_str(json)?;
    records.into_iter().map(Chore::try_from).collect()
}

// ─── Boundary record ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChoreRecord {
    id:              String,
    name:            String,
    #[serde(default)]
    assignees:       Vec<Person>,
    #[serde(default)]
    recurrence_days: Option<Number>,
    #[serde(default)]
    last_completed:  Option<String>,
}

impl TryFrom<ChoreRecord> for Chore {
    type Error = ChoreError;

    fn try_from(r: ChoreRecord) -> Result<Self> {
        let invalid = |reason: String| ChoreError::InvalidChore { id: r.id.clone(), reason };

        let recurrence_days = match &r.recurrence_days {
            None => return Err(invalid("missing recurrenceDays".into())),
            Some(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| invalid(format!("recurrenceDays must be a non-negative whole number, got {n}")))?,
        };

        let last_completed = match r.last_completed.as_deref() {
            None => None,
            Some(s) => Some(
                parse_timestamp(s).ok_or_else(|| invalid(format!("unparseable lastCompleted `{s}`")))?,
            ),
        };

        Ok(Chore {
            id: r.id, name: r.name, assignees: r.assignees,
            recurrence_days, last_completed,
        })
    }
}

fn serialize_timestamp<S: Serializer>(
    ts: &Option<NaiveDateTime>,
    s:  S,
) -> std::result::Result<S::Ok, S::Error> {
    match ts {
        Some(t) => s.serialize_str(&t.format(TIMESTAMP_FORMAT).to_string()),
        None    => s.serialize_none(),
    }
}
