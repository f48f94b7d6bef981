//! Strict parse boundary for the workspace database that stores chores.
//!
//! A query against the chore database returns page documents whose
//! properties are typed by a `type` tag. Each page either becomes a
//! [`Chore`] or a [`ParseFailure`] naming the offending property; nothing is
//! silently skipped. The completion side builds the chore-log page that
//! records who did a chore and when.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chores::{Chore, Person};
use crate::error::ParseFailure;
use crate::schedule::parse_timestamp;

pub const PROP_NAME:           &str = "Name";
pub const PROP_ASSIGNED_TO:    &str = "Assigned to";
pub const PROP_DAYS:           &str = "Days";
pub const PROP_LAST_COMPLETED: &str = "Last Completed";

// ─── Property shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Property {
    Title  { title: Vec<RichText> },
    People { people: Vec<User> },
    Number { number: Option<f64> },
    Rollup { rollup: Option<Rollup> },
    #[serde(other)]
    Other,
}

impl Property {
    fn kind(&self) -> &'static str {
        match self {
            Property::Title { .. }  => "title",
            Property::People { .. } => "people",
            Property::Number { .. } => "number",
            Property::Rollup { .. } => "rollup",
            Property::Other         => "another type",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RichText {
    plain_text: String,
}

#[derive(Debug, Deserialize)]
struct User {
    id:   String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Rollup {
    Date { date: Option<DateValue> },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct DateValue {
    start: String,
}

// ─── Query parsing ────────────────────────────────────────────────────────────

/// Result of parsing a whole query response.
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub chores:   Vec<Chore>,
    /// `(page id, failure)` for every page that did not parse.
    pub failures: Vec<(String, ParseFailure)>,
}

/// Parses every page in a database query response.
pub fn parse_query_response(response: &Value) -> Result<QueryOutcome, ParseFailure> {
    let results = response
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ParseFailure::new("results", "query response has no results array"))?;

    let mut out = QueryOutcome::default();
    for page in results {
        match parse_page(page) {
            Ok(chore) => out.chores.push(chore),
            Err(failure) => {
                let id = page.get("id").and_then(Value::as_str).unwrap_or("<no id>").to_owned();
                tracing::warn!("skipping page {id}: {failure}");
                out.failures.push((id, failure));
            }
        }
    }
    tracing::info!("parsed {} chores, {} failures", out.chores.len(), out.failures.len());
    Ok(out)
}

/// Parses one chore page.
pub fn parse_page(page: &Value) -> Result<Chore, ParseFailure> {
    let id = page
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseFailure::new("id", "page has no id"))?;
    let props = page
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| ParseFailure::new("properties", "partial page without properties"))?;

    let property = |name: &str| -> Result<Property, ParseFailure> {
        let raw = props.get(name).ok_or_else(|| ParseFailure::new(name, "missing"))?;
        Property::deserialize(raw).map_err(|e| ParseFailure::new(name, e.to_string()))
    };

    let name = match property(PROP_NAME)? {
        Property::Title { title } => title
            .into_iter()
            .next()
            .map(|t| t.plain_text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ParseFailure::new(PROP_NAME, "title is empty"))?,
        other => return Err(mismatch(PROP_NAME, "title", &other)),
    };

    let assignees = match property(PROP_ASSIGNED_TO)? {
        Property::People { people } => people
            .into_iter()
            .map(|u| Person { name: u.name.unwrap_or_else(|| u.id.clone()), id: u.id })
            .collect(),
        other => return Err(mismatch(PROP_ASSIGNED_TO, "people", &other)),
    };

    let recurrence_days = match property(PROP_DAYS)? {
        Property::Number { number: Some(n) } => whole_days(n)
            .ok_or_else(|| ParseFailure::new(PROP_DAYS, format!("{n} is not a non-negative whole number")))?,
        Property::Number { number: None } => return Err(ParseFailure::new(PROP_DAYS, "number is empty")),
        other => return Err(mismatch(PROP_DAYS, "number", &other)),
    };

    let last_completed = match property(PROP_LAST_COMPLETED)? {
        Property::Rollup { rollup: None } => {
            return Err(ParseFailure::new(PROP_LAST_COMPLETED, "rollup is empty"))
        }
        Property::Rollup { rollup: Some(Rollup::Date { date: None }) } => None,
        Property::Rollup { rollup: Some(Rollup::Date { date: Some(d) }) } => Some(
            parse_timestamp(&d.start)
                .ok_or_else(|| ParseFailure::new(PROP_LAST_COMPLETED, format!("unparseable date `{}`", d.start)))?,
        ),
        Property::Rollup { rollup: Some(Rollup::Other) } => {
            return Err(ParseFailure::new(PROP_LAST_COMPLETED, "expected a date rollup"))
        }
        other => return Err(mismatch(PROP_LAST_COMPLETED, "rollup", &other)),
    };

    Ok(Chore { id: id.to_owned(), name, assignees, recurrence_days, last_completed })
}

fn mismatch(field: &str, expected: &str, got: &Property) -> ParseFailure {
    ParseFailure::new(field, format!("expected {expected}, got {}", got.kind()))
}

fn whole_days(n: f64) -> Option<u32> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX)).then(|| n as u32)
}

// ─── Completion log ───────────────────────────────────────────────────────────

/// One entry for the chore-log database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub chore_id:     String,
    pub name:         String,
    pub completed_by: String,
    pub date:         NaiveDate,
}

impl CompletionRecord {
    pub fn new(chore_id: &str, name: &str, completed_by: &str, date: NaiveDate) -> Result<Self, ParseFailure> {
        for (field, value) in [("choreId", chore_id), ("name", name), ("completedById", completed_by)] {
            if value.trim().is_empty() {
                return Err(ParseFailure::new(field, "required"));
            }
        }
        Ok(Self {
            chore_id: chore_id.to_owned(), name: name.to_owned(),
            completed_by: completed_by.to_owned(), date,
        })
    }

    pub fn for_chore(chore: &Chore, completed_by: &str, date: NaiveDate) -> Result<Self, ParseFailure> {
        Self::new(&chore.id, &chore.name, completed_by, date)
    }

    pub fn to_page_properties(&self) -> Value {
        json!({
            "Name":         { "type": "title", "title": [{ "type": "text", "text": { "content": self.name } }] },
            "Date":         { "type": "date", "date": { "start": self.date.format("%Y-%m-%d").to_string() } },
            "Completed by": { "type": "people", "people": [{ "id": self.completed_by }] },
            "Chore":        { "type": "relation", "relation": [{ "id": self.chore_id }] },
        })
    }

    /// Full page-create body targeting the chore-log database.
    pub fn to_create_body(&self, log_db_id: &str) -> Value {
        json!({
            "parent":     { "database_id": log_db_id },
            "properties": self.to_page_properties(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(days: Value, rollup: Value) -> Value {
        json!({
            "id": "page-1",
            "properties": {
                "Name": { "type": "title", "title": [{ "plain_text": "Vacuum Living Room" }] },
                "Assigned to": { "type": "people", "people": [
                    { "id": "u1", "name": "Rosie" },
                    { "id": "u2" }
                ] },
                "Days": days,
                "Last Completed": rollup,
            }
        })
    }

    fn days(n: Value) -> Value {
        json!({ "type": "number", "number": n })
    }

    fn date_rollup(start: Value) -> Value {
        if start.is_null() {
            json!({ "type": "rollup", "rollup": { "type": "date", "date": null } })
        } else {
            json!({ "type": "rollup", "rollup": { "type": "date", "date": { "start": start } } })
        }
    }

    #[test]
    fn parses_complete_page() {
        let chore = parse_page(&page(days(json!(7)), date_rollup(json!("2024-06-10")))).unwrap();
        assert_eq!(chore.id, "page-1");
        assert_eq!(chore.name, "Vacuum Living Room");
        assert_eq!(chore.recurrence_days, 7);
        assert_eq!(chore.assignee_names(), "Rosie, u2");
        assert_eq!(
            chore.last_completed,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn null_rollup_date_means_never_completed() {
        let chore = parse_page(&page(days(json!(3)), date_rollup(Value::Null))).unwrap();
        assert_eq!(chore.last_completed, None);
    }

    #[test]
    fn empty_people_list_is_allowed() {
        let mut p = page(days(json!(3)), date_rollup(Value::Null));
        p["properties"]["Assigned to"]["people"] = json!([]);
        assert!(parse_page(&p).unwrap().assignees.is_empty());
    }

    #[test]
    fn failures_name_the_field() {
        let empty_days = parse_page(&page(days(Value::Null), date_rollup(Value::Null))).unwrap_err();
        assert_eq!(empty_days.field, PROP_DAYS);

        let negative = parse_page(&page(days(json!(-2)), date_rollup(Value::Null))).unwrap_err();
        assert_eq!(negative.field, PROP_DAYS);

        let fractional = parse_page(&page(days(json!(1.5)), date_rollup(Value::Null))).unwrap_err();
        assert_eq!(fractional.field, PROP_DAYS);

        let mut no_rollup = page(days(json!(3)), Value::Null);
        no_rollup["properties"].as_object_mut().unwrap().remove(PROP_LAST_COMPLETED);
        assert_eq!(parse_page(&no_rollup).unwrap_err().field, PROP_LAST_COMPLETED);

        let mut untitled = page(days(json!(3)), date_rollup(Value::Null));
        untitled["properties"]["Name"]["title"] = json!([]);
        assert_eq!(parse_page(&untitled).unwrap_err().field, PROP_NAME);

        let wrong_type = parse_page(&page(json!({ "type": "checkbox", "checkbox": true }), date_rollup(Value::Null)))
            .unwrap_err();
        assert_eq!(wrong_type.field, PROP_DAYS);
        assert!(wrong_type.reason.contains("expected number"));

        let bad_date = parse_page(&page(days(json!(3)), date_rollup(json!("yesterday")))).unwrap_err();
        assert_eq!(bad_date.field, PROP_LAST_COMPLETED);
    }

    #[test]
    fn query_keeps_failures_alongside_chores() {
        let response = json!({
            "object": "list",
            "results": [
                page(days(json!(7)), date_rollup(json!("2024-06-10"))),
                { "id": "partial", "object": "page" },
            ]
        });
        let outcome = parse_query_response(&response).unwrap();
        assert_eq!(outcome.chores.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "partial");
        assert_eq!(outcome.failures[0].1.field, "properties");
    }

    #[test]
    fn query_without_results_is_rejected() {
        assert_eq!(parse_query_response(&json!({})).unwrap_err().field, "results");
    }

    #[test]
    fn completion_record_requires_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(CompletionRecord::new("c1", "Trash", "", date).unwrap_err().field, "completedById");
        assert_eq!(CompletionRecord::new("", "Trash", "u1", date).unwrap_err().field, "choreId");
    }

    #[test]
    fn completion_record_page_body() {
        let date   = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let record = CompletionRecord::for_chore(&Chore::new("c1", "Take Out Trash", 1), "u1", date).unwrap();
        let body   = record.to_create_body("log-db");
        assert_eq!(body["parent"]["database_id"], "log-db");
        assert_eq!(body["properties"]["Name"]["title"][0]["text"]["content"], "Take Out Trash");
        assert_eq!(body["properties"]["Date"]["date"]["start"], "2024-06-15");
        assert_eq!(body["properties"]["Completed by"]["people"][0]["id"], "u1");
        assert_eq!(body["properties"]["Chore"]["relation"][0]["id"], "c1");
    }
}
