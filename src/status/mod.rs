use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schedule::{days_between, is_same_day};

pub const NEXT_WEEK_DAYS:  i64 = 7;
pub const NEXT_MONTH_DAYS: i64 = 31;

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Done,
    Overdue,
    Due,
    NextWeek,
    NextMonth,
    FarFuture,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Overdue, Status::Due, Status::Done,
        Status::NextWeek, Status::NextMonth, Status::FarFuture,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Status::Done      => "Done",
            Status::Overdue   => "Overdue",
            Status::Due       => "Due",
            Status::NextWeek  => "NextWeek",
            Status::NextMonth => "NextMonth",
            Status::FarFuture => "FarFuture",
        }
    }

    /// Needs doing today or earlier.
    pub fn is_actionable(self) -> bool {
        matches!(self, Status::Overdue | Status::Due)
    }

    pub fn is_future(self) -> bool {
        matches!(self, Status::NextWeek | Status::NextMonth | Status::FarFuture)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Classification ───────────────────────────────────────────────────────────

/// Buckets a chore relative to `now`, comparing calendar days only.
///
/// A completion today wins over every date comparison, so a daily chore done
/// this morning reads `Done` even though its next due date is tomorrow.
pub fn classify(
    last_completed: Option<NaiveDateTime>,
    next_due:       NaiveDate,
    now:            NaiveDateTime,
) -> Status {
    if last_completed.is_some_and(|last| is_same_day(last, now)) {
        return Status::Done;
    }

    let ahead = days_between(now.date(), next_due);
    match ahead {
        d if d < 0               => Status::Overdue,
        0                        => Status::Due,
        d if d <= NEXT_WEEK_DAYS => Status::NextWeek,
        d if d <= NEXT_MONTH_DAYS => Status::NextMonth,
        _                        => Status::FarFuture,
    }
}

/// Short badge text for a classified chore, e.g. `"3 days overdue"`.
pub fn due_label(status: Status, next_due: NaiveDate, now: NaiveDateTime) -> String {
    let today = now.date();
    match status {
        Status::Done => "Done today".to_owned(),
        Status::Due  => "Due today".to_owned(),
        Status::Overdue => {
            let late = days_between(next_due, today);
            match late {
                d if d <= 0 => "Overdue".to_owned(),
                1           => "1 day overdue".to_owned(),
                d           => format!("{d} days overdue"),
            }
        }
        Status::NextWeek | Status::NextMonth | Status::FarFuture => {
            match days_between(today, next_due) {
                1 => "Due tomorrow".to_owned(),
                d => format!("Due in {d} days"),
            }
        }
    }
}
