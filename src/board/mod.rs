use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::chores::{evaluate, Chore, ChoreWithStatus};
use crate::schedule::is_same_day;
use crate::status::Status;

/// Chores split into the three display groups, each already in display order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub actionable:      Vec<ChoreWithStatus>,
    pub completed_today: Vec<ChoreWithStatus>,
    pub upcoming:        Vec<ChoreWithStatus>,
}

impl Board {
    /// Evaluates `chores` against `now` and groups the result.
    pub fn build(chores: &[Chore], now: NaiveDateTime) -> Self {
        Self::group(evaluate(chores, now), now)
    }

    pub fn group(items: Vec<ChoreWithStatus>, now: NaiveDateTime) -> Self {
        let mut board = Board::default();
        for item in items {
            let done_today = item.status == Status::Done
                && item.chore.last_completed.is_some_and(|t| is_same_day(t, now));
            if item.status.is_actionable() {
                board.actionable.push(item);
            } else if done_today {
                board.completed_today.push(item);
            } else {
                board.upcoming.push(item);
            }
        }

        sort_actionable(&mut board.actionable);
        sort_completed(&mut board.completed_today);
        sort_upcoming(&mut board.upcoming);

        tracing::debug!(
            "board: actionable={} completed_today={} upcoming={}",
            board.actionable.len(), board.completed_today.len(), board.upcoming.len()
        );
        board
    }

    pub fn len(&self) -> usize {
        self.actionable.len() + self.completed_today.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of chores per status, in `Status::ALL` order, zero counts omitted.
    pub fn counts(&self) -> Vec<(Status, usize)> {
        let mut tally: BTreeMap<usize, usize> = BTreeMap::new();
        for item in self.iter() {
            let rank = Status::ALL.iter().position(|s| *s == item.status).unwrap_or(0);
            *tally.entry(rank).or_default() += 1;
        }
        tally.into_iter().map(|(rank, n)| (Status::ALL[rank], n)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChoreWithStatus> {
        self.actionable.iter().chain(&self.completed_today).chain(&self.upcoming)
    }
}

// ─── Ordering ─────────────────────────────────────────────────────────────────

/// Overdue before Due, then earliest due date first.
pub fn sort_actionable(items: &mut [ChoreWithStatus]) {
    items.sort_by(|a, b| {
        overdue_first(a.status, b.status)
            .then(a.next_due.cmp(&b.next_due))
    });
}

/// Most recently completed first.
pub fn sort_completed(items: &mut [ChoreWithStatus]) {
    items.sort_by(|a, b| b.chore.last_completed.cmp(&a.chore.last_completed));
}

pub fn sort_upcoming(items: &mut [ChoreWithStatus]) {
    items.sort_by(|a, b| a.next_due.cmp(&b.next_due));
}

fn overdue_first(a: Status, b: Status) -> Ordering {
    match (a, b) {
        (Status::Overdue, Status::Overdue) => Ordering::Equal,
        (Status::Overdue, _)               => Ordering::Less,
        (_, Status::Overdue)               => Ordering::Greater,
        _                                  => Ordering::Equal,
    }
}
