//! Time-block placement scheduler.
//!
//! Places an ordered task list into free calendar time across a multi-day
//! horizon:
//! - Subtracts work-hour windows, lunch, busy slots, time off, and
//!   already-committed placements to find free intervals per day
//! - Places each task first-fit into one contiguous interval (no splitting)
//! - Honors dependency ordering, weekday/weekend rules, per-day minute
//!   caps, and a hard deadline
//! - Reports tasks that did not fit as first-class results, never as errors
//!
//! Identical inputs always produce identical output: tasks are considered
//! in `order_index` order and every placement made during a run is visible
//! to the tasks that follow it.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::availability::NormalizedAvailability;
use crate::error::{ConfigError, EngineError, ValidationError};
use crate::placement::Placement;
use crate::task::{validate_batch, TaskInput};

mod window;

pub use window::{first_fit, free_intervals, FreeInterval};

/// Inclusive date range within which scheduling is attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Horizon {
    /// Create a horizon
    ///
    /// # Errors
    /// Returns an error if `end` is before `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidHorizon { start, end });
        }
        Ok(Self { start, end })
    }

    /// Check if a date falls within the horizon
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Offset of a date from the horizon start, in days
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        date.signed_duration_since(self.start).num_days()
    }

    /// Iterate the horizon's dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..=self.day_index(self.end)).map(move |i| start + Duration::days(i))
    }
}

/// Work-hour configuration for the scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkHours {
    pub workday_start_hour: u32,
    pub workday_start_minute: u32,
    pub workday_end_hour: u32,
    /// Lunch carve-out on workdays; equal start/end hours disable it
    pub lunch_start_hour: u32,
    pub lunch_end_hour: u32,
    /// Whether weekends are schedulable at all
    pub allow_weekends: bool,
    pub weekend_start_hour: u32,
    pub weekend_end_hour: u32,
    pub weekend_lunch_start_hour: u32,
    pub weekend_lunch_end_hour: u32,
    /// Per-day scheduled-minute caps; `None` means unlimited
    pub weekday_max_minutes: Option<i64>,
    pub weekend_max_minutes: Option<i64>,
    /// Treat horizon day 0 as a workday even if it is a weekend and
    /// `allow_weekends` is off
    pub force_start_date: bool,
    /// Anchor day 0 at the nominal workday start even if `now` is already
    /// past it, instead of skipping the elapsed portion of the day
    pub require_start_date: bool,
}

impl Default for WorkHours {
    fn default() -> Self {
        Self {
            workday_start_hour: 9,
            workday_start_minute: 0,
            workday_end_hour: 17,
            lunch_start_hour: 12,
            lunch_end_hour: 13,
            allow_weekends: false,
            weekend_start_hour: 10,
            weekend_end_hour: 16,
            weekend_lunch_start_hour: 12,
            weekend_lunch_end_hour: 12,
            weekday_max_minutes: None,
            weekend_max_minutes: None,
            force_start_date: false,
            require_start_date: false,
        }
    }
}

impl WorkHours {
    /// Validate the configuration before any placement attempt.
    ///
    /// # Errors
    /// Returns an error for inverted work or lunch windows and for clock
    /// values outside 0-24.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, hour) in [
            ("workday_start_hour", self.workday_start_hour),
            ("workday_end_hour", self.workday_end_hour),
            ("lunch_start_hour", self.lunch_start_hour),
            ("lunch_end_hour", self.lunch_end_hour),
            ("weekend_start_hour", self.weekend_start_hour),
            ("weekend_end_hour", self.weekend_end_hour),
            ("weekend_lunch_start_hour", self.weekend_lunch_start_hour),
            ("weekend_lunch_end_hour", self.weekend_lunch_end_hour),
        ] {
            if hour > 24 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("{hour} is not a valid hour"),
                });
            }
        }
        if self.workday_start_minute > 59 {
            return Err(ConfigError::InvalidValue {
                key: "workday_start_minute".to_string(),
                message: format!("{} is not a valid minute", self.workday_start_minute),
            });
        }

        let workday_start = self.workday_start_hour * 60 + self.workday_start_minute;
        let workday_end = self.workday_end_hour * 60;
        if workday_start >= workday_end {
            return Err(ConfigError::InvertedWorkWindow {
                start_minute_of_day: workday_start,
                end_minute_of_day: workday_end,
            });
        }
        if self.lunch_start_hour > self.lunch_end_hour {
            return Err(ConfigError::InvertedLunchWindow {
                start_hour: self.lunch_start_hour,
                end_hour: self.lunch_end_hour,
            });
        }

        if self.allow_weekends {
            if self.weekend_start_hour >= self.weekend_end_hour {
                return Err(ConfigError::InvertedWorkWindow {
                    start_minute_of_day: self.weekend_start_hour * 60,
                    end_minute_of_day: self.weekend_end_hour * 60,
                });
            }
            if self.weekend_lunch_start_hour > self.weekend_lunch_end_hour {
                return Err(ConfigError::InvertedLunchWindow {
                    start_hour: self.weekend_lunch_start_hour,
                    end_hour: self.weekend_lunch_end_hour,
                });
            }
        }

        Ok(())
    }

    /// Work window, lunch carve-out, and minute cap for one date.
    ///
    /// Returns `None` for weekend days that are not schedulable. Day 0 of
    /// the horizon uses workday hours even on a weekend when
    /// `force_start_date` is set (explicit policy exception).
    pub(crate) fn day_profile(&self, date: NaiveDate, is_day_zero: bool) -> Option<DayProfile> {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let forced = weekend && !self.allow_weekends && self.force_start_date && is_day_zero;
        if weekend && !self.allow_weekends && !forced {
            return None;
        }

        // A forced weekend day 0 is treated as a workday in all respects
        let as_weekend = weekend && !forced;
        let (start_hour, start_minute, end_hour) = if as_weekend {
            (self.weekend_start_hour, 0, self.weekend_end_hour)
        } else {
            (
                self.workday_start_hour,
                self.workday_start_minute,
                self.workday_end_hour,
            )
        };
        let (lunch_start, lunch_end) = if as_weekend {
            (self.weekend_lunch_start_hour, self.weekend_lunch_end_hour)
        } else {
            (self.lunch_start_hour, self.lunch_end_hour)
        };

        let window_start = time_on(date, start_hour, start_minute);
        let window_end = time_on(date, end_hour, 0);
        let lunch = (lunch_end > lunch_start)
            .then(|| (time_on(date, lunch_start, 0), time_on(date, lunch_end, 0)));
        let cap = if as_weekend {
            self.weekend_max_minutes
        } else {
            self.weekday_max_minutes
        };

        Some(DayProfile {
            window_start,
            window_end,
            lunch,
            cap,
        })
    }

    /// Largest contiguous stretch any single day can offer under this
    /// configuration. A task longer than this can never be placed.
    pub(crate) fn max_single_day_minutes(&self) -> i64 {
        let workday_net = workday_net_minutes(
            self.workday_start_hour as i64 * 60 + self.workday_start_minute as i64,
            self.workday_end_hour as i64 * 60,
            self.lunch_start_hour as i64 * 60,
            self.lunch_end_hour as i64 * 60,
        );
        let mut best = apply_cap(workday_net, self.weekday_max_minutes);

        if self.allow_weekends {
            let weekend_net = workday_net_minutes(
                self.weekend_start_hour as i64 * 60,
                self.weekend_end_hour as i64 * 60,
                self.weekend_lunch_start_hour as i64 * 60,
                self.weekend_lunch_end_hour as i64 * 60,
            );
            best = best.max(apply_cap(weekend_net, self.weekend_max_minutes));
        }

        best
    }
}

/// Largest contiguous stretch in a window split by a lunch carve-out
fn workday_net_minutes(start: i64, end: i64, lunch_start: i64, lunch_end: i64) -> i64 {
    if lunch_end > lunch_start && lunch_start < end && lunch_end > start {
        let before = (lunch_start.min(end) - start).max(0);
        let after = (end - lunch_end.max(start)).max(0);
        before.max(after)
    } else {
        end - start
    }
}

fn apply_cap(minutes: i64, cap: Option<i64>) -> i64 {
    match cap {
        Some(cap) => minutes.min(cap),
        None => minutes,
    }
}

/// Construct a UTC timestamp for a clock time on a date; hour 24 maps to
/// midnight of the following day.
fn time_on(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let (date, hour) = if hour >= 24 {
        (date + Duration::days(1), hour - 24)
    } else {
        (date, hour)
    };
    date.and_hms_opt(hour, minute, 0)
        .expect("work-hour clock values are validated before use")
        .and_utc()
}

/// Resolved work window for one schedulable day
#[derive(Debug, Clone, Copy)]
pub(crate) struct DayProfile {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub lunch: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub cap: Option<i64>,
}

/// Why a task could not be placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UnplacedReason {
    /// No free interval of sufficient length anywhere in the horizon
    NoCapacity,
    /// Duration exceeds the widest window any single day can offer
    ExceedsDayWindow,
    /// Every remaining candidate day starts after the hard deadline
    AfterDeadline,
    /// A dependency was itself unplaced (cascading failure)
    DependencyUnplaced { dependency_id: String },
    /// The task's dependency edges form a cycle
    DependencyCycle,
}

/// A task that could not be placed, with the blocking constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnplacedTask {
    pub task: TaskInput,
    pub reason: UnplacedReason,
}

/// Result of a scheduling run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub placements: Vec<Placement>,
    pub unplaced: Vec<UnplacedTask>,
}

impl ScheduleOutcome {
    /// True when every task in the batch received a placement
    pub fn is_fully_placed(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Outcome of searching a single day for a free slot
#[derive(Debug, Clone, Copy)]
pub(crate) enum DaySearch {
    Found {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Day is a non-working day, cap-exhausted, or has no fitting gap
    Unavailable,
    /// Day starts after the hard deadline; later days cannot help
    PastDeadline,
}

/// Dependency gate result for one task in the deferral loop
enum Gate {
    /// All dependencies placed; search may not start before the instant
    Ready(Option<DateTime<Utc>>),
    /// Some dependency is still undecided in this batch
    Waiting,
    /// A dependency is unplaced or unknown; cascade
    Blocked(String),
}

/// Greedy first-fit time-block scheduler
pub struct TimeBlockScheduler {
    config: WorkHours,
}

impl TimeBlockScheduler {
    /// Create a scheduler with default work hours
    pub fn new() -> Self {
        Self {
            config: WorkHours::default(),
        }
    }

    /// Create with custom work hours
    pub fn with_config(config: WorkHours) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkHours {
        &self.config
    }

    /// Place tasks into the horizon.
    ///
    /// # Arguments
    /// * `tasks` - Batch to place, considered in `order_index` order
    /// * `horizon` - Inclusive date range to search
    /// * `availability` - Normalized busy-time snapshot
    /// * `existing_placements` - Already-committed placements (treated as busy)
    /// * `now` - Injected current time; elapsed parts of today are skipped
    ///
    /// # Errors
    /// Returns an error only for malformed configuration or input. Tasks
    /// that did not fit are reported in `ScheduleOutcome::unplaced`.
    pub fn schedule(
        &self,
        tasks: &[TaskInput],
        horizon: &Horizon,
        availability: &NormalizedAvailability,
        existing_placements: &[Placement],
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, EngineError> {
        self.config.validate()?;
        validate_batch(tasks)?;

        let mut ordered: Vec<&TaskInput> = tasks.iter().collect();
        ordered.sort_by_key(|task| task.order_index);

        let batch_ids: HashSet<&str> = tasks.iter().map(|task| task.id.as_str()).collect();

        // Dependencies may already be committed from a previous run
        let mut placed_end: HashMap<String, DateTime<Utc>> = HashMap::new();
        for placement in existing_placements {
            let end = placed_end
                .entry(placement.task_id.clone())
                .or_insert(placement.end_time);
            if placement.end_time > *end {
                *end = placement.end_time;
            }
        }

        let mut busy_placements: Vec<Placement> = existing_placements.to_vec();
        let mut used_minutes: HashMap<NaiveDate, i64> = HashMap::new();
        for placement in existing_placements {
            *used_minutes.entry(placement.date).or_insert(0) += placement.duration_minutes;
        }

        let mut placements: Vec<Placement> = Vec::new();
        let mut unplaced: Vec<UnplacedTask> = Vec::new();
        let mut unplaced_ids: HashSet<String> = HashSet::new();

        let mut pending = ordered;
        while !pending.is_empty() {
            let mut progress = false;
            let mut waiting: Vec<&TaskInput> = Vec::new();

            for task in pending {
                match dependency_gate(task, &placed_end, &unplaced_ids, &batch_ids) {
                    Gate::Blocked(dependency_id) => {
                        progress = true;
                        unplaced_ids.insert(task.id.clone());
                        unplaced.push(UnplacedTask {
                            task: task.clone(),
                            reason: UnplacedReason::DependencyUnplaced { dependency_id },
                        });
                    }
                    Gate::Waiting => waiting.push(task),
                    Gate::Ready(min_start) => {
                        progress = true;
                        match self.place_task(
                            task,
                            horizon,
                            availability,
                            &busy_placements,
                            &used_minutes,
                            now,
                            min_start,
                        ) {
                            Ok(placement) => {
                                placed_end.insert(task.id.clone(), placement.end_time);
                                *used_minutes.entry(placement.date).or_insert(0) +=
                                    placement.duration_minutes;
                                busy_placements.push(placement.clone());
                                placements.push(placement);
                            }
                            Err(reason) => {
                                unplaced_ids.insert(task.id.clone());
                                unplaced.push(UnplacedTask {
                                    task: task.clone(),
                                    reason,
                                });
                            }
                        }
                    }
                }
            }

            if !progress {
                // Remaining tasks wait on each other forever
                for task in waiting {
                    unplaced.push(UnplacedTask {
                        task: task.clone(),
                        reason: UnplacedReason::DependencyCycle,
                    });
                }
                break;
            }
            pending = waiting;
        }

        Ok(ScheduleOutcome {
            placements,
            unplaced,
        })
    }

    /// Walk the horizon's days and place one task first-fit.
    fn place_task(
        &self,
        task: &TaskInput,
        horizon: &Horizon,
        availability: &NormalizedAvailability,
        busy_placements: &[Placement],
        used_minutes: &HashMap<NaiveDate, i64>,
        now: DateTime<Utc>,
        min_start: Option<DateTime<Utc>>,
    ) -> Result<Placement, UnplacedReason> {
        if task.estimated_minutes > self.config.max_single_day_minutes() {
            return Err(UnplacedReason::ExceedsDayWindow);
        }

        let mut date = if self.config.require_start_date {
            horizon.start
        } else {
            horizon.start.max(now.date_naive())
        };
        if date > horizon.end {
            return Err(UnplacedReason::NoCapacity);
        }

        let mut deadline_cut = false;
        while date <= horizon.end {
            let used = used_minutes.get(&date).copied().unwrap_or(0);
            match self.search_day(
                date,
                horizon,
                task.estimated_minutes,
                availability,
                busy_placements,
                used,
                now,
                min_start,
            ) {
                DaySearch::Found { start, end } => {
                    return Ok(Placement::new(&task.id, start, end, horizon.day_index(date)));
                }
                DaySearch::PastDeadline => {
                    deadline_cut = true;
                    break;
                }
                DaySearch::Unavailable => {}
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        Err(if deadline_cut {
            UnplacedReason::AfterDeadline
        } else {
            UnplacedReason::NoCapacity
        })
    }

    /// Search one day for the first free interval that fits `duration`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn search_day(
        &self,
        date: NaiveDate,
        horizon: &Horizon,
        duration: i64,
        availability: &NormalizedAvailability,
        busy_placements: &[Placement],
        used_on_date: i64,
        now: DateTime<Utc>,
        min_start: Option<DateTime<Utc>>,
    ) -> DaySearch {
        let is_day_zero = date == horizon.start;
        let Some(profile) = self.config.day_profile(date, is_day_zero) else {
            return DaySearch::Unavailable;
        };

        if let Some(deadline) = availability.deadline {
            if deadline <= profile.window_start {
                return DaySearch::PastDeadline;
            }
        }

        if let Some(cap) = profile.cap {
            if cap - used_on_date < duration {
                return DaySearch::Unavailable;
            }
        }

        let mut search_start = profile.window_start;
        if !self.config.require_start_date && date == now.date_naive() && now > search_start {
            search_start = now;
        }
        if let Some(min_start) = min_start {
            if min_start.date_naive() > date {
                return DaySearch::Unavailable;
            }
            if min_start > search_start {
                search_start = min_start;
            }
        }

        let mut search_end = profile.window_end;
        if let Some(deadline) = availability.deadline {
            if deadline < search_end {
                search_end = deadline;
            }
        }

        let mut busy: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
        if let Some((lunch_start, lunch_end)) = profile.lunch {
            busy.push((lunch_start, lunch_end));
        }
        for slot in availability.blocking_in(profile.window_start, profile.window_end) {
            busy.push((slot.start, slot.end));
        }
        for placement in busy_placements {
            if placement.overlaps(profile.window_start, profile.window_end) {
                busy.push((placement.start_time, placement.end_time));
            }
        }

        match first_fit(&busy, search_start, search_end, duration) {
            Some(gap) => DaySearch::Found {
                start: gap.start,
                end: gap.start + Duration::minutes(duration),
            },
            None => DaySearch::Unavailable,
        }
    }
}

impl Default for TimeBlockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn dependency_gate(
    task: &TaskInput,
    placed_end: &HashMap<String, DateTime<Utc>>,
    unplaced_ids: &HashSet<String>,
    batch_ids: &HashSet<&str>,
) -> Gate {
    let mut min_start: Option<DateTime<Utc>> = None;

    for dependency_id in &task.dependency_ids {
        if let Some(end) = placed_end.get(dependency_id) {
            min_start = Some(match min_start {
                Some(current) => current.max(*end),
                None => *end,
            });
            continue;
        }
        if unplaced_ids.contains(dependency_id) || !batch_ids.contains(dependency_id.as_str()) {
            return Gate::Blocked(dependency_id.clone());
        }
        // Dependency is in the batch but not decided yet
        return Gate::Waiting;
    }

    Gate::Ready(min_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{normalize, BusySlot, BusySource};
    use chrono::TimeZone;

    const MONDAY: (i32, u32, u32) = (2026, 3, 2);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monday() -> NaiveDate {
        date(MONDAY.0, MONDAY.1, MONDAY.2)
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
    }

    fn early_now() -> DateTime<Utc> {
        at(2, 8, 0)
    }

    fn no_lunch() -> WorkHours {
        WorkHours {
            lunch_start_hour: 12,
            lunch_end_hour: 12,
            ..WorkHours::default()
        }
    }

    fn unrestricted() -> NormalizedAvailability {
        NormalizedAvailability::unrestricted()
    }

    #[test]
    fn test_single_task_lands_at_workday_start() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![TaskInput::new("t1", "Write report", 60)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert!(outcome.is_fully_placed());
        assert_eq!(outcome.placements.len(), 1);
        assert_eq!(outcome.placements[0].start_time, at(2, 9, 0));
        assert_eq!(outcome.placements[0].end_time, at(2, 10, 0));
        assert_eq!(outcome.placements[0].day_index, 0);
    }

    #[test]
    fn test_full_day_tasks_spill_to_next_day() {
        let scheduler = TimeBlockScheduler::with_config(no_lunch());
        let horizon = Horizon::new(monday(), date(2026, 3, 3)).unwrap();
        let tasks = vec![
            TaskInput::new("t1", "Deep work", 480).with_order_index(0),
            TaskInput::new("t2", "More deep work", 480).with_order_index(1),
        ];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert!(outcome.is_fully_placed());
        assert_eq!(outcome.placements[0].start_time, at(2, 9, 0));
        assert_eq!(outcome.placements[0].end_time, at(2, 17, 0));
        assert_eq!(outcome.placements[1].start_time, at(3, 9, 0));
        assert_eq!(outcome.placements[1].end_time, at(3, 17, 0));
        assert_eq!(outcome.placements[1].day_index, 1);
    }

    #[test]
    fn test_task_wider_than_any_day_is_unplaced() {
        let scheduler = TimeBlockScheduler::with_config(no_lunch());
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![TaskInput::new("t1", "Marathon", 600)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert!(outcome.placements.is_empty());
        assert_eq!(outcome.unplaced.len(), 1);
        assert_eq!(outcome.unplaced[0].reason, UnplacedReason::ExceedsDayWindow);
    }

    #[test]
    fn test_lunch_carve_out_pushes_long_task_to_afternoon() {
        // 9-12 is only 180 minutes; a 240-minute task must start after lunch
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![TaskInput::new("t1", "Workshop", 240)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert_eq!(outcome.placements[0].start_time, at(2, 13, 0));
        assert_eq!(outcome.placements[0].end_time, at(2, 17, 0));
    }

    #[test]
    fn test_busy_slots_are_avoided() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let busy = vec![
            BusySlot::try_new(at(2, 9, 0), at(2, 10, 30), BusySource::CalendarEvent).unwrap(),
        ];
        let availability = normalize(busy, Vec::new(), None);
        let tasks = vec![TaskInput::new("t1", "Focus", 60)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &availability, &[], early_now())
            .unwrap();

        assert_eq!(outcome.placements[0].start_time, at(2, 10, 30));
    }

    #[test]
    fn test_elapsed_day_portion_is_skipped() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![TaskInput::new("t1", "Afternoon work", 120)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], at(2, 14, 0))
            .unwrap();

        assert_eq!(outcome.placements[0].start_time, at(2, 14, 0));
    }

    #[test]
    fn test_require_start_date_anchors_at_workday_start() {
        let config = WorkHours {
            require_start_date: true,
            ..WorkHours::default()
        };
        let scheduler = TimeBlockScheduler::with_config(config);
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![TaskInput::new("t1", "Evening plan", 60)];

        // It is already past the workday end
        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], at(2, 19, 0))
            .unwrap();

        assert_eq!(outcome.placements[0].start_time, at(2, 9, 0));
    }

    #[test]
    fn test_weekends_skipped_by_default() {
        // 2026-03-07 is a Saturday
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(date(2026, 3, 7), date(2026, 3, 9)).unwrap();
        let tasks = vec![TaskInput::new("t1", "Weekday only", 60)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], at(7, 8, 0))
            .unwrap();

        // Lands on Monday the 9th
        assert_eq!(outcome.placements[0].date, date(2026, 3, 9));
        assert_eq!(outcome.placements[0].day_index, 2);
    }

    #[test]
    fn test_allow_weekends_uses_weekend_hours() {
        let config = WorkHours {
            allow_weekends: true,
            ..WorkHours::default()
        };
        let scheduler = TimeBlockScheduler::with_config(config);
        let horizon = Horizon::new(date(2026, 3, 7), date(2026, 3, 7)).unwrap();
        let tasks = vec![TaskInput::new("t1", "Weekend errand", 60)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], at(7, 8, 0))
            .unwrap();

        // Default weekend hours start at 10:00
        assert_eq!(outcome.placements[0].start_time, at(7, 10, 0));
    }

    #[test]
    fn test_force_start_date_overrides_weekend_skip() {
        let config = WorkHours {
            force_start_date: true,
            ..WorkHours::default()
        };
        let scheduler = TimeBlockScheduler::with_config(config);
        let horizon = Horizon::new(date(2026, 3, 7), date(2026, 3, 9)).unwrap();
        let tasks = vec![TaskInput::new("t1", "Urgent", 60)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], at(7, 8, 0))
            .unwrap();

        // Placed on Saturday day 0 with workday hours
        assert_eq!(outcome.placements[0].date, date(2026, 3, 7));
        assert_eq!(outcome.placements[0].start_time, at(7, 9, 0));
    }

    #[test]
    fn test_daily_cap_spills_to_next_day() {
        let config = WorkHours {
            weekday_max_minutes: Some(120),
            ..no_lunch()
        };
        let scheduler = TimeBlockScheduler::with_config(config);
        let horizon = Horizon::new(monday(), date(2026, 3, 3)).unwrap();
        let tasks = vec![
            TaskInput::new("t1", "First", 90).with_order_index(0),
            TaskInput::new("t2", "Second", 90).with_order_index(1),
        ];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert!(outcome.is_fully_placed());
        assert_eq!(outcome.placements[0].date, monday());
        // 90 + 90 exceeds the 120-minute cap, so the second task moves on
        assert_eq!(outcome.placements[1].date, date(2026, 3, 3));
    }

    #[test]
    fn test_deadline_blocks_late_placement() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), date(2026, 3, 6)).unwrap();
        // Deadline at 10:00 on day 0 leaves room for one hour only
        let availability = normalize(Vec::new(), Vec::new(), Some(at(2, 10, 0)));
        let tasks = vec![
            TaskInput::new("t1", "Fits", 60).with_order_index(0),
            TaskInput::new("t2", "Does not fit", 60).with_order_index(1),
        ];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &availability, &[], early_now())
            .unwrap();

        assert_eq!(outcome.placements.len(), 1);
        assert_eq!(outcome.placements[0].end_time, at(2, 10, 0));
        assert_eq!(outcome.unplaced.len(), 1);
        assert_eq!(outcome.unplaced[0].reason, UnplacedReason::AfterDeadline);
    }

    #[test]
    fn test_dependency_gates_start_time() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), date(2026, 3, 3)).unwrap();
        // Dependent task listed first by order_index; it must defer
        let tasks = vec![
            TaskInput::new("b", "Second step", 60)
                .with_order_index(0)
                .with_dependency("a"),
            TaskInput::new("a", "First step", 60).with_order_index(1),
        ];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert!(outcome.is_fully_placed());
        let a = outcome.placements.iter().find(|p| p.task_id == "a").unwrap();
        let b = outcome.placements.iter().find(|p| p.task_id == "b").unwrap();
        assert!(b.start_time >= a.end_time);
    }

    #[test]
    fn test_unplaced_dependency_cascades() {
        let scheduler = TimeBlockScheduler::with_config(no_lunch());
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![
            TaskInput::new("a", "Too long", 600).with_order_index(0),
            TaskInput::new("b", "Blocked", 30)
                .with_order_index(1)
                .with_dependency("a"),
        ];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert_eq!(outcome.unplaced.len(), 2);
        assert_eq!(outcome.unplaced[0].reason, UnplacedReason::ExceedsDayWindow);
        assert_eq!(
            outcome.unplaced[1].reason,
            UnplacedReason::DependencyUnplaced {
                dependency_id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_dependency_cascades() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![TaskInput::new("b", "Blocked", 30).with_dependency("ghost")];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert_eq!(
            outcome.unplaced[0].reason,
            UnplacedReason::DependencyUnplaced {
                dependency_id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_dependency_cycle_reported() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![
            TaskInput::new("a", "First", 30).with_dependency("b"),
            TaskInput::new("b", "Second", 30).with_dependency("a"),
        ];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[], early_now())
            .unwrap();

        assert_eq!(outcome.unplaced.len(), 2);
        assert!(outcome
            .unplaced
            .iter()
            .all(|u| u.reason == UnplacedReason::DependencyCycle));
    }

    #[test]
    fn test_committed_dependency_satisfies_gate() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let committed = Placement::new("a", at(2, 9, 0), at(2, 10, 0), 0);
        let tasks = vec![TaskInput::new("b", "Follow-up", 60).with_dependency("a")];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[committed], early_now())
            .unwrap();

        assert!(outcome.is_fully_placed());
        assert!(outcome.placements[0].start_time >= at(2, 10, 0));
    }

    #[test]
    fn test_rejects_invalid_duration_up_front() {
        let scheduler = TimeBlockScheduler::new();
        let horizon = Horizon::new(monday(), monday()).unwrap();
        let tasks = vec![
            TaskInput::new("ok", "Fine", 30),
            TaskInput::new("bad", "Zero", 0),
        ];

        let result = scheduler.schedule(&tasks, &horizon, &unrestricted(), &[], early_now());
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_inverted_work_window() {
        let config = WorkHours {
            workday_start_hour: 17,
            workday_end_hour: 9,
            ..WorkHours::default()
        };
        let scheduler = TimeBlockScheduler::with_config(config);
        let horizon = Horizon::new(monday(), monday()).unwrap();

        let result = scheduler.schedule(&[], &horizon, &unrestricted(), &[], early_now());
        assert!(result.is_err());
    }

    #[test]
    fn test_existing_placements_count_against_cap() {
        let config = WorkHours {
            weekday_max_minutes: Some(120),
            ..no_lunch()
        };
        let scheduler = TimeBlockScheduler::with_config(config);
        let horizon = Horizon::new(monday(), date(2026, 3, 3)).unwrap();
        let committed = Placement::new("old", at(2, 9, 0), at(2, 10, 30), 0);
        let tasks = vec![TaskInput::new("t1", "New work", 60)];

        let outcome = scheduler
            .schedule(&tasks, &horizon, &unrestricted(), &[committed], early_now())
            .unwrap();

        // 90 committed + 60 new would exceed the cap
        assert_eq!(outcome.placements[0].date, date(2026, 3, 3));
    }
}
