use serde::{Deserialize, Serialize};

use super::JobId;
use crate::{core::Ticks, error::TimelineError};

/// One contiguous stretch of CPU time given to a single process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub job_id: JobId,
    pub start: Ticks,
    pub end: Ticks,
}

impl Interval {
    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }
}

/// Append-only recorder used by the driver while the simulation runs.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    intervals: Vec<Interval>,
    open: Option<(JobId, Ticks)>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, job_id: JobId, start: Ticks) {
        debug_assert!(self.open.is_none(), "Interval already open");
        debug_assert!(
            self.intervals.last().map_or(true, |last| last.end <= start),
            "Interval for {job_id} at {start} overlaps the previous one"
        );
        self.open = Some((job_id, start));
    }

    pub fn close(&mut self, end: Ticks) {
        let (job_id, start) = self.open.take().expect("No interval open");
        debug_assert!(start < end, "Empty interval for {job_id} at {start}");
        self.intervals.push(Interval { job_id, start, end });
    }

    pub fn seal(self) -> Timeline {
        debug_assert!(self.open.is_none(), "Sealing with an open interval");
        Timeline {
            intervals: self.intervals,
        }
    }
}

/// Sealed execution record: sorted by start, non-overlapping, never empty
/// intervals. Immutable once built.
///
/// Serialized as a plain array of intervals; deserializing re-checks the
/// ordering rules `TimelineBuilder` enforces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Interval>", try_from = "Vec<Interval>")]
pub struct Timeline {
    intervals: Vec<Interval>,
}

impl TryFrom<Vec<Interval>> for Timeline {
    type Error = TimelineError;

    fn try_from(intervals: Vec<Interval>) -> Result<Self, Self::Error> {
        let mut prev_end = 0;
        for (index, interval) in intervals.iter().enumerate() {
            let Interval { start, end, .. } = *interval;
            if start >= end {
                return Err(TimelineError::EmptyInterval { index, start, end });
            }
            if start < prev_end {
                return Err(TimelineError::Overlap {
                    index,
                    start,
                    prev_end,
                });
            }
            prev_end = end;
        }
        Ok(Self { intervals })
    }
}

impl From<Timeline> for Vec<Interval> {
    fn from(timeline: Timeline) -> Self {
        timeline.intervals
    }
}

impl Timeline {
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals_of(&self, job_id: JobId) -> impl Iterator<Item = &Interval> + '_ {
        self.intervals.iter().filter(move |i| i.job_id == job_id)
    }

    pub fn busy_time_of(&self, job_id: JobId) -> Ticks {
        self.intervals_of(job_id).map(Interval::duration).sum()
    }

    pub fn first_start_of(&self, job_id: JobId) -> Option<Ticks> {
        self.intervals_of(job_id).next().map(|i| i.start)
    }

    pub fn last_end_of(&self, job_id: JobId) -> Option<Ticks> {
        self.intervals_of(job_id).last().map(|i| i.end)
    }

    /// End of the last interval, 0 for an empty timeline.
    pub fn makespan(&self) -> Ticks {
        self.intervals.last().map_or(0, |i| i.end)
    }

    pub fn busy_time(&self) -> Ticks {
        self.intervals.iter().map(Interval::duration).sum()
    }

    /// Gaps between time 0 and the makespan with nothing on the CPU.
    pub fn idle_time(&self) -> Ticks {
        self.makespan() - self.busy_time()
    }

    /// Back-to-back intervals that hand the CPU to a different process.
    pub fn context_switches(&self) -> usize {
        self.intervals
            .windows(2)
            .filter(|w| w[0].job_id != w[1].job_id && w[0].end == w[1].start)
            .count()
    }

    /// Coalesces contiguous intervals of the same process. For display only;
    /// it drops round-robin slice boundaries.
    pub fn merged(&self) -> Vec<Interval> {
        let mut merged: Vec<Interval> = Vec::with_capacity(self.intervals.len());
        for interval in &self.intervals {
            match merged.last_mut() {
                Some(last) if last.job_id == interval.job_id && last.end == interval.start => {
                    last.end = interval.end;
                }
                _ => merged.push(*interval),
            }
        }
        merged
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}
