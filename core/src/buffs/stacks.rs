//! Stack-occupancy bookkeeping for one agent and one buff.
//!
//! Replays discrete apply/remove calls into a run of time-contiguous
//! segments with constant resolved stack count. Callers must feed times in
//! non-decreasing order; a decreasing timestamp is a bug in the caller, not
//! a data condition, and trips an assertion.

use crate::model::AgentId;

/// One live stack with its own expiry and source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuffStack {
    pub start: i64,
    pub end: i64,
    pub source: AgentId,
}

/// Maximal run of constant resolved stack count over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BuffStatusSegment {
    pub start: i64,
    pub end: i64,
    pub stacks: u32,
}

impl BuffStatusSegment {
    pub fn duration_ms(&self) -> i64 {
        self.end - self.start
    }
}

/// Sorted set of live stacks plus the finalized segment run.
#[derive(Debug, Clone)]
pub struct BuffStackCollection {
    stack_limit: u32,
    /// Live stacks, ascending by expiry.
    active: Vec<BuffStack>,
    segments: Vec<BuffStatusSegment>,
    /// Start of the currently open segment; `None` until the first call.
    open_since: Option<i64>,
    last_time: i64,
}

impl BuffStackCollection {
    pub fn new(stack_limit: u32) -> Self {
        Self {
            stack_limit,
            active: Vec::new(),
            segments: Vec::new(),
            open_since: None,
            last_time: i64::MIN,
        }
    }

    pub fn live_stacks(&self) -> usize {
        self.active.len()
    }

    /// Stack count as reported after the per-skill cap.
    fn capped(&self) -> u32 {
        (self.active.len() as u32).min(self.stack_limit)
    }

    fn check_time(&mut self, time: i64) {
        assert!(
            time >= self.last_time,
            "stack collection fed decreasing time: {time} after {}",
            self.last_time
        );
        self.last_time = time;
    }

    /// Open a new stack over `[start, end)` from `source`.
    pub fn add_stack(&mut self, start: i64, end: i64, source: AgentId) {
        self.check_time(start);
        self.expire_until(start);
        self.close_segment_at(start);
        let stack = BuffStack { start, end, source };
        let pos = self.active.partition_point(|s| s.end <= end);
        self.active.insert(pos, stack);
    }

    /// Remove exactly one live stack whose remaining duration at `time`
    /// equals `remaining_ms`.
    ///
    /// Stacks are matched by remaining duration because the wire carries no
    /// per-stack handle; two concurrent stacks with equal remainder are
    /// indistinguishable here and an arbitrary one is removed. No match is
    /// a no-op: tolerating over-removal beats failing the whole log.
    pub fn remove_stack(&mut self, time: i64, remaining_ms: i64) {
        self.check_time(time);
        self.expire_until(time);
        self.close_segment_at(time);
        if let Some(pos) = self.active.iter().position(|s| s.end - time == remaining_ms) {
            self.active.remove(pos);
        }
    }

    /// Clear every live stack and start a zero-count segment.
    pub fn remove_all_stacks(&mut self, time: i64) {
        self.check_time(time);
        self.expire_until(time);
        self.close_segment_at(time);
        self.active.clear();
    }

    /// Close the final open segment at `time` and return the finished run.
    /// Zero-length segments from back-to-back same-timestamp calls are
    /// already discarded, and adjacent equal-count segments merged.
    pub fn finalize(mut self, time: i64) -> Vec<BuffStatusSegment> {
        self.check_time(time);
        self.expire_until(time);
        self.close_segment_at(time);
        self.segments
    }

    /// Process natural expiries up to `to`, each producing a segment
    /// boundary at its own expiry time.
    fn expire_until(&mut self, to: i64) {
        while let Some(first_end) = self.active.first().map(|s| s.end) {
            if first_end > to {
                break;
            }
            self.close_segment_at(first_end);
            self.active.retain(|s| s.end != first_end);
        }
    }

    /// Close the open segment at `at` with the current count and reopen.
    fn close_segment_at(&mut self, at: i64) {
        let stacks = self.capped();
        match self.open_since {
            Some(open) if at > open => {
                self.push_segment(open, at, stacks);
                self.open_since = Some(at);
            }
            Some(_) => {} // same-timestamp call; nothing to close
            None => self.open_since = Some(at),
        }
    }

    /// Append a segment, merging into the previous one when the count did
    /// not change. Segment count stays proportional to state changes.
    fn push_segment(&mut self, start: i64, end: i64, stacks: u32) {
        if let Some(last) = self.segments.last_mut()
            && last.end == start
            && last.stacks == stacks
        {
            last.end = end;
            return;
        }
        self.segments.push(BuffStatusSegment { start, end, stacks });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> AgentId {
        AgentId::new(0)
    }

    fn other_src() -> AgentId {
        AgentId::new(1)
    }

    #[test]
    fn single_stack_produces_one_segment_per_state() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(1000, 5000, src());
        let segments = c.finalize(8000);

        assert_eq!(
            segments,
            vec![
                BuffStatusSegment {
                    start: 1000,
                    end: 5000,
                    stacks: 1
                },
                BuffStatusSegment {
                    start: 5000,
                    end: 8000,
                    stacks: 0
                },
            ]
        );
    }

    #[test]
    fn segments_are_contiguous_and_cover_first_call_to_finalize() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(1000, 4000, src());
        c.add_stack(2000, 6000, other_src());
        c.remove_all_stacks(5000);
        c.add_stack(5500, 9000, src());
        let segments = c.finalize(7000);

        assert_eq!(segments.first().unwrap().start, 1000);
        assert_eq!(segments.last().unwrap().end, 7000);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap in segment run");
        }
    }

    #[test]
    fn counts_match_a_direct_replay() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(0, 10_000, src());
        c.add_stack(2000, 6000, other_src());
        let segments = c.finalize(12_000);

        let at = |t: i64| {
            segments
                .iter()
                .find(|s| s.start <= t && t < s.end)
                .map(|s| s.stacks)
        };
        assert_eq!(at(1000), Some(1));
        assert_eq!(at(3000), Some(2));
        assert_eq!(at(7000), Some(1)); // second stack expired at 6000
        assert_eq!(at(11_000), Some(0)); // first expired at 10000
    }

    #[test]
    fn natural_expiry_creates_boundary_at_expiry_time() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(0, 3000, src());
        // Next event long after the expiry.
        c.add_stack(9000, 12_000, src());
        let segments = c.finalize(12_000);

        assert_eq!(
            segments,
            vec![
                BuffStatusSegment {
                    start: 0,
                    end: 3000,
                    stacks: 1
                },
                BuffStatusSegment {
                    start: 3000,
                    end: 9000,
                    stacks: 0
                },
                BuffStatusSegment {
                    start: 9000,
                    end: 12_000,
                    stacks: 1
                },
            ]
        );
    }

    #[test]
    fn removal_matches_by_remaining_duration() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(0, 5000, src());
        c.add_stack(0, 8000, other_src());
        // Remove the stack with 3000ms left at t=2000: that is the first one.
        c.remove_stack(2000, 3000);
        let segments = c.finalize(9000);

        let at_2500 = segments.iter().find(|s| s.start <= 2500 && 2500 < s.end);
        assert_eq!(at_2500.unwrap().stacks, 1);
        // The 8000 expiry still stands, leaving a trailing zero segment.
        assert_eq!(segments.last().unwrap().stacks, 0);
    }

    #[test]
    fn removal_without_match_is_a_no_op() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(0, 5000, src());
        c.remove_stack(1000, 123_456);
        let segments = c.finalize(5000);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].stacks, 1);
        assert_eq!(segments[0].duration_ms(), 5000);
    }

    #[test]
    fn stack_count_is_capped_per_skill() {
        let mut c = BuffStackCollection::new(2);
        c.add_stack(0, 10_000, src());
        c.add_stack(100, 10_000, src());
        c.add_stack(200, 10_000, src());
        // The cap applies to the resolved count, not the live set.
        assert_eq!(c.live_stacks(), 3);
        let segments = c.finalize(1000);
        assert_eq!(segments.last().unwrap().stacks, 2);
    }

    #[test]
    fn same_timestamp_calls_leave_no_zero_length_segments() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(1000, 5000, src());
        c.add_stack(1000, 6000, src());
        c.remove_stack(1000, 4000);
        let segments = c.finalize(6000);

        for segment in &segments {
            assert!(segment.duration_ms() > 0, "zero-length segment survived");
        }
        assert_eq!(segments.first().unwrap().start, 1000);
    }

    #[test]
    fn equal_adjacent_counts_are_merged() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(0, 10_000, src());
        // Removal that matches nothing closes and reopens at the same count.
        c.remove_stack(2000, 99_999);
        c.remove_stack(4000, 99_999);
        let segments = c.finalize(10_000);

        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0],
            BuffStatusSegment {
                start: 0,
                end: 10_000,
                stacks: 1
            }
        );
    }

    #[test]
    fn remove_all_starts_a_zero_count_segment() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(0, 20_000, src());
        c.add_stack(0, 20_000, src());
        c.remove_all_stacks(5000);
        let segments = c.finalize(9000);

        assert_eq!(
            segments,
            vec![
                BuffStatusSegment {
                    start: 0,
                    end: 5000,
                    stacks: 2
                },
                BuffStatusSegment {
                    start: 5000,
                    end: 9000,
                    stacks: 0
                },
            ]
        );
    }

    #[test]
    #[should_panic(expected = "decreasing time")]
    fn decreasing_time_is_a_programming_error() {
        let mut c = BuffStackCollection::new(25);
        c.add_stack(5000, 9000, src());
        c.add_stack(1000, 2000, src());
    }
}
