//! Temporal containment between timespans and method calls.
//!
//! A call is inside a timespan when both of its endpoints fall in the
//! half-open interval `[start, end)` of the timespan. A call that straddles
//! either boundary is not contained.
//!
//! The naive relation is the full cross product of timespans and calls. The
//! matcher keeps the calls sorted by start time so `calls_in` only visits
//! calls that start inside the span.

use crate::trace::{MethodCall, Timespan};

pub fn contains(timespan: &Timespan, call: &MethodCall) -> bool {
    let in_span = |t: i64| timespan.start_time_ns <= t && t < timespan.end_time_ns;
    in_span(call.start_time_ns) && in_span(call.end_time_ns)
}

pub struct ContainmentMatcher<'a> {
    timespans: &'a [Timespan],
    calls: &'a [MethodCall],
    /// Indices into `calls`, ordered by start time (ties keep arrival order).
    by_start: Vec<usize>,
}

impl<'a> ContainmentMatcher<'a> {
    pub fn new(timespans: &'a [Timespan], calls: &'a [MethodCall]) -> Self {
        let mut by_start: Vec<usize> = (0..calls.len()).collect();
        by_start.sort_by_key(|&i| calls[i].start_time_ns);
        Self {
            timespans,
            calls,
            by_start,
        }
    }

    /// Indices of the calls contained in `timespan`, ascending.
    pub fn call_indices_in(&self, timespan: &Timespan) -> Vec<usize> {
        let first = self
            .by_start
            .partition_point(|&i| self.calls[i].start_time_ns < timespan.start_time_ns);

        let mut out: Vec<usize> = self.by_start[first..]
            .iter()
            .copied()
            .take_while(|&i| self.calls[i].start_time_ns < timespan.end_time_ns)
            .filter(|&i| contains(timespan, &self.calls[i]))
            .collect();
        out.sort_unstable();
        out
    }

    /// Calls contained in `timespan`, in arrival order.
    pub fn calls_in(&self, timespan: &Timespan) -> Vec<&'a MethodCall> {
        let calls = self.calls;
        self.call_indices_in(timespan)
            .into_iter()
            .map(|i| &calls[i])
            .collect()
    }

    /// Timespans containing `call`, in arrival order.
    pub fn timespans_containing(&self, call: &MethodCall) -> Vec<&'a Timespan> {
        self.timespans
            .iter()
            .filter(|timespan| contains(timespan, call))
            .collect()
    }

    /// One flag per call: is it inside at least one timespan?
    pub fn contained_anywhere(&self) -> Vec<bool> {
        let mut flags = vec![false; self.calls.len()];
        for timespan in self.timespans {
            for i in self.call_indices_in(timespan) {
                flags[i] = true;
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn span(name: &str, start: i64, end: i64) -> Timespan {
        Timespan {
            name: name.to_string(),
            order: 0,
            start_time_ns: start,
            end_time_ns: end,
        }
    }

    fn call(name: &str, start: i64, end: i64) -> MethodCall {
        MethodCall {
            name: name.to_string(),
            line_number: 1,
            start_time_ns: start,
            end_time_ns: end,
        }
    }

    #[test]
    fn inner_call_is_contained() {
        assert!(contains(&span("A", 0, 1_000_000), &call("render", 100, 200)));
    }

    #[test]
    fn bounds_are_half_open() {
        let frame = span("A", 100, 200);
        assert!(contains(&frame, &call("x", 100, 100)));
        assert!(contains(&frame, &call("x", 100, 199)));
        assert!(!contains(&frame, &call("x", 100, 200)));
        assert!(!contains(&frame, &call("x", 200, 200)));
        assert!(!contains(&frame, &call("x", 99, 150)));
    }

    #[test]
    fn straddling_call_is_not_contained() {
        assert!(!contains(
            &span("Frame A", 0, 1_000_000),
            &call("render", 100, 2_000_000)
        ));
    }

    #[test]
    fn inverted_timespan_contains_nothing() {
        let spans = vec![span("bad", 500, 100)];
        let calls = vec![call("x", 200, 300), call("y", 500, 500)];
        let matcher = ContainmentMatcher::new(&spans, &calls);
        assert!(matcher.calls_in(&spans[0]).is_empty());
    }

    #[test]
    fn queries_in_both_directions() {
        let spans = vec![span("outer", 0, 1000), span("inner", 100, 200), span("late", 5000, 6000)];
        let calls = vec![
            call("a", 150, 160),
            call("b", 900, 950),
            call("c", 150, 300),
            call("d", 7000, 7001),
        ];
        let matcher = ContainmentMatcher::new(&spans, &calls);

        let names = |calls: Vec<&MethodCall>| -> Vec<String> {
            calls.iter().map(|c| c.name.clone()).collect()
        };
        assert_eq!(names(matcher.calls_in(&spans[0])), vec!["a", "b", "c"]);
        assert_eq!(names(matcher.calls_in(&spans[1])), vec!["a"]);
        assert!(matcher.calls_in(&spans[2]).is_empty());

        let containing = matcher.timespans_containing(&calls[0]);
        let span_names: Vec<&str> = containing.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(span_names, vec!["outer", "inner"]);
        assert!(matcher.timespans_containing(&calls[3]).is_empty());

        assert_eq!(matcher.contained_anywhere(), vec![true, true, true, false]);
    }

    #[test]
    fn results_keep_arrival_order_not_start_order() {
        let spans = vec![span("A", 0, 100)];
        let calls = vec![call("late", 50, 60), call("early", 10, 20)];
        let matcher = ContainmentMatcher::new(&spans, &calls);
        assert_eq!(matcher.call_indices_in(&spans[0]), vec![0, 1]);
    }

    fn arb_span() -> impl Strategy<Value = Timespan> {
        (0i64..500, 0i64..300).prop_map(|(start, len)| span("t", start, start + len))
    }

    fn arb_call() -> impl Strategy<Value = MethodCall> {
        (0i64..800, -20i64..100).prop_map(|(start, len)| call("c", start, start + len))
    }

    proptest! {
        #[test]
        fn contains_matches_half_open_rule(t in arb_span(), m in arb_call()) {
            let expected = t.start_time_ns <= m.start_time_ns
                && m.start_time_ns < t.end_time_ns
                && t.start_time_ns <= m.end_time_ns
                && m.end_time_ns < t.end_time_ns;
            prop_assert_eq!(contains(&t, &m), expected);
        }

        #[test]
        fn call_at_span_end_never_contained(t in arb_span(), len in 0i64..50) {
            let m = call("c", t.end_time_ns, t.end_time_ns + len);
            prop_assert!(!contains(&t, &m));
        }

        #[test]
        fn index_agrees_with_cross_product(
            spans in proptest::collection::vec(arb_span(), 0..8),
            calls in proptest::collection::vec(arb_call(), 0..40),
        ) {
            let matcher = ContainmentMatcher::new(&spans, &calls);
            for t in &spans {
                let naive: Vec<usize> = (0..calls.len())
                    .filter(|&i| contains(t, &calls[i]))
                    .collect();
                prop_assert_eq!(matcher.call_indices_in(t), naive);
            }
        }

        #[test]
        fn both_queries_are_consistent(
            spans in proptest::collection::vec(arb_span(), 0..8),
            calls in proptest::collection::vec(arb_call(), 0..40),
        ) {
            let matcher = ContainmentMatcher::new(&spans, &calls);
            for (ti, t) in spans.iter().enumerate() {
                let inside = matcher.call_indices_in(t);
                for (mi, m) in calls.iter().enumerate() {
                    let forward = inside.contains(&mi);
                    let backward = matcher
                        .timespans_containing(m)
                        .iter()
                        .any(|found| std::ptr::eq(*found, &spans[ti]));
                    prop_assert_eq!(forward, backward);
                }
            }
        }
    }
}
