//! Property: at any instant, elapsed time equals the sum of closed
//! session durations plus, if Running, `now - current_session_start` --
//! for any interleaving of start/pause and any tick gaps.

use focusdeck_core::Stopwatch;
use proptest::prelude::*;

proptest! {
    #[test]
    fn elapsed_matches_closed_durations_plus_open_interval(
        // Alternating run/pause interval lengths, milliseconds.
        intervals in prop::collection::vec(1u64..100_000, 1..20),
        probe_gap in 0u64..10_000_000,
    ) {
        let mut sw = Stopwatch::new();
        let mut clock = 0u64;
        let mut closed_total = 0u64;

        for (i, len) in intervals.iter().enumerate() {
            if i % 2 == 0 {
                prop_assert!(sw.start(clock).is_some());
            } else {
                prop_assert!(sw.pause(clock).is_some());
            }
            clock += len;
        }

        // Close the books independently of the stopwatch.
        let ran_last = intervals.len() % 2 == 1;
        for (i, len) in intervals.iter().enumerate() {
            let running_phase = i % 2 == 0;
            let is_last = i == intervals.len() - 1;
            if running_phase && !(is_last && ran_last) {
                closed_total += len;
            }
        }

        let now = clock + probe_gap;
        let open_part = if ran_last {
            // Last start was at clock - last_len.
            let last_start = clock - intervals.last().unwrap();
            now - last_start
        } else {
            0
        };
        prop_assert_eq!(sw.elapsed_ms(now), closed_total + open_part);
    }

    #[test]
    fn session_numbers_never_repeat(
        pairs in prop::collection::vec((1u64..1_000, 1u64..1_000), 1..15),
    ) {
        let mut sw = Stopwatch::new();
        let mut clock = 0u64;
        for (run, rest) in pairs {
            sw.start(clock);
            clock += run;
            sw.pause(clock);
            clock += rest;
        }
        let nums: Vec<u32> = sw.sessions().iter().map(|s| s.num).collect();
        let expected: Vec<u32> = (1..=nums.len() as u32).collect();
        prop_assert_eq!(nums, expected);
    }
}
