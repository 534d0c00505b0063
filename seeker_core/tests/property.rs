use proptest::prelude::*;
use seeker_core::{AxisMask, Bounds, OffsetWindow, PresenceWindow, TargetState};

fn brute_median(values: &[f64]) -> f64 {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v[v.len() / 2]
}

fn brute_max_count(values: &[f64], candidate: f64) -> (usize, usize) {
    let count = |x: f64| values.iter().filter(|v| **v == x).count();
    let best = values.iter().map(|v| count(*v)).max().unwrap_or(0);
    (count(candidate), best)
}

proptest! {
    #[test]
    fn offset_window_tracks_last_n_samples(
        cap in 1usize..16,
        // Small integer set so the mode sees real repeats.
        samples in prop::collection::vec(0u8..6, 1..80),
    ) {
        let mut w = OffsetWindow::new(cap);
        let mut all = Vec::new();
        for s in samples {
            let v = f64::from(s);
            w.push(v);
            all.push(v);
            let tail = &all[all.len().saturating_sub(cap)..];
            prop_assert_eq!(w.len(), tail.len());
            prop_assert_eq!(w.counted(), tail.len());
            prop_assert_eq!(w.iter().collect::<Vec<_>>(), tail.to_vec());
            prop_assert_eq!(w.average(), brute_median(tail));
            let mode = w.mode().unwrap();
            let (n, best) = brute_max_count(tail, mode);
            prop_assert_eq!(n, best);
        }
    }

    #[test]
    fn presence_window_mode_is_a_majority(
        cap in 1usize..16,
        flags in prop::collection::vec(any::<bool>(), 1..80),
    ) {
        let mut w = PresenceWindow::new(cap);
        let mut all = Vec::new();
        for f in flags {
            w.push(f);
            all.push(f);
            let tail = &all[all.len().saturating_sub(cap)..];
            let present = tail.iter().filter(|x| **x).count();
            let absent = tail.len() - present;
            prop_assert_eq!(w.present(), present);
            prop_assert_eq!(w.absent(), absent);
            let mode = w.average();
            if present > absent { prop_assert!(mode); }
            if absent > present { prop_assert!(!mode); }
        }
    }

    #[test]
    fn session_counter_never_exceeds_capacity(
        cap in 1usize..30,
        frames in prop::collection::vec((-30.0f64..30.0, -20.0f64..20.0, 0.0f64..2.0, any::<bool>()), 1..120),
    ) {
        let mut s = TargetState::new(cap, Bounds::default());
        for (i, (r, l, d, t)) in frames.into_iter().enumerate() {
            s.put_values([r, l, d], t);
            s.has_finished(0.25, AxisMask::ALL);
            prop_assert!(s.frames_in_session() <= cap);
            prop_assert_eq!(s.window_len(), s.frames_in_session());
            prop_assert_eq!(s.frames_seen(), i as u64 + 1);
        }
    }

    #[test]
    fn heading_latch_never_clears_within_a_session(
        frames in prop::collection::vec(-30.0f64..30.0, 1..100),
    ) {
        let mut s = TargetState::new(8, Bounds::default());
        let mut latched = false;
        for r in frames {
            s.put_values([r, 0.0, 0.7], true);
            s.has_finished(0.25, AxisMask::ALL);
            if latched {
                prop_assert!(s.has_initial_heading());
            }
            latched = s.has_initial_heading();
        }
    }
}
