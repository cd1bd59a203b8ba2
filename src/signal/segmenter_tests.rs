use super::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Helper to build a Segmenter with an exact window length in samples
fn segmenter_with_window(window_len: usize) -> Segmenter {
    Segmenter::with_config(&SegmentationConfig {
        sample_rate: 1_000,
        keystroke_duration_seconds: window_len as f64 / 1_000.0,
        ..SegmentationConfig::default()
    })
}

/// Helper to place rectangular pulses of `amp` into a silent signal
fn pulse_signal(len: usize, pulses: &[(usize, usize, i32)]) -> Vec<i32> {
    let mut signal = vec![0i32; len];
    for &(start, pulse_len, amp) in pulses {
        for sample in signal.iter_mut().skip(start).take(pulse_len) {
            *sample = amp;
        }
    }
    signal
}

#[test]
fn test_empty_signal_yields_no_windows() {
    let segmenter = segmenter_with_window(50);
    let windows = segmenter.segment(&[], 10).unwrap();
    assert!(windows.is_empty());
}

#[test]
fn test_window_exceeding_signal_fails_fast() {
    let segmenter = segmenter_with_window(50);
    let err = segmenter.segment(&[0i32; 49], 10).unwrap_err();
    match err {
        SignalError::OutOfRange {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, 50);
            assert_eq!(available, 49);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

#[test]
fn test_silent_signal_yields_no_windows() {
    let segmenter = segmenter_with_window(50);
    let windows = segmenter.segment(&[0i32; 500], 10).unwrap();
    assert!(windows.is_empty());
}

#[test]
fn test_well_separated_pulses_extract_one_window_each() {
    // Three pulses shorter than L, separated by more than L of silence
    let window_len = 50;
    let pulses = [(100, 8, 900), (300, 12, -700), (600, 5, 450)];
    let signal = pulse_signal(1_000, &pulses);
    let segmenter = segmenter_with_window(window_len);

    let windows = segmenter.segment(&signal, 10).unwrap();
    assert_eq!(windows.len(), 3);

    for (window, &(start, pulse_len, amp)) in windows.iter().zip(&pulses) {
        assert_eq!(window.samples.len(), window_len);
        assert_eq!(window.onset, start);
        // The boundary probe lands in silence, so the window is not
        // corrected and covers the pulse plus L - pulse_len zero samples
        assert_eq!(window.active_len, window_len);
        assert!(window.samples[..pulse_len].iter().all(|&s| s == amp));
        assert!(window.samples[pulse_len..].iter().all(|&s| s == 0));
    }
}

#[test]
fn test_overrun_correction_avoids_straddling() {
    // The naive fixed window from the first onset lands inside the second
    // pulse; the corrected boundary must end strictly before its onset,
    // and the second pulse must still get its own window.
    let window_len = 150;
    let signal = pulse_signal(1_000, &[(100, 10, 800), (240, 20, 800)]);
    let segmenter = segmenter_with_window(window_len);

    let windows = segmenter.segment(&signal, 10).unwrap();
    assert_eq!(windows.len(), 2);

    let first = &windows[0];
    assert_eq!(first.onset, 100);
    assert!(
        first.onset + first.active_len < 240,
        "first window's active region {}..{} straddles the second onset",
        first.onset,
        first.onset + first.active_len
    );

    let second = &windows[1];
    assert_eq!(second.onset, 240);
    assert!(second.samples[..20].iter().all(|&s| s == 800));
}

#[test]
fn test_backtrack_stops_at_first_quiet_sample() {
    // Window end lands on the second pulse's first sample; one retreat step
    // reaches silence
    let window_len = 140;
    let signal = pulse_signal(1_000, &[(100, 10, 800), (240, 20, 800)]);
    let segmenter = segmenter_with_window(window_len);

    let windows = segmenter.segment(&signal, 10).unwrap();
    assert_eq!(windows[0].onset, 100);
    // b started at 240 (active), retreated to 239 (silent)
    assert_eq!(windows[0].active_len, 139);
    assert_eq!(windows[1].onset, 240);
}

#[test]
fn test_adjacent_loud_keystrokes_pin_boundary_at_onset_plus_one() {
    // Everything above threshold: overrun correction retreats the boundary
    // all the way down to a + 1 even though that sample is still active.
    // Known degenerate output for back-to-back loud keystrokes - pinned
    // here so a behavior change is a deliberate decision, not an accident.
    let window_len = 5;
    let signal = vec![100i32; 10];
    let segmenter = segmenter_with_window(window_len);

    let windows = segmenter.segment(&signal, 10).unwrap();
    assert_eq!(windows.len(), 6);

    for (k, window) in windows.iter().take(5).enumerate() {
        assert_eq!(window.onset, k);
        assert_eq!(window.active_len, 1);
        assert_eq!(window.samples[0], 100);
        assert!(window.samples[1..].iter().all(|&s| s == 0));
        // The sample at the chosen boundary is itself still above threshold
        assert!(signal[window.onset + window.active_len].abs() > 10);
    }

    // The final onset's fixed window reaches the end of the signal, so no
    // boundary probe fires and the full window survives
    let last = &windows[5];
    assert_eq!(last.onset, 5);
    assert_eq!(last.active_len, 5);
}

#[test]
fn test_sample_equal_to_threshold_is_silence() {
    let mut signal = vec![0i32; 200];
    signal[50] = 10; // exactly at threshold: not an onset
    signal[120] = 11; // strictly above: onset
    signal[140] = -10; // |x| == threshold: not an onset
    let segmenter = segmenter_with_window(50);

    let windows = segmenter.segment(&signal, 10).unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].onset, 120);
    assert_eq!(windows[0].active_len, 50);
}

#[test]
fn test_negative_onset_detected_by_magnitude() {
    let signal = pulse_signal(300, &[(80, 6, -900)]);
    let segmenter = segmenter_with_window(40);

    let windows = segmenter.segment(&signal, 10).unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].onset, 80);
    assert_eq!(windows[0].samples[0], -900);
}

#[test]
fn test_onset_at_last_sample_pads_to_full_window() {
    let mut signal = vec![0i32; 200];
    signal[199] = 500;
    let segmenter = segmenter_with_window(50);

    let windows = segmenter.segment(&signal, 10).unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].onset, 199);
    assert_eq!(windows[0].active_len, 1);
    assert_eq!(windows[0].samples[0], 500);
    assert!(windows[0].samples[1..].iter().all(|&s| s == 0));
}

#[test]
fn test_window_truncated_by_signal_end_is_padded() {
    // Onset 30 samples from the end with a 50-sample window
    let signal = pulse_signal(200, &[(170, 30, 600)]);
    let segmenter = segmenter_with_window(50);

    let windows = segmenter.segment(&signal, 10).unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].onset, 170);
    assert_eq!(windows[0].active_len, 30);
    assert_eq!(windows[0].padding_len(), 20);
}

#[test]
fn test_segmentation_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut signal = vec![0i32; 2_000];
    for _ in 0..12 {
        let start = rng.gen_range(0..1_990);
        let amp = rng.gen_range(200..900) * if rng.gen_bool(0.5) { 1 } else { -1 };
        for sample in signal.iter_mut().skip(start).take(10) {
            *sample = amp;
        }
    }
    let segmenter = segmenter_with_window(60);

    let first = segmenter.segment(&signal, 50).unwrap();
    let second = segmenter.segment(&signal, 50).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_windows_are_ordered_and_disjoint() {
    let mut rng = StdRng::seed_from_u64(7_777);
    let mut signal = vec![0i32; 5_000];
    for _ in 0..40 {
        let start = rng.gen_range(0..4_990);
        let amp = rng.gen_range(100..1_000);
        for sample in signal.iter_mut().skip(start).take(rng.gen_range(1..10)) {
            *sample = amp;
        }
    }
    let segmenter = segmenter_with_window(120);

    let windows = segmenter.segment(&signal, 60).unwrap();
    assert!(!windows.is_empty());
    for window in &windows {
        assert_eq!(window.samples.len(), 120);
        assert!(window.active_len >= 1);
        assert!(window.active_len <= 120);
    }
    for pair in windows.windows(2) {
        assert!(
            pair[0].onset + pair[0].active_len <= pair[1].onset,
            "window {}..{} overlaps window starting at {}",
            pair[0].onset,
            pair[0].onset + pair[0].active_len,
            pair[1].onset
        );
    }
}

#[test]
fn test_input_signal_is_not_mutated() {
    let signal = pulse_signal(500, &[(100, 10, 700)]);
    let copy = signal.clone();
    let segmenter = segmenter_with_window(50);

    segmenter.segment(&signal, 10).unwrap();
    assert_eq!(signal, copy);
}
