use proptest::prelude::*;

use swimcast::{
    analytics::{
        predictor::{confidence, training_factor},
        trend::{FitError, fit_points},
    },
    ingest::parse_str,
};

fn record_line(id: u8, distance: u16, day: u8, hundredths: u32) -> String {
    format!(
        "S{id},Swimmer {id},2008,F,{},Free,SCY,2024-01-{:02},{}.{:02}",
        u32::from(distance) + 1,
        u32::from(day) + 1,
        20 + hundredths / 100,
        hundredths % 100
    )
}

proptest! {
    #[test]
    fn training_factor_is_bounded_and_non_increasing(a in 1.0f64..=5.0, b in 1.0f64..=5.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(training_factor(hi) <= training_factor(lo));
        for s in [lo, hi] {
            let f = training_factor(s);
            prop_assert!((0.95 - 1e-12..=1.05 + 1e-12).contains(&f));
        }
    }

    #[test]
    fn confidence_stays_in_unit_interval(
        points in 0usize..200,
        score in 1.0f64..=5.0,
        slope in -10.0f64..10.0,
        r2 in prop::option::of(-5.0f64..=1.0),
    ) {
        let c = confidence(points, score, slope, r2);
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn exact_lines_are_recovered(
        slope in -1.0f64..1.0,
        intercept in 20.0f64..200.0,
        xs in prop::collection::btree_set(0i64..1000, 2..20),
    ) {
        let points: Vec<(f64, f64)> = xs
            .iter()
            .map(|&x| (x as f64, slope * x as f64 + intercept))
            .collect();
        let fit = fit_points(&points).expect("distinct x values");
        prop_assert!((fit.slope - slope).abs() < 1e-6);
        prop_assert!((fit.intercept - intercept).abs() < 1e-3);
    }

    #[test]
    fn repeated_x_is_degenerate(x in 0i64..1000, ys in prop::collection::vec(20.0f64..200.0, 2..10)) {
        let points: Vec<(f64, f64)> = ys.iter().map(|&y| (x as f64, y)).collect();
        prop_assert_eq!(fit_points(&points), Err(FitError::Degenerate));
    }

    #[test]
    fn malformed_lines_never_displace_good_ones(
        rows in prop::collection::vec((0u8..8, 0u16..400, 0u8..28, 0u32..10_000), 0..30),
        junk in prop::collection::vec("[a-z ,]{0,20}", 0..10),
    ) {
        let mut text = String::new();
        for (id, distance, day, hundredths) in &rows {
            text.push_str(&record_line(*id, *distance, *day, *hundredths));
            text.push('\n');
        }
        for line in &junk {
            text.push_str(line);
            text.push('\n');
        }

        let report = parse_str(&text);
        let blank = junk.iter().filter(|l| l.trim().is_empty()).count();
        prop_assert_eq!(report.results.len(), rows.len());
        prop_assert_eq!(report.skipped(), junk.len() - blank);
        for diag in &report.diagnostics {
            prop_assert!(diag.line > rows.len());
        }
    }
}
