use std::time::Duration;
use sysdeck::ui::format_rate;
use sysdeck::{ByteRates, CounterPair, RateCalculator};

#[test]
fn test_two_samples_produce_displayed_rates() {
    let mut calc = RateCalculator::new();
    calc.seed(CounterPair::new(2000, 5000));

    let rates = calc
        .update(CounterPair::new(2500, 6024), Duration::from_secs(1))
        .unwrap()
        .clamped();

    assert_eq!(rates.upload, 500.0);
    assert_eq!(rates.download, 1024.0);
    assert_eq!(format_rate(rates.upload), "500 B/s");
    assert_eq!(format_rate(rates.download), "1.0 KB/s");
}

#[test]
fn test_counter_sequence_over_two_second_period() {
    let mut calc = RateCalculator::new();
    let period = Duration::from_secs(2);
    calc.seed(CounterPair::new(1000, 1000));

    let mut uploads = Vec::new();
    for sent in [1500, 1500, 1400] {
        let rates = calc.update(CounterPair::new(sent, 0), period).unwrap();
        uploads.push(rates.upload);
    }

    assert_eq!(uploads, vec![250.0, 0.0, -50.0]);
}

#[test]
fn test_counter_reset_is_clamped_for_display() {
    let mut calc = RateCalculator::new();
    calc.seed(CounterPair::new(10_000, 10_000));

    let rates = calc
        .update(CounterPair::new(0, 0), Duration::from_secs(1))
        .unwrap();
    assert!(rates.upload < 0.0);

    assert_eq!(
        rates.clamped(),
        ByteRates {
            upload: 0.0,
            download: 0.0
        }
    );
    assert_eq!(format_rate(rates.download), "0 B/s");
}

#[test]
fn test_zero_elapsed_yields_no_rate_but_rebases() {
    let mut calc = RateCalculator::new();
    calc.seed(CounterPair::new(0, 0));

    assert!(calc
        .update(CounterPair::new(100, 100), Duration::ZERO)
        .is_none());

    let rates = calc
        .update(CounterPair::new(300, 100), Duration::from_secs(1))
        .unwrap();
    assert_eq!(rates.upload, 200.0);
    assert_eq!(rates.download, 0.0);
}
