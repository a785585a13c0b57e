//! Helpers that turn raw crisis figures into [0, 1] component scores.

use super::round_to;

/// Severity of a humanitarian crisis from deaths per day, displaced people and
/// food-insecure people. Weighted 0.4 / 0.3 / 0.3, rounded to two places.
#[must_use]
pub fn severity_humanitarian(deaths_per_day: f64, displaced: u64, food_insecure: u64) -> f64 {
    let death_score = match deaths_per_day {
        d if d >= 10_000.0 => 1.0,
        d if d >= 1_000.0 => 0.8,
        d if d >= 100.0 => 0.6,
        d if d >= 10.0 => 0.4,
        _ => 0.2,
    };

    let displaced_m = displaced as f64 / 1_000_000.0;
    let displaced_score = match displaced_m {
        m if m >= 5.0 => 1.0,
        m if m >= 1.0 => 0.8,
        m if m >= 0.1 => 0.6,
        _ => 0.4,
    };

    let food_m = food_insecure as f64 / 1_000_000.0;
    let food_score = match food_m {
        m if m >= 10.0 => 1.0,
        m if m >= 5.0 => 0.8,
        m if m >= 1.0 => 0.6,
        _ => 0.4,
    };

    round_to(death_score * 0.4 + displaced_score * 0.3 + food_score * 0.3, 2)
}

/// Irreversibility from the number of days until harm becomes permanent.
#[must_use]
pub fn irreversibility_days(days: f64) -> f64 {
    match days {
        d if d < 1.0 => 1.0,
        d if d <= 3.0 => 0.8,
        d if d <= 7.0 => 0.6,
        d if d <= 30.0 => 0.4,
        _ => 0.2,
    }
}

/// Time pressure from a deterioration rate label; unknown labels score 0.5.
#[must_use]
pub fn time_pressure_rate(rate: &str) -> f64 {
    match rate.to_lowercase().as_str() {
        "chronic" => 0.2,
        "gradual" => 0.4,
        "rapid" => 0.6,
        "acute" => 0.8,
        "imminent" => 1.0,
        _ => 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_example() {
        // 150/day, 14M displaced, 25M food insecure
        assert_eq!(severity_humanitarian(150.0, 14_000_000, 25_000_000), 0.84);
    }

    #[test]
    fn test_severity_floor() {
        assert_eq!(severity_humanitarian(0.0, 0, 0), 0.32);
    }

    #[test]
    fn test_irreversibility_steps() {
        assert_eq!(irreversibility_days(0.5), 1.0);
        assert_eq!(irreversibility_days(3.0), 0.8);
        assert_eq!(irreversibility_days(7.0), 0.6);
        assert_eq!(irreversibility_days(30.0), 0.4);
        assert_eq!(irreversibility_days(31.0), 0.2);
    }

    #[test]
    fn test_time_pressure_labels() {
        assert_eq!(time_pressure_rate("Acute"), 0.8);
        assert_eq!(time_pressure_rate("imminent"), 1.0);
        assert_eq!(time_pressure_rate("sometime"), 0.5);
    }
}
