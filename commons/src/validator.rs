use crate::types::{Diagnostics, Dynamic};
use chrono::{NaiveTime, Weekday};

/// Checks a configured value and reports problems as diagnostics
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics);
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl StringPatternValidator {
    /// Panics on an invalid pattern; patterns are compile-time literals
    pub fn new(pattern: &str, description: &str) -> Self {
        Self {
            pattern: regex::Regex::new(pattern).expect("validator pattern must compile"),
            description: description.to_string(),
        }
    }
}

impl Validator for StringPatternValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_str() {
            if !self.pattern.is_match(s) {
                diagnostics.add_error(
                    format!("{} must match {}", attribute_path, self.description),
                    Some(format!("Value '{}' does not match pattern", s)),
                );
            }
        }
    }
}

pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validator for NumberRangeValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min {
                if n < min {
                    diagnostics.add_error(
                        format!("{} must be at least {}", attribute_path, min),
                        Some(format!("Got {}", n)),
                    );
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    diagnostics.add_error(
                        format!("{} must be at most {}", attribute_path, max),
                        Some(format!("Got {}", n)),
                    );
                }
            }
        }
    }
}

pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for ListLengthValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(items) = value.as_list() {
            if let Some(min) = self.min {
                if items.len() < min {
                    diagnostics.add_error(
                        format!("{} must have at least {} items", attribute_path, min),
                        Some(format!("Got {} items", items.len())),
                    );
                }
            }
            if let Some(max) = self.max {
                if items.len() > max {
                    diagnostics.add_error(
                        format!("{} must have at most {} items", attribute_path, max),
                        Some(format!("Got {} items", items.len())),
                    );
                }
            }
        }
    }
}

/// Passes the unset sentinel through untouched, checks anything else with `inner`
pub struct SentinelOr<V> {
    pub sentinel: i64,
    pub inner: V,
}

impl<V: Validator> Validator for SentinelOr<V> {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if value.as_i64() == Some(self.sentinel) {
            return;
        }
        self.inner.validate(value, attribute_path, diagnostics);
    }
}

/// Accepts only the listed string values
pub struct OneOfValidator {
    pub allowed: Vec<&'static str>,
}

impl OneOfValidator {
    pub fn new(allowed: &[&'static str]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }
}

impl Validator for OneOfValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_str() {
            if !self.allowed.contains(&s) {
                diagnostics.add_error(
                    format!(
                        "{} must be one of: {}",
                        attribute_path,
                        self.allowed.join(", ")
                    ),
                    Some(format!("Got '{}'", s)),
                );
            }
        }
    }
}

/// Validates weekly windows such as "Mon:03:00-Wed:02:30", either as a
/// single string or as every element of a list
pub struct TimeWindowValidator;

impl TimeWindowValidator {
    fn check(window: &str) -> bool {
        match window.split_once('-') {
            Some((start, end)) => parse_weekly_time(start).is_some() && parse_weekly_time(end).is_some(),
            None => false,
        }
    }
}

fn parse_weekly_time(value: &str) -> Option<(Weekday, NaiveTime)> {
    let (day, time) = value.split_once(':')?;
    if day.len() != 3 {
        return None;
    }
    let day = day.parse::<Weekday>().ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Some((day, time))
}

impl Validator for TimeWindowValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        let windows: Vec<&str> = match value {
            Dynamic::String(s) => vec![s.as_str()],
            Dynamic::List(items) => items.iter().filter_map(Dynamic::as_str).collect(),
            _ => return,
        };

        for window in windows {
            if !Self::check(window) {
                diagnostics.add_error(
                    format!(
                        "{} must be a time window in the format ddd:hh:mm-ddd:hh:mm",
                        attribute_path
                    ),
                    Some(format!("Got '{}'", window)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Diagnostics, Dynamic};

    #[test]
    fn string_pattern_validator_accepts_durations() {
        let validator = StringPatternValidator::new(r"^\d+[smh]$", "a duration such as 30s");

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("5m".to_string()), "interval", &mut diags);
        assert_eq!(diags.errors.len(), 0);

        validator.validate(&Dynamic::String("five".to_string()), "interval", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("a duration"));
    }

    #[test]
    fn number_range_validator_rejects_too_large() {
        let validator = NumberRangeValidator {
            min: Some(0.0),
            max: Some(100.0),
        };

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::Number(50.0), "spot_percentage", &mut diags);
        assert_eq!(diags.errors.len(), 0);

        validator.validate(&Dynamic::Number(101.0), "spot_percentage", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("at most"));
    }

    #[test]
    fn list_length_validator_rejects_too_many() {
        let validator = ListLengthValidator {
            min: None,
            max: Some(1),
        };

        let mut diags = Diagnostics::new();
        let list = Dynamic::List(vec![
            Dynamic::String("a".to_string()),
            Dynamic::String("b".to_string()),
        ]);
        validator.validate(&list, "items", &mut diags);

        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn sentinel_or_lets_unset_value_through() {
        let validator = SentinelOr {
            sentinel: -1,
            inner: NumberRangeValidator {
                min: Some(0.0),
                max: Some(100.0),
            },
        };

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::Number(-1.0), "spot_percentage", &mut diags);
        validator.validate(&Dynamic::Number(40.0), "spot_percentage", &mut diags);
        assert!(!diags.has_errors());

        validator.validate(&Dynamic::Number(-2.0), "spot_percentage", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("at least 0"));
    }

    #[test]
    fn one_of_validator() {
        let validator = OneOfValidator::new(&["always", "never", "timeWindow"]);

        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::String("never".to_string()), "perform_at", &mut diags);
        assert!(!diags.has_errors());

        validator.validate(&Dynamic::String("sometimes".to_string()), "perform_at", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("always, never, timeWindow"));
    }

    #[test]
    fn time_window_validator_checks_every_window() {
        let validator = TimeWindowValidator;

        let mut diags = Diagnostics::new();
        let windows = Dynamic::List(vec![
            Dynamic::String("Mon:03:00-Wed:02:30".to_string()),
            Dynamic::String("Sun:25:00-Mon:01:00".to_string()),
            Dynamic::String("Mon:03:00".to_string()),
        ]);
        validator.validate(&windows, "optimization_windows", &mut diags);

        assert_eq!(diags.errors.len(), 2);
    }
}
