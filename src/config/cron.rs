//! Cron schedule validation
//!
//! Cloud Scheduler accepts unix-cron: five whitespace-separated fields.
//! Only the syntax is checked here; no next-fire computation is needed.

/// Bounds and symbolic names accepted by one cron field
struct Field {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
}

const MONTHS: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const WEEKDAYS: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

const FIELDS: [Field; 5] = [
    Field { name: "minute", min: 0, max: 59, names: &[] },
    Field { name: "hour", min: 0, max: 23, names: &[] },
    Field { name: "day-of-month", min: 1, max: 31, names: &[] },
    Field { name: "month", min: 1, max: 12, names: MONTHS },
    // 7 is accepted as an alias for Sunday
    Field { name: "day-of-week", min: 0, max: 7, names: WEEKDAYS },
];

/// Check that `expr` is a well-formed 5-field cron expression.
///
/// Returns a human readable reason on failure.
pub fn validate(expr: &str) -> Result<(), String> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    if parts.len() != FIELDS.len() {
        return Err(format!(
            "expected {} fields, found {}",
            FIELDS.len(),
            parts.len()
        ));
    }

    for (part, field) in parts.iter().zip(FIELDS.iter()) {
        for item in part.split(',') {
            validate_item(item, field)
                .map_err(|reason| format!("{} field '{}': {}", field.name, part, reason))?;
        }
    }

    Ok(())
}

fn validate_item(item: &str, field: &Field) -> Result<(), String> {
    if item.is_empty() {
        return Err("empty list element".to_string());
    }

    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };

    if let Some(step) = step {
        match step.parse::<u32>() {
            Ok(n) if n >= 1 => {},
            _ => return Err(format!("invalid step '{}'", step)),
        }
    }

    if range == "*" {
        return Ok(());
    }

    match range.split_once('-') {
        Some((start, end)) => {
            let start = parse_value(start, field)?;
            let end = parse_value(end, field)?;
            if start > end {
                return Err(format!("range {}-{} is reversed", start, end));
            }
            Ok(())
        },
        None => parse_value(range, field).map(|_| ()),
    }
}

fn parse_value(value: &str, field: &Field) -> Result<u32, String> {
    if let Ok(n) = value.parse::<u32>() {
        if n < field.min || n > field.max {
            return Err(format!(
                "{} is outside {}-{}",
                n, field.min, field.max
            ));
        }
        return Ok(n);
    }

    field
        .names
        .iter()
        .position(|name| name.eq_ignore_ascii_case(value))
        .map(|idx| idx as u32 + field.min)
        .ok_or_else(|| format!("unrecognized value '{}'", value))
}
