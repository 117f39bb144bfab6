use auxsort::engine::config::{AxisKey, AxisOrder, ConfigError};

/// Parses an axis order such as `z+,x+@0.5,y-`, giving `fallback_tolerance` to every
/// key that does not carry its own.
pub fn parse_axis_order(text: &str, fallback_tolerance: f64) -> Result<Vec<AxisKey>, ConfigError> {
    let completed = text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            if token.contains('@') {
                token.to_string()
            } else {
                format!("{}@{}", token, fallback_tolerance)
            }
        })
        .collect::<Vec<_>>()
        .join(",");

    let order: AxisOrder = completed.parse()?;
    Ok(order.keys().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auxsort::engine::config::Axis;

    #[test]
    fn missing_tolerances_take_the_fallback() {
        let keys = parse_axis_order("z+, x+@0.5 ,y-", 0.1).unwrap();
        assert_eq!(
            keys,
            vec![
                AxisKey::ascending(Axis::Z, 0.1),
                AxisKey::ascending(Axis::X, 0.5),
                AxisKey::descending(Axis::Y, 0.1),
            ]
        );
    }

    #[test]
    fn invalid_orders_are_rejected() {
        assert_eq!(parse_axis_order("", 0.1), Err(ConfigError::EmptyAxisOrder));
        assert_eq!(
            parse_axis_order("x+,x-", 0.1),
            Err(ConfigError::DuplicateAxis(Axis::X))
        );
        assert!(matches!(
            parse_axis_order("w+", 0.1),
            Err(ConfigError::InvalidAxisKey(_))
        ));
        assert!(matches!(
            parse_axis_order("x+", -1.0),
            Err(ConfigError::InvalidTolerance { .. })
        ));
    }
}
