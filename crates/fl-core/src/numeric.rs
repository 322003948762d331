/// Floating point type used throughout system
pub type Real = f64;

/// Parse a field the way the solver prints it.
///
/// Returns `None` for anything that is not a number (including `nan`), so
/// callers can store the result directly as a nullable cell.
pub fn parse_real(field: &str) -> Option<Real> {
    let v: Real = field.trim().parse().ok()?;
    if v.is_nan() { None } else { Some(v) }
}

/// Convert an index value read as a float into an integer key.
///
/// Truncates toward zero; non-finite values have no key.
pub fn real_to_index(v: Real) -> Option<i64> {
    if v.is_finite() { Some(v.trunc() as i64) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_real_handles_solver_notation() {
        assert_eq!(parse_real("1.2345e-03"), Some(1.2345e-3));
        assert_eq!(parse_real(" 300 "), Some(300.0));
        assert_eq!(parse_real("nan"), None);
        assert_eq!(parse_real("0:00:05"), None);
        assert_eq!(parse_real(""), None);
    }

    #[test]
    fn real_to_index_truncates() {
        assert_eq!(real_to_index(12.0), Some(12));
        assert_eq!(real_to_index(12.9), Some(12));
        assert_eq!(real_to_index(Real::INFINITY), None);
    }
}
