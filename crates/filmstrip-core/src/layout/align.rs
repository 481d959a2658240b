//! Row alignment
//!
//! A row with fewer, differently sized images is spaced so its first and last
//! images line up with the primary row's first and last images.

/// Gap between images so that `widths` fill `main_span`.
///
/// `main_span` is the distance from the left edge of the primary row's first
/// image to the right edge of its last. Returns None with fewer than two
/// images; a negative gap is clamped to 0.
pub fn row_gap(main_span: f64, widths: &[f64]) -> Option<f64> {
    if widths.len() < 2 || !main_span.is_finite() {
        return None;
    }
    let total: f64 = widths.iter().sum();
    let gap = (main_span - total) / (widths.len() - 1) as f64;
    Some(gap.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_distribution() {
        // 3 images of 200 spread across 1000 leave 400 for 2 gaps
        assert_eq!(row_gap(1000.0, &[200.0, 200.0, 200.0]), Some(200.0));
    }

    #[test]
    fn test_overfull_row_gets_no_gap() {
        assert_eq!(row_gap(300.0, &[200.0, 200.0]), Some(0.0));
    }

    #[test]
    fn test_too_few_images() {
        assert_eq!(row_gap(1000.0, &[]), None);
        assert_eq!(row_gap(1000.0, &[400.0]), None);
    }
}
