//! Missing Value Imputation

use crate::frame::{Column, Frame};

/// Median of the non-NaN values (mean of the middle pair for even counts)
pub fn median(values: &[f64]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);

    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// Replace NaNs in every numeric column with that column's median
///
/// Columns with no observed value are left untouched.
pub fn fill_missing_with_median(frame: &mut Frame) {
    for column in frame.columns_mut() {
        if let Column::Numeric(values) = column {
            if let Some(fill) = median(values) {
                for v in values.iter_mut().filter(|v| v.is_nan()) {
                    *v = fill;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[f64::NAN, 5.0]), Some(5.0));
        assert_eq!(median(&[f64::NAN]), None);
    }

    #[test]
    fn test_fill_missing() {
        let mut frame = Frame::new();
        frame
            .push_column("torque", Column::Numeric(vec![10.0, f64::NAN, 30.0]))
            .unwrap();
        frame
            .push_column("empty", Column::Numeric(vec![f64::NAN; 3]))
            .unwrap();
        frame
            .push_column("Type", Column::Text(vec!["L".into(), "".into(), "M".into()]))
            .unwrap();

        fill_missing_with_median(&mut frame);

        assert_eq!(frame.numeric("torque"), Some(&[10.0, 20.0, 30.0][..]));
        assert!(frame.numeric("empty").unwrap().iter().all(|v| v.is_nan()));
    }

    proptest! {
        #[test]
        fn median_lies_within_range(values in prop::collection::vec(-1e6f64..1e6, 1..50)) {
            let m = median(&values).unwrap();
            let min = values.iter().cloned().fold(f64::MAX, f64::min);
            let max = values.iter().cloned().fold(f64::MIN, f64::max);
            prop_assert!(m >= min && m <= max);
        }
    }
}
