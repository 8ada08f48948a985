//! Evaluation metrics over integer label vectors.
//!
//! Everything here is a pure function of `(ground_truth, predictions)`.
//! Labels are class *values*, not necessarily `0..k-1`; the reported axes
//! come from [`reconcile_classes`].

use std::collections::{BTreeSet, HashMap};

use crate::error::EvalError;

/// Distinct sorted label values of one vector.
fn distinct(labels: &[i64]) -> Vec<i64> {
    labels.iter().copied().collect::<BTreeSet<i64>>().into_iter().collect()
}

/// Picks the class list used for reporting axes.
///
/// A class can be absent from one side (never predicted, or never present in
/// a small validation split), so the distinct sets are computed independently
/// and whichever has *strictly* more elements wins; ties go to the
/// ground-truth set. A class present only in the smaller set is omitted — a
/// known limitation of this scheme, kept as-is.
pub fn reconcile_classes(y_true: &[i64], y_pred: &[i64]) -> Vec<i64> {
    let classes_true = distinct(y_true);
    let classes_pred = distinct(y_pred);
    if classes_pred.len() > classes_true.len() {
        classes_pred
    } else {
        classes_true
    }
}

/// Confusion matrix indexed over the reconciled class list.
///
/// Returns `(classes, matrix)` where `matrix[i][j]` counts records whose true
/// class is `classes[i]` and predicted class is `classes[j]`. Pairs whose
/// class value fell outside the reconciled list are not counted.
pub fn confusion_matrix(
    y_true: &[i64],
    y_pred: &[i64],
) -> Result<(Vec<i64>, Vec<Vec<usize>>), EvalError> {
    check_lengths(y_true, y_pred)?;

    let classes = reconcile_classes(y_true, y_pred);
    let index: HashMap<i64, usize> =
        classes.iter().enumerate().map(|(i, &c)| (c, i)).collect();

    let mut matrix = vec![vec![0usize; classes.len()]; classes.len()];
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        if let (Some(&row), Some(&col)) = (index.get(&t), index.get(&p)) {
            matrix[row][col] += 1;
        }
    }

    Ok((classes, matrix))
}

/// Divides each row by its row sum.
///
/// A class that never appears as ground truth in the evaluated batch has a
/// zero row sum; its row is left all-zero (the sum is treated as 1) instead
/// of producing NaN.
pub fn normalize_rows(matrix: &[Vec<usize>]) -> Vec<Vec<f64>> {
    matrix
        .iter()
        .map(|row| {
            let sum: usize = row.iter().sum();
            let denom = if sum == 0 { 1.0 } else { sum as f64 };
            row.iter().map(|&v| v as f64 / denom).collect()
        })
        .collect()
}

/// Per-class precision, recall and F1 over the reconciled class list.
///
/// Returns `(classes, precision, recall, f1)`. A class with zero
/// predicted-positive (precision) or zero actual-positive (recall)
/// denominator scores a defined-as-zero value rather than failing; F1 is the
/// harmonic mean, zero when both components are zero.
pub fn precision_recall_f1(
    y_true: &[i64],
    y_pred: &[i64],
) -> Result<(Vec<i64>, Vec<f64>, Vec<f64>, Vec<f64>), EvalError> {
    check_lengths(y_true, y_pred)?;

    let classes = reconcile_classes(y_true, y_pred);
    let mut precision = Vec::with_capacity(classes.len());
    let mut recall = Vec::with_capacity(classes.len());
    let mut f1 = Vec::with_capacity(classes.len());

    for &class in &classes {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == class, p == class) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let p = ratio_or_zero(tp, tp + fp);
        let r = ratio_or_zero(tp, tp + fn_);
        let f = if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) };
        precision.push(p);
        recall.push(r);
        f1.push(f);
    }

    Ok((classes, precision, recall, f1))
}

/// Mean absolute deviation between true and predicted labels.
///
/// Only meaningful when labels carry ordinal/numeric semantics, which this
/// pipeline assumes (integer class indices). Inputs must be equal length.
pub fn mean_absolute_deviation(y_true: &[i64], y_pred: &[i64]) -> Result<f64, EvalError> {
    check_lengths(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let total: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).abs() as f64)
        .sum();
    Ok(total / y_true.len() as f64)
}

fn check_lengths(y_true: &[i64], y_pred: &[i64]) -> Result<(), EvalError> {
    if y_true.len() != y_pred.len() {
        return Err(EvalError::LengthMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    Ok(())
}

fn ratio_or_zero(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusion_matrix_counts_true_by_predicted() {
        let y_true = vec![0, 1, 1, 0];
        let y_pred = vec![0, 1, 0, 0];
        let (classes, matrix) = confusion_matrix(&y_true, &y_pred).unwrap();
        assert_eq!(classes, vec![0, 1]);
        assert_eq!(matrix, vec![vec![2, 0], vec![1, 1]]);
    }

    #[test]
    fn confusion_matrix_sums_match_counts() {
        let y_true = vec![2, 0, 2, 1, 0, 2];
        let y_pred = vec![2, 0, 1, 1, 2, 2];
        let (classes, matrix) = confusion_matrix(&y_true, &y_pred).unwrap();

        let total: usize = matrix.iter().flatten().sum();
        assert_eq!(total, y_true.len());

        // Row i sums to the ground-truth count of classes[i], column j to the
        // prediction count of classes[j].
        for (i, &class) in classes.iter().enumerate() {
            let row_sum: usize = matrix[i].iter().sum();
            assert_eq!(row_sum, y_true.iter().filter(|&&t| t == class).count());
            let col_sum: usize = matrix.iter().map(|row| row[i]).sum();
            assert_eq!(col_sum, y_pred.iter().filter(|&&p| p == class).count());
        }
    }

    #[test]
    fn confusion_matrix_uses_class_values_not_indices() {
        let y_true = vec![5, 9, 5];
        let y_pred = vec![5, 5, 9];
        let (classes, matrix) = confusion_matrix(&y_true, &y_pred).unwrap();
        assert_eq!(classes, vec![5, 9]);
        assert_eq!(matrix[0][0], 1); // true 5 predicted 5
        assert_eq!(matrix[1][0], 1); // true 9 predicted 5
    }

    #[test]
    fn length_mismatch_is_fatal() {
        assert!(matches!(
            confusion_matrix(&[0, 1], &[0]),
            Err(EvalError::LengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn normalized_rows_sum_to_one() {
        let matrix = vec![vec![2, 0], vec![1, 1]];
        let normalized = normalize_rows(&matrix);
        for row in &normalized {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        assert_eq!(normalized[1], vec![0.5, 0.5]);
    }

    #[test]
    fn zero_sum_row_stays_all_zero() {
        let matrix = vec![vec![0, 0], vec![3, 1]];
        let normalized = normalize_rows(&matrix);
        assert_eq!(normalized[0], vec![0.0, 0.0]);
        assert!(normalized[0].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn reconcile_prefers_larger_set() {
        // Predictions saw a class the ground truth never contains.
        let y_true = vec![0, 0, 1];
        let y_pred = vec![0, 1, 2];
        assert_eq!(reconcile_classes(&y_true, &y_pred), vec![0, 1, 2]);
    }

    #[test]
    fn reconcile_tie_goes_to_ground_truth() {
        let y_true = vec![0, 3];
        let y_pred = vec![1, 2];
        assert_eq!(reconcile_classes(&y_true, &y_pred), vec![0, 3]);
    }

    #[test]
    fn precision_recall_on_two_class_scenario() {
        let y_true = vec![0, 1, 1, 0];
        let y_pred = vec![0, 1, 0, 0];
        let (classes, precision, recall, f1) = precision_recall_f1(&y_true, &y_pred).unwrap();
        assert_eq!(classes, vec![0, 1]);
        // Class 1: one prediction, correct -> precision 1.0; one of two actual
        // positives found -> recall 0.5.
        assert!((precision[1] - 1.0).abs() < 1e-12);
        assert!((recall[1] - 0.5).abs() < 1e-12);
        assert!((f1[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn never_predicted_class_scores_zero_not_nan() {
        let y_true = vec![0, 1, 1];
        let y_pred = vec![0, 0, 0];
        let (classes, precision, recall, f1) = precision_recall_f1(&y_true, &y_pred).unwrap();
        assert_eq!(classes, vec![0, 1]);
        assert_eq!(precision[1], 0.0);
        assert_eq!(recall[1], 0.0);
        assert_eq!(f1[1], 0.0);
        assert!(precision.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn mad_of_identical_vectors_is_zero() {
        assert_eq!(mean_absolute_deviation(&[0, 1, 2], &[0, 1, 2]).unwrap(), 0.0);
    }

    #[test]
    fn mad_of_constant_offset_is_the_offset() {
        assert_eq!(mean_absolute_deviation(&[0, 0, 0], &[2, 2, 2]).unwrap(), 2.0);
    }

    #[test]
    fn mad_rejects_unequal_lengths() {
        assert!(matches!(
            mean_absolute_deviation(&[0, 1], &[0]),
            Err(EvalError::LengthMismatch { .. })
        ));
    }
}
