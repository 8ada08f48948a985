use crate::error::EvalError;
use crate::math::matrix::Matrix;

/// Separates the labels from the features.
///
/// Every record is a fixed-length numeric vector whose final element is an
/// integer class label; everything before it is a real-valued feature. The
/// source records are copied, never mutated.
///
/// Fails with [`EvalError::Shape`] if any record has fewer than 2 columns,
/// since such a record cannot hold both a feature and a label.
pub fn split_records(records: &[Vec<f64>]) -> Result<(Matrix, Vec<i64>), EvalError> {
    let mut features = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        if record.len() < 2 {
            return Err(EvalError::Shape { index, cols: record.len() });
        }
        features.push(record[..record.len() - 1].to_vec());
        labels.push(record[record.len() - 1] as i64);
    }

    Ok((Matrix::from_data(features), labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_off_last_column_as_labels() {
        let records = vec![
            vec![0.5, 1.5, 2.0],
            vec![0.1, 0.2, 1.0],
        ];
        let (features, labels) = split_records(&records).unwrap();
        assert_eq!(features.rows, 2);
        assert_eq!(features.cols, 2);
        assert_eq!(features.row(0), &[0.5, 1.5]);
        assert_eq!(labels, vec![2, 1]);
    }

    #[test]
    fn label_vector_matches_input_length() {
        let records: Vec<Vec<f64>> = (0..7).map(|i| vec![i as f64, 0.0, 1.0]).collect();
        let (features, labels) = split_records(&records).unwrap();
        assert_eq!(labels.len(), records.len());
        assert_eq!(features.cols, records[0].len() - 1);
    }

    #[test]
    fn source_records_are_not_mutated() {
        let records = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let snapshot = records.clone();
        let _ = split_records(&records).unwrap();
        assert_eq!(records, snapshot);
    }

    #[test]
    fn narrow_record_is_a_shape_error() {
        let records = vec![vec![1.0, 2.0], vec![3.0]];
        match split_records(&records) {
            Err(EvalError::Shape { index, cols }) => {
                assert_eq!(index, 1);
                assert_eq!(cols, 1);
            }
            other => panic!("expected Shape error, got {:?}", other.map(|_| ())),
        }
    }
}
