pub use crate::config::*;

use log::{debug, warn};

/// Clamps a similarity value to `[0, 1]`. NaN becomes 0.
pub fn clamp_similarity(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Editing the matrix.
///
/// Every operation leaves `self` untouched and returns the next snapshot. The
/// presentation layer can keep holding on to a previous snapshot while a new
/// one is built.
///
/// ```
/// use brcma_matrix::MatrixModel;
///
/// let model = MatrixModel::seed();
/// let edited = model
///     .add_criterion()
///     .rename_criterion(3, "latency")
///     .set_similarity(0, 3, 1.7);
///
/// assert_eq!(edited.criteria()[3], "latency");
/// assert_eq!(edited.similarity()[0][3], 1.0);
/// // The previous snapshot did not move.
/// assert_eq!(model.m(), 3);
/// ```
impl MatrixModel {
    /// An empty matrix with the default thresholds.
    pub fn new() -> MatrixModel {
        MatrixModel {
            requirements: Vec::new(),
            criteria: Vec::new(),
            requirement_weights: Vec::new(),
            criterion_weights: Vec::new(),
            similarity: Vec::new(),
            thresholds: Thresholds::DEFAULT,
        }
    }

    /// The demonstration matrix loaded when nothing else is provided.
    pub fn seed() -> MatrixModel {
        MatrixModel {
            requirements: vec!["r1".to_string(), "r2".to_string(), "r3".to_string()],
            criteria: vec!["c1".to_string(), "c2".to_string(), "c3".to_string()],
            requirement_weights: vec![1.0, 1.0, 1.0],
            criterion_weights: vec![1.0, 1.0, 1.0],
            similarity: vec![
                vec![0.9, 0.8, 0.6],
                vec![0.2, 0.4, 0.3],
                vec![0.0, 0.0, 0.0],
            ],
            thresholds: Thresholds::DEFAULT,
        }
    }

    /// Assembles a matrix from its raw parts, checking the shape.
    ///
    /// The similarity values are clamped.
    pub fn from_parts(
        requirements: Vec<String>,
        criteria: Vec<String>,
        requirement_weights: Vec<f64>,
        criterion_weights: Vec<f64>,
        similarity: Vec<Vec<f64>>,
        thresholds: Thresholds,
    ) -> Result<MatrixModel, ShapeError> {
        let n = requirements.len();
        let m = criteria.len();
        if requirement_weights.len() != n {
            return Err(ShapeError::RequirementWeights {
                expected: n,
                found: requirement_weights.len(),
            });
        }
        if criterion_weights.len() != m {
            return Err(ShapeError::CriterionWeights {
                expected: m,
                found: criterion_weights.len(),
            });
        }
        if similarity.len() != n {
            return Err(ShapeError::RowCount {
                expected: n,
                found: similarity.len(),
            });
        }
        if let Some((row, values)) = similarity.iter().enumerate().find(|(_, r)| r.len() != m) {
            return Err(ShapeError::RowLength {
                row,
                expected: m,
                found: values.len(),
            });
        }
        let similarity = similarity
            .into_iter()
            .map(|row| row.into_iter().map(clamp_similarity).collect())
            .collect();
        Ok(MatrixModel {
            requirements,
            criteria,
            requirement_weights,
            criterion_weights,
            similarity,
            thresholds,
        })
    }

    /// Appends a requirement `r{n+1}` with weight 1 and a row of zeros.
    pub fn add_requirement(&self) -> MatrixModel {
        let mut next = self.clone();
        next.requirements.push(format!("r{}", self.n() + 1));
        next.requirement_weights.push(1.0);
        next.similarity.push(vec![0.0; self.m()]);
        debug!("add_requirement: n={}", next.n());
        next
    }

    /// Appends a criterion `c{m+1}` with weight 1 and a zero in every row.
    pub fn add_criterion(&self) -> MatrixModel {
        let mut next = self.clone();
        next.criteria.push(format!("c{}", self.m() + 1));
        next.criterion_weights.push(1.0);
        for row in next.similarity.iter_mut() {
            row.push(0.0);
        }
        debug!("add_criterion: m={}", next.m());
        next
    }

    pub fn rename_requirement(&self, i: usize, text: &str) -> MatrixModel {
        let mut next = self.clone();
        match next.requirements.get_mut(i) {
            Some(label) => *label = text.to_string(),
            None => warn!("rename_requirement: no requirement at index {}", i),
        }
        next
    }

    pub fn rename_criterion(&self, j: usize, text: &str) -> MatrixModel {
        let mut next = self.clone();
        match next.criteria.get_mut(j) {
            Some(label) => *label = text.to_string(),
            None => warn!("rename_criterion: no criterion at index {}", j),
        }
        next
    }

    /// Overwrites one weight. Weights are not clamped.
    pub fn set_weight(&self, kind: WeightKind, index: usize, value: f64) -> MatrixModel {
        let mut next = self.clone();
        let weights = match kind {
            WeightKind::Requirement => &mut next.requirement_weights,
            WeightKind::Criterion => &mut next.criterion_weights,
        };
        match weights.get_mut(index) {
            Some(w) => *w = value,
            None => warn!("set_weight: no {:?} weight at index {}", kind, index),
        }
        next
    }

    /// Overwrites one similarity value, clamped to `[0, 1]`.
    pub fn set_similarity(&self, i: usize, j: usize, value: f64) -> MatrixModel {
        let mut next = self.clone();
        match next.similarity.get_mut(i).and_then(|row| row.get_mut(j)) {
            Some(cell) => *cell = clamp_similarity(value),
            None => warn!("set_similarity: no cell at ({}, {})", i, j),
        }
        next
    }

    pub fn set_threshold(&self, name: ThresholdName, value: f64) -> MatrixModel {
        let mut next = self.clone();
        match name {
            ThresholdName::StrongReq => next.thresholds.strong_req = value,
            ThresholdName::WeakReq => next.thresholds.weak_req = value,
            ThresholdName::MissingReq => next.thresholds.missing_req = value,
        }
        next
    }
}

impl Default for MatrixModel {
    fn default() -> Self {
        MatrixModel::seed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn clamping() {
        init();
        let model = MatrixModel::seed();
        for (v, expected) in [
            (-3.0, 0.0),
            (0.0, 0.0),
            (0.42, 0.42),
            (1.0, 1.0),
            (7.5, 1.0),
            (f64::INFINITY, 1.0),
            (f64::NEG_INFINITY, 0.0),
            (f64::NAN, 0.0),
        ] {
            let edited = model.set_similarity(1, 2, v);
            assert_eq!(edited.similarity()[1][2], expected, "value {}", v);
        }
    }

    #[test]
    fn clamping_is_idempotent() {
        for v in [-1.0, 0.3, 2.0] {
            let once = clamp_similarity(v);
            assert_eq!(clamp_similarity(once), once);
        }
    }

    #[test]
    fn add_requirement_grows_rows() {
        init();
        let model = MatrixModel::seed().add_criterion();
        let next = model.add_requirement();
        assert_eq!(next.n(), model.n() + 1);
        assert_eq!(next.requirements().last().unwrap(), "r4");
        assert_eq!(next.requirement_weights().last(), Some(&1.0));
        assert_eq!(next.similarity().last().unwrap(), &vec![0.0; model.m()]);
        assert_eq!(next.similarity().len(), next.n());
    }

    #[test]
    fn add_criterion_grows_every_row() {
        init();
        let model = MatrixModel::seed();
        let next = model.add_criterion();
        assert_eq!(next.m(), model.m() + 1);
        assert_eq!(next.criteria().last().unwrap(), "c4");
        assert_eq!(next.criterion_weights().last(), Some(&1.0));
        for (before, after) in model.similarity().iter().zip(next.similarity()) {
            assert_eq!(after.len(), before.len() + 1);
            assert_eq!(&after[..before.len()], before.as_slice());
            assert_eq!(after.last(), Some(&0.0));
        }
    }

    #[test]
    fn add_criterion_on_empty_matrix() {
        let next = MatrixModel::new().add_criterion().add_requirement();
        assert_eq!(next.criteria(), &["c1".to_string()]);
        assert_eq!(next.requirements(), &["r1".to_string()]);
        assert_eq!(next.similarity(), &[vec![0.0]]);
    }

    #[test]
    fn rename_is_positional() {
        let model = MatrixModel::seed()
            .rename_requirement(0, "same")
            .rename_requirement(1, "same")
            .rename_criterion(2, "");
        assert_eq!(model.requirements()[0], "same");
        assert_eq!(model.requirements()[1], "same");
        assert_eq!(model.criteria()[2], "");
        assert_eq!(model.n(), 3);
        assert_eq!(model.similarity()[1], vec![0.2, 0.4, 0.3]);
    }

    #[test]
    fn weights_are_not_clamped() {
        let model = MatrixModel::seed()
            .set_weight(WeightKind::Requirement, 2, -4.5)
            .set_weight(WeightKind::Criterion, 0, 12.0);
        assert_eq!(model.requirement_weights(), &[1.0, 1.0, -4.5]);
        assert_eq!(model.criterion_weights(), &[12.0, 1.0, 1.0]);
    }

    #[test]
    fn thresholds_are_overwritten() {
        let model = MatrixModel::seed()
            .set_threshold(ThresholdName::StrongReq, 1.4)
            .set_threshold(ThresholdName::MissingReq, -0.1);
        assert_eq!(model.thresholds().get(ThresholdName::StrongReq), 1.4);
        assert_eq!(model.thresholds().weak_req, 0.30);
        assert_eq!(model.thresholds().missing_req, -0.1);
    }

    #[test]
    fn out_of_range_edits_are_no_ops() {
        init();
        let model = MatrixModel::seed();
        assert_eq!(model.set_similarity(3, 0, 0.5), model);
        assert_eq!(model.set_similarity(0, 3, 0.5), model);
        assert_eq!(model.rename_requirement(9, "x"), model);
        assert_eq!(model.set_weight(WeightKind::Criterion, 3, 2.0), model);
    }

    #[test]
    fn from_parts_checks_shape() {
        let t = Thresholds::DEFAULT;
        let r = vec!["a".to_string(), "b".to_string()];
        let c = vec!["x".to_string()];
        assert_eq!(
            MatrixModel::from_parts(r.clone(), c.clone(), vec![1.0], vec![1.0], vec![], t),
            Err(ShapeError::RequirementWeights {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            MatrixModel::from_parts(
                r.clone(),
                c.clone(),
                vec![1.0, 1.0],
                vec![1.0],
                vec![vec![0.1], vec![0.2, 0.3]],
                t
            ),
            Err(ShapeError::RowLength {
                row: 1,
                expected: 1,
                found: 2
            })
        );
        let model =
            MatrixModel::from_parts(r, c, vec![1.0, 2.0], vec![1.0], vec![vec![1.5], vec![-0.5]], t)
                .unwrap();
        assert_eq!(model.similarity(), &[vec![1.0], vec![0.0]]);
    }
}
