use std::sync::Arc;

use crate::brcma::*;

/// What is known about the analysis of the current matrix.
#[derive(PartialEq, Debug, Clone)]
pub enum ResultState {
    Empty,
    Current(AnalysisResult),
    /// A newer analysis has been requested and has not completed yet.
    Stale(AnalysisResult),
}

/// A request handed out by [Session::begin_analysis].
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    pub id: u64,
    /// The snapshot to submit. Later edits do not affect it.
    pub model: Arc<MatrixModel>,
}

/// The state of one editing session: the current matrix, the last analysis
/// result and the last error.
///
/// The matrix is only ever replaced as a whole, so a reader holding a
/// snapshot never sees a partial update.
pub struct Session {
    model: Arc<MatrixModel>,
    result: ResultState,
    next_request: u64,
    // Completions of requests below this id are dropped.
    accept_from: u64,
    error: Option<String>,
}

impl Session {
    pub fn new(model: MatrixModel) -> Session {
        Session {
            model: Arc::new(model),
            result: ResultState::Empty,
            next_request: 0,
            accept_from: 0,
            error: None,
        }
    }

    pub fn model(&self) -> Arc<MatrixModel> {
        self.model.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_stale(&self) -> bool {
        matches!(self.result, ResultState::Stale(_))
    }

    /// Applies an editor operation to the current matrix.
    pub fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&MatrixModel) -> MatrixModel,
    {
        self.model = Arc::new(f(&self.model));
    }

    /// Replaces the matrix. The result and the error belong to the previous
    /// matrix and are cleared, and analyses still in flight are ignored.
    pub fn load(&mut self, model: MatrixModel) {
        info!(
            "load: {} requirements, {} criteria",
            model.n(),
            model.m()
        );
        self.model = Arc::new(model);
        self.result = ResultState::Empty;
        self.error = None;
        self.accept_from = self.next_request;
    }

    /// Loads an imported matrix. On failure, the matrix and the result are
    /// left untouched and the error is recorded.
    pub fn apply_import(&mut self, outcome: BrcmaResult<MatrixModel>) -> BrcmaResult<()> {
        match outcome {
            Ok(model) => {
                self.load(model);
                Ok(())
            }
            Err(e) => {
                warn!("apply_import: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn begin_analysis(&mut self) -> PendingAnalysis {
        let id = self.next_request;
        self.next_request += 1;
        let previous = std::mem::replace(&mut self.result, ResultState::Empty);
        self.result = match previous {
            ResultState::Current(r) | ResultState::Stale(r) => ResultState::Stale(r),
            ResultState::Empty => ResultState::Empty,
        };
        debug!("begin_analysis: request {}", id);
        PendingAnalysis {
            id,
            model: self.model.clone(),
        }
    }

    /// Records the outcome of a request. A failure clears the result.
    pub fn finish_analysis(
        &mut self,
        id: u64,
        outcome: BrcmaResult<AnalysisResult>,
    ) -> BrcmaResult<()> {
        if id < self.accept_from {
            debug!(
                "finish_analysis: dropping request {} (accepting from {})",
                id, self.accept_from
            );
            return Ok(());
        }
        self.accept_from = id + 1;
        match outcome {
            Ok(result) => {
                self.result = ResultState::Current(result);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("finish_analysis: request {} failed: {}", id, e);
                self.result = ResultState::Empty;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// The classification of the last result against the current matrix.
    pub fn view(&self) -> Option<ClassifiedView> {
        match &self.result {
            ResultState::Current(r) | ResultState::Stale(r) => Some(classify(&self.model, r)),
            ResultState::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(strong: Vec<i64>) -> AnalysisResult {
        AnalysisResult {
            strong,
            ..AnalysisResult::default()
        }
    }

    fn service_error() -> BrcmaError {
        BrcmaError::Service {
            message: "HTTP 500".to_string(),
        }
    }

    #[test]
    fn failed_import_keeps_the_model() {
        let mut s = Session::new(MatrixModel::seed());
        let before = s.model();
        let outcome = Err(BrcmaError::ParsingMatrix {
            source: ParseError::InsufficientRows,
            path: "m.csv".to_string(),
        });
        assert!(s.apply_import(outcome).is_err());
        assert_eq!(*s.model(), *before);
        assert!(s.error().unwrap().contains("m.csv"));
    }

    #[test]
    fn import_clears_result_and_error() {
        let mut s = Session::new(MatrixModel::seed());
        let p = s.begin_analysis();
        s.finish_analysis(p.id, Ok(result(vec![0]))).unwrap();
        s.error = Some("old".to_string());
        s.apply_import(Ok(MatrixModel::new())).unwrap();
        assert_eq!(&s.result, &ResultState::Empty);
        assert_eq!(s.error(), None);
        assert_eq!(s.model().n(), 0);
    }

    #[test]
    fn pending_marks_stale() {
        let mut s = Session::new(MatrixModel::seed());
        let p = s.begin_analysis();
        assert!(!s.is_stale());
        s.finish_analysis(p.id, Ok(result(vec![0]))).unwrap();
        assert!(!s.is_stale());
        let p2 = s.begin_analysis();
        assert!(s.is_stale());
        // The stale result can still be displayed.
        assert_eq!(s.view().unwrap().strong.len(), 1);
        s.finish_analysis(p2.id, Ok(result(vec![0, 1]))).unwrap();
        assert!(!s.is_stale());
        assert_eq!(s.view().unwrap().strong.len(), 2);
    }

    #[test]
    fn failure_clears_the_result() {
        let mut s = Session::new(MatrixModel::seed());
        let p = s.begin_analysis();
        s.finish_analysis(p.id, Ok(result(vec![0]))).unwrap();
        let p2 = s.begin_analysis();
        assert!(s.finish_analysis(p2.id, Err(service_error())).is_err());
        assert_eq!(&s.result, &ResultState::Empty);
        assert_eq!(s.error(), Some("HTTP 500"));
        assert!(s.view().is_none());
    }

    #[test]
    fn older_results_are_dropped() {
        let mut s = Session::new(MatrixModel::seed());
        let first = s.begin_analysis();
        let second = s.begin_analysis();
        s.finish_analysis(second.id, Ok(result(vec![2]))).unwrap();
        s.finish_analysis(first.id, Ok(result(vec![0]))).unwrap();
        assert_eq!(s.view().unwrap().strong[0].index, 2);
    }

    #[test]
    fn results_for_a_replaced_matrix_are_dropped() {
        let mut s = Session::new(MatrixModel::seed());
        let p = s.begin_analysis();
        s.load(MatrixModel::new());
        s.finish_analysis(p.id, Ok(result(vec![0]))).unwrap();
        assert_eq!(&s.result, &ResultState::Empty);
    }

    #[test]
    fn edits_while_pending() {
        let mut s = Session::new(MatrixModel::seed());
        let p = s.begin_analysis();
        s.edit(|m| m.rename_requirement(0, "renamed"));
        assert_eq!(p.model.requirements()[0], "r1");
        s.finish_analysis(p.id, Ok(result(vec![0]))).unwrap();
        // Labels come from the current matrix.
        assert_eq!(s.view().unwrap().strong[0].label, "renamed");
    }
}
