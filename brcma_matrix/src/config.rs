// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The thresholds sent along with the matrix to the analysis service.
///
/// The values are not constrained, even if they conventionally live in `[0, 1]`.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Thresholds {
    pub strong_req: f64,
    pub weak_req: f64,
    pub missing_req: f64,
}

impl Thresholds {
    pub const DEFAULT: Thresholds = Thresholds {
        strong_req: 0.75,
        weak_req: 0.30,
        missing_req: 0.30,
    };

    pub fn get(&self, name: ThresholdName) -> f64 {
        match name {
            ThresholdName::StrongReq => self.strong_req,
            ThresholdName::WeakReq => self.weak_req,
            ThresholdName::MissingReq => self.missing_req,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds::DEFAULT
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ThresholdName {
    StrongReq,
    WeakReq,
    MissingReq,
}

/// Which of the two weight vectors an edit targets.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum WeightKind {
    /// WRC, one weight per requirement (row).
    Requirement,
    /// WEC, one weight per criterion (column).
    Criterion,
}

/// The requirement x criterion matrix.
///
/// Identity is positional: labels are for display only and are not guaranteed
/// to be unique. The fields are private so that the shape invariants hold for
/// every instance:
/// - `requirement_weights.len() == requirements.len()`
/// - `criterion_weights.len() == criteria.len()`
/// - `similarity` has one row per requirement, each with one value per criterion
/// - every similarity value is in `[0, 1]`
#[derive(PartialEq, Debug, Clone)]
pub struct MatrixModel {
    pub(crate) requirements: Vec<String>,
    pub(crate) criteria: Vec<String>,
    pub(crate) requirement_weights: Vec<f64>,
    pub(crate) criterion_weights: Vec<f64>,
    pub(crate) similarity: Vec<Vec<f64>>,
    pub(crate) thresholds: Thresholds,
}

impl MatrixModel {
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn requirement_weights(&self) -> &[f64] {
        &self.requirement_weights
    }

    pub fn criterion_weights(&self) -> &[f64] {
        &self.criterion_weights
    }

    pub fn similarity(&self) -> &[Vec<f64>] {
        &self.similarity
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Number of requirements (rows).
    pub fn n(&self) -> usize {
        self.requirements.len()
    }

    /// Number of criteria (columns).
    pub fn m(&self) -> usize {
        self.criteria.len()
    }
}

/// The shape invariants of a [MatrixModel] that raw parts can violate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ShapeError {
    RequirementWeights { expected: usize, found: usize },
    CriterionWeights { expected: usize, found: usize },
    RowCount { expected: usize, found: usize },
    RowLength { row: usize, expected: usize, found: usize },
}

impl Error for ShapeError {}

impl Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::RequirementWeights { expected, found } => write!(
                f,
                "expected {} requirement weights, found {}",
                expected, found
            ),
            ShapeError::CriterionWeights { expected, found } => write!(
                f,
                "expected {} criterion weights, found {}",
                expected, found
            ),
            ShapeError::RowCount { expected, found } => write!(
                f,
                "expected {} similarity rows, found {}",
                expected, found
            ),
            ShapeError::RowLength {
                row,
                expected,
                found,
            } => write!(
                f,
                "similarity row {} has {} values, expected {}",
                row, found, expected
            ),
        }
    }
}

// ******** Analysis results *********

/// A bundle of requirements and criteria suggested by the analysis service.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DesignOption {
    pub name: String,
    pub description: String,
    pub requirements: Vec<i64>,
    pub criteria: Vec<i64>,
}

/// The scores returned by the analysis service.
///
/// Nothing in this structure is checked against the matrix: the sequences may be
/// shorter or longer than the matrix, and the index lists may contain duplicates,
/// negative values or values out of range. The classification takes care of that.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AnalysisResult {
    pub rs: Vec<f64>,
    pub rs_norm: Vec<f64>,
    pub cc: Vec<f64>,
    pub cc_norm: Vec<f64>,
    pub strong: Vec<i64>,
    pub weak: Vec<i64>,
    pub revisit: Vec<i64>,
    pub missing: Vec<i64>,
    pub design_options: Vec<DesignOption>,
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RequirementStatus {
    Strong,
    Weak,
    /// The residual status: neither strong nor weak.
    Revisit,
}

impl RequirementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementStatus::Strong => "strong",
            RequirementStatus::Weak => "weak",
            RequirementStatus::Revisit => "revisit",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CriterionStatus {
    Covered,
    Missing,
}

impl CriterionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriterionStatus::Covered => "covered",
            CriterionStatus::Missing => "missing",
        }
    }
}

/// An index, resolved to a display label.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IndexedLabel {
    pub index: usize,
    pub label: String,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RequirementRow {
    pub index: usize,
    pub label: String,
    pub status: RequirementStatus,
    /// `RS_norm[i]`, or 0 if the service did not return it.
    pub strength: f64,
    /// `RS[i]`, or 0 if the service did not return it.
    pub raw_strength: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CriterionRow {
    pub index: usize,
    pub label: String,
    pub status: CriterionStatus,
    pub coverage: f64,
    pub raw_coverage: f64,
}

/// The item with the highest normalized score.
#[derive(PartialEq, Debug, Clone)]
pub struct TopItem {
    pub index: usize,
    pub label: String,
    pub score: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Summary {
    pub total_requirements: usize,
    pub total_criteria: usize,
    pub strong_count: usize,
    pub weak_count: usize,
    pub revisit_count: usize,
    pub missing_count: usize,
    pub covered_count: usize,
    pub strong_percent: u32,
    pub weak_percent: u32,
    pub revisit_percent: u32,
    pub missing_percent: u32,
    pub avg_strength_norm: f64,
    pub avg_coverage_norm: f64,
    pub top_requirement: Option<TopItem>,
    pub top_criterion: Option<TopItem>,
    pub design_option_count: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RecommendationKind {
    MissingCriteria,
    RevisitRequirements,
    KeepStrong,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: &'static str,
    pub items: Vec<IndexedLabel>,
    pub advice: &'static str,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ResolvedDesignOption {
    pub name: String,
    pub description: String,
    pub requirements: Vec<IndexedLabel>,
    pub criteria: Vec<IndexedLabel>,
}

/// Everything a presentation layer needs to render an analysis.
#[derive(PartialEq, Debug, Clone)]
pub struct ClassifiedView {
    pub requirements: Vec<RequirementRow>,
    pub criteria: Vec<CriterionRow>,
    pub strong: Vec<IndexedLabel>,
    pub weak: Vec<IndexedLabel>,
    pub revisit: Vec<IndexedLabel>,
    pub missing: Vec<IndexedLabel>,
    pub summary: Summary,
    pub alerts: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub design_options: Vec<ResolvedDesignOption>,
}
