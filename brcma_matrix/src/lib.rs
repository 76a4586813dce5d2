mod config;
use log::{debug, info, warn};

use std::collections::HashSet;

pub use crate::config::*;

pub mod builder;
pub mod manual;
pub mod tabular;

pub use crate::tabular::{export_text, parse_rows, parse_text, ParseError, TabularFormat};

const MISSING_CRITERIA_ADVICE: &str = "These criteria lack sufficient requirement coverage. Consider adding new requirements or strengthening existing ones to address these areas.";
const REVISIT_ADVICE: &str =
    "These requirements have low strength scores. Review their criteria mappings and weights.";
const KEEP_STRONG_ADVICE: &str =
    "These requirements are well-supported by the criteria and should be maintained.";

/// Interprets the scores returned by the analysis service for a given matrix.
///
/// This is a pure function: the index lists of the result are deduplicated and
/// stripped of negative values, then every requirement and every criterion gets
/// exactly one status:
/// * requirements: `strong` if listed as strong, else `weak` if listed as weak,
///   else `revisit`. The revisit list itself does not drive the status.
/// * criteria: `missing` if listed as missing, else `covered`.
///
/// Indices beyond the matrix are kept and get a synthetic label (`R3`, `C7`).
pub fn classify(model: &MatrixModel, result: &AnalysisResult) -> ClassifiedView {
    let n = model.n();
    let m = model.m();
    info!(
        "classify: {} requirements, {} criteria, {} design options",
        n,
        m,
        result.design_options.len()
    );
    if result.rs_norm.len() != n || result.cc_norm.len() != m {
        warn!(
            "classify: result shape does not match the matrix: RS_norm {} (n={}), CC_norm {} (m={})",
            result.rs_norm.len(),
            n,
            result.cc_norm.len(),
            m
        );
    }

    let strong = unique_indices(&result.strong);
    let weak = unique_indices(&result.weak);
    let revisit = unique_indices(&result.revisit);
    let missing = unique_indices(&result.missing);
    debug!(
        "classify: SR {:?} WR {:?} RR {:?} MR {:?}",
        strong, weak, revisit, missing
    );

    let requirements: Vec<RequirementRow> = model
        .requirements
        .iter()
        .enumerate()
        .map(|(i, label)| RequirementRow {
            index: i,
            label: label.clone(),
            status: requirement_status(i, &strong, &weak),
            strength: value_at(&result.rs_norm, i),
            raw_strength: value_at(&result.rs, i),
        })
        .collect();

    let criteria: Vec<CriterionRow> = model
        .criteria
        .iter()
        .enumerate()
        .map(|(j, label)| CriterionRow {
            index: j,
            label: label.clone(),
            status: criterion_status(j, &missing),
            coverage: value_at(&result.cc_norm, j),
            raw_coverage: value_at(&result.cc, j),
        })
        .collect();

    let summary = Summary {
        total_requirements: n,
        total_criteria: m,
        strong_count: strong.len(),
        weak_count: weak.len(),
        revisit_count: revisit.len(),
        missing_count: missing.len(),
        covered_count: m.saturating_sub(missing.len()),
        strong_percent: percent(strong.len(), n),
        weak_percent: percent(weak.len(), n),
        revisit_percent: percent(revisit.len(), n),
        missing_percent: percent(missing.len(), m),
        avg_strength_norm: average(&result.rs_norm),
        avg_coverage_norm: average(&result.cc_norm),
        top_requirement: top_item(
            requirements
                .iter()
                .map(|r| (r.index, r.label.as_str(), r.strength)),
        ),
        top_criterion: top_item(
            criteria
                .iter()
                .map(|c| (c.index, c.label.as_str(), c.coverage)),
        ),
        design_option_count: result.design_options.len(),
    };

    let strong = requirement_labels(model, &strong);
    let weak = requirement_labels(model, &weak);
    let revisit = requirement_labels(model, &revisit);
    let missing = criterion_labels(model, &missing);

    let mut alerts: Vec<String> = Vec::new();
    if !missing.is_empty() {
        alerts.push(format!(
            "{} missing criteria need requirements to address them",
            missing.len()
        ));
    }
    if !revisit.is_empty() {
        alerts.push(format!(
            "{} requirements need to be revisited (low strength)",
            revisit.len()
        ));
    }

    let mut recommendations: Vec<Recommendation> = Vec::new();
    if !missing.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::MissingCriteria,
            title: "Missing Criteria",
            items: missing.clone(),
            advice: MISSING_CRITERIA_ADVICE,
        });
    }
    if !revisit.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::RevisitRequirements,
            title: "Requirements to Revisit",
            items: revisit.clone(),
            advice: REVISIT_ADVICE,
        });
    }
    if !strong.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::KeepStrong,
            title: "Strong Requirements (Keep)",
            items: strong.clone(),
            advice: KEEP_STRONG_ADVICE,
        });
    }

    let design_options: Vec<ResolvedDesignOption> = result
        .design_options
        .iter()
        .map(|opt| ResolvedDesignOption {
            name: opt.name.clone(),
            description: opt.description.clone(),
            requirements: requirement_labels(model, &unique_indices(&opt.requirements)),
            criteria: criterion_labels(model, &unique_indices(&opt.criteria)),
        })
        .collect();

    ClassifiedView {
        requirements,
        criteria,
        strong,
        weak,
        revisit,
        missing,
        summary,
        alerts,
        recommendations,
        design_options,
    }
}

/// Removes the duplicates (keeping the first occurrence) and the negative values.
///
/// Values that are too large for the matrix are kept.
pub fn unique_indices(indices: &[i64]) -> Vec<usize> {
    let mut seen: HashSet<i64> = HashSet::new();
    indices
        .iter()
        .filter(|idx| seen.insert(**idx))
        .filter_map(|idx| usize::try_from(*idx).ok())
        .collect()
}

/// The label of a requirement, or `R{i+1}` when the index is outside the matrix.
pub fn requirement_label(model: &MatrixModel, i: usize) -> String {
    model
        .requirements
        .get(i)
        .cloned()
        .unwrap_or_else(|| format!("R{}", i + 1))
}

/// The label of a criterion, or `C{j+1}` when the index is outside the matrix.
pub fn criterion_label(model: &MatrixModel, j: usize) -> String {
    model
        .criteria
        .get(j)
        .cloned()
        .unwrap_or_else(|| format!("C{}", j + 1))
}

/// `count / total` as a whole percentage. A total of 0 gives 0.
pub fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((count as f64 / total as f64) * 100.0).round() as u32
    }
}

/// The mean of the values, or 0 for an empty slice.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn requirement_status(i: usize, strong: &[usize], weak: &[usize]) -> RequirementStatus {
    if strong.contains(&i) {
        RequirementStatus::Strong
    } else if weak.contains(&i) {
        RequirementStatus::Weak
    } else {
        RequirementStatus::Revisit
    }
}

fn criterion_status(j: usize, missing: &[usize]) -> CriterionStatus {
    if missing.contains(&j) {
        CriterionStatus::Missing
    } else {
        CriterionStatus::Covered
    }
}

fn value_at(values: &[f64], idx: usize) -> f64 {
    values.get(idx).cloned().unwrap_or(0.0)
}

// Linear scan with a strict comparison: the first of several equal maxima wins.
fn top_item<'a>(items: impl Iterator<Item = (usize, &'a str, f64)>) -> Option<TopItem> {
    let mut best: Option<TopItem> = None;
    for (index, label, score) in items {
        let better = match &best {
            None => true,
            Some(b) => score > b.score,
        };
        if better {
            best = Some(TopItem {
                index,
                label: label.to_string(),
                score,
            });
        }
    }
    best
}

fn requirement_labels(model: &MatrixModel, indices: &[usize]) -> Vec<IndexedLabel> {
    indices
        .iter()
        .map(|i| IndexedLabel {
            index: *i,
            label: requirement_label(model, *i),
        })
        .collect()
}

fn criterion_labels(model: &MatrixModel, indices: &[usize]) -> Vec<IndexedLabel> {
    indices
        .iter()
        .map(|j| IndexedLabel {
            index: *j,
            label: criterion_label(model, *j),
        })
        .collect()
}
