// Rendering of the classified analysis: JSON summary and text report.

use serde_json::{json, Value as JSValue};

use crate::brcma::*;

// Scores are written with 4 decimals so that a summary read back from disk
// prints identically.
fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}

fn labels_js(items: &[IndexedLabel]) -> JSValue {
    JSValue::Array(
        items
            .iter()
            .map(|il| json!({"index": il.index, "label": il.label}))
            .collect(),
    )
}

fn top_js(top: &Option<TopItem>) -> JSValue {
    match top {
        Some(t) => json!({"index": t.index, "label": t.label, "score": round4(t.score)}),
        None => JSValue::Null,
    }
}

fn kind_name(kind: RecommendationKind) -> &'static str {
    match kind {
        RecommendationKind::MissingCriteria => "missingCriteria",
        RecommendationKind::RevisitRequirements => "revisitRequirements",
        RecommendationKind::KeepStrong => "keepStrong",
    }
}

fn matrix_js(model: &MatrixModel) -> JSValue {
    let t = model.thresholds();
    json!({
        "requirements": model.requirements(),
        "criteria": model.criteria(),
        "requirementWeights": model.requirement_weights(),
        "criterionWeights": model.criterion_weights(),
        "similarity": model.similarity(),
        "thresholds": {
            "strongReq": t.strong_req,
            "weakReq": t.weak_req,
            "missingReq": t.missing_req,
        }
    })
}

pub fn build_summary_js(model: &MatrixModel, view: &ClassifiedView) -> JSValue {
    let s = &view.summary;
    let requirements: Vec<JSValue> = view
        .requirements
        .iter()
        .map(|r| {
            json!({
                "index": r.index,
                "label": r.label,
                "status": r.status.as_str(),
                "strength": round4(r.strength),
                "rawStrength": round4(r.raw_strength),
            })
        })
        .collect();
    let criteria: Vec<JSValue> = view
        .criteria
        .iter()
        .map(|c| {
            json!({
                "index": c.index,
                "label": c.label,
                "status": c.status.as_str(),
                "coverage": round4(c.coverage),
                "rawCoverage": round4(c.raw_coverage),
            })
        })
        .collect();
    let recommendations: Vec<JSValue> = view
        .recommendations
        .iter()
        .map(|r| {
            json!({
                "kind": kind_name(r.kind),
                "title": r.title,
                "items": labels_js(&r.items),
                "advice": r.advice,
            })
        })
        .collect();
    let design_options: Vec<JSValue> = view
        .design_options
        .iter()
        .map(|d| {
            json!({
                "name": d.name,
                "description": d.description,
                "requirements": labels_js(&d.requirements),
                "criteria": labels_js(&d.criteria),
            })
        })
        .collect();

    json!({
        "matrix": matrix_js(model),
        "summary": {
            "totalRequirements": s.total_requirements,
            "totalCriteria": s.total_criteria,
            "strong": {"count": s.strong_count, "percent": s.strong_percent},
            "weak": {"count": s.weak_count, "percent": s.weak_percent},
            "revisit": {"count": s.revisit_count, "percent": s.revisit_percent},
            "missing": {"count": s.missing_count, "percent": s.missing_percent},
            "covered": {"count": s.covered_count},
            "avgStrengthNorm": round4(s.avg_strength_norm),
            "avgCoverageNorm": round4(s.avg_coverage_norm),
            "topRequirement": top_js(&s.top_requirement),
            "topCriterion": top_js(&s.top_criterion),
            "designOptionCount": s.design_option_count,
        },
        "requirements": requirements,
        "criteria": criteria,
        "classification": {
            "strong": labels_js(&view.strong),
            "weak": labels_js(&view.weak),
            "revisit": labels_js(&view.revisit),
            "missing": labels_js(&view.missing),
        },
        "alerts": view.alerts,
        "recommendations": recommendations,
        "designOptions": design_options,
    })
}

fn label_list(items: &[IndexedLabel]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items
            .iter()
            .map(|il| il.label.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

/// The matrix as a table, weights in the last column and the last row.
pub fn render_matrix_text(model: &MatrixModel) -> String {
    let t = model.thresholds();
    let mut lines: Vec<String> = vec![format!(
        "Matrix: {} requirements x {} criteria (thr_sr={} thr_wr={} thr_mr={})",
        model.n(),
        model.m(),
        t.strong_req,
        t.weak_req,
        t.missing_req
    )];
    let header: Vec<String> = std::iter::once(String::new())
        .chain(model.criteria().iter().cloned())
        .chain(std::iter::once("WRC".to_string()))
        .collect();
    lines.push(header.join("\t"));
    for (i, label) in model.requirements().iter().enumerate() {
        let row: Vec<String> = std::iter::once(label.clone())
            .chain(model.similarity()[i].iter().map(|v| v.to_string()))
            .chain(std::iter::once(model.requirement_weights()[i].to_string()))
            .collect();
        lines.push(row.join("\t"));
    }
    let weights: Vec<String> = std::iter::once("WEC".to_string())
        .chain(model.criterion_weights().iter().map(|w| w.to_string()))
        .collect();
    lines.push(weights.join("\t"));
    lines.join("\n")
}

/// The text report. A stale view comes from an analysis older than the last
/// request and is flagged as such.
pub fn render_text(model: &MatrixModel, view: &ClassifiedView, stale: bool) -> String {
    let s = &view.summary;
    let mut lines: Vec<String> = Vec::new();
    if stale {
        lines.push(
            "(stale) a newer analysis is pending, these results may be outdated".to_string(),
        );
    }
    lines.extend(vec![
        format!(
            "{} requirements, {} criteria",
            s.total_requirements, s.total_criteria
        ),
        format!(
            "Strong: {} ({}%)  Weak: {} ({}%)  Revisit: {} ({}%)",
            s.strong_count,
            s.strong_percent,
            s.weak_count,
            s.weak_percent,
            s.revisit_count,
            s.revisit_percent
        ),
        format!(
            "Covered criteria: {}  Missing: {} ({}%)",
            s.covered_count, s.missing_count, s.missing_percent
        ),
        format!(
            "Average strength: {:.2}  Average coverage: {:.2}",
            s.avg_strength_norm, s.avg_coverage_norm
        ),
    ]);
    if let Some(t) = &s.top_requirement {
        lines.push(format!("Top requirement: {} ({:.2})", t.label, t.score));
    }
    if let Some(t) = &s.top_criterion {
        lines.push(format!("Top criterion: {} ({:.2})", t.label, t.score));
    }

    for alert in view.alerts.iter() {
        lines.push(format!("! {}", alert));
    }

    lines.push(String::new());
    lines.push("Requirements:".to_string());
    for r in view.requirements.iter() {
        lines.push(format!(
            "  {:<8} {:<20} {:.2}",
            r.status.as_str(),
            r.label,
            r.strength
        ));
    }
    lines.push("Criteria:".to_string());
    for c in view.criteria.iter() {
        lines.push(format!(
            "  {:<8} {:<20} {:.2}",
            c.status.as_str(),
            c.label,
            c.coverage
        ));
    }

    for r in view.recommendations.iter() {
        lines.push(String::new());
        lines.push(format!("{}: {}", r.title, label_list(&r.items)));
        lines.push(format!("  {}", r.advice));
    }

    if !view.design_options.is_empty() {
        lines.push(String::new());
        lines.push(format!("Design options ({}):", view.design_options.len()));
        for d in view.design_options.iter() {
            lines.push(format!("  {}: {}", d.name, d.description));
            lines.push(format!("    requirements: {}", label_list(&d.requirements)));
            lines.push(format!("    criteria: {}", label_list(&d.criteria)));
        }
    }
    debug!("render_text: {} lines for {} requirements", lines.len(), model.n());
    lines.join("\n")
}
