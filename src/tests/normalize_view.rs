use super::*;
use crate::normalize::{PENDING_LABEL, first_category_name};
use serde_json::Number;

fn renormalize(view: &NormalizedEvaluationView) -> NormalizedEvaluationView {
    let v = serde_json::to_value(view).unwrap();
    normalize(Some(&v))
}

#[test]
fn nv_absent_and_non_object_inputs() {
    assert_eq!(normalize(None), NormalizedEvaluationView::default());
    assert_eq!(normalize(Some(&Value::Null)), NormalizedEvaluationView::default());
    assert_eq!(normalize(Some(&json!([1, 2]))), NormalizedEvaluationView::default());
    assert!(normalize(Some(&json!("text"))).is_empty());
}

#[test]
fn nv_category_fallback_naming() {
    let view = normalize(Some(&json!({ "categories": [{}, { "name": "X" }] })));
    let names: Vec<&str> = view.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Category 1", "X"]);
    for c in &view.categories {
        assert_eq!(c.score, Number::from(0));
        assert_eq!(c.label, PENDING_LABEL);
        assert!(c.tips.is_empty());
    }
}

#[test]
fn nv_score_zero_is_distinct_from_absent() {
    assert_eq!(normalize(Some(&json!({}))).overall_score, None);
    assert_eq!(
        normalize(Some(&json!({ "overallScore": 0 }))).overall_score,
        Some(Number::from(0))
    );
    assert_eq!(
        normalize(Some(&json!({ "overallScore": "88" }))).overall_score,
        None
    );
}

#[test]
fn nv_blank_and_mistyped_fields_fall_back() {
    let view = normalize(Some(&json!({
        "summary": "   ",
        "categories": [
            { "name": "  ", "score": "9", "label": 3, "tips": "none" },
            "not an object",
            { "name": "Efficiency", "score": 7.5, "label": "Good", "tips": [
                { "text": "" },
                { "text": "Keep", "codeSnippet": 5 },
                { "text": "Snip", "codeSnippet": "x += 1;" },
                "bare",
                { "codeSnippet": "orphan" }
            ]}
        ]
    })));
    assert_eq!(view.summary, None);
    assert_eq!(view.categories.len(), 3);
    assert_eq!(view.categories[0].name, "Category 1");
    assert_eq!(view.categories[0].score, Number::from(0));
    assert_eq!(view.categories[0].label, "Pending");
    assert_eq!(view.categories[1].name, "Category 2");
    let eff = view.category("Efficiency").unwrap();
    assert_eq!(eff.score.as_f64(), Some(7.5));
    assert_eq!(
        eff.tips,
        vec![
            NormalizedTip { text: "Keep".into(), code_snippet: None },
            NormalizedTip { text: "Snip".into(), code_snippet: Some("x += 1;".into()) },
        ]
    );
}

#[test]
fn nv_idempotent_on_samples() {
    let samples = [
        json!(null),
        json!({}),
        json!({ "categories": [{}, { "name": "X" }] }),
        json!({ "overallScore": 12.5, "summary": "ok", "categories": "nope" }),
        json!({ "categories": [{ "tips": [{ "text": "t", "codeSnippet": null }, { "text": " " }] }] }),
        sample_value(),
    ];
    for v in &samples {
        let once = normalize(Some(v));
        assert_eq!(renormalize(&once), once, "not idempotent for {}", v);
    }
}

#[test]
fn nv_idempotent_on_every_streamed_partial() {
    let text = sample_pretty();
    let chunks = chunk_by_char(&text, &lcg_sizes(7, text.chars().count()));
    let mut b = ResultBuilder::new(Options::default());
    for c in &chunks {
        if let Some(v) = b.push(c).into_value() {
            let once = normalize(Some(&v));
            assert_eq!(renormalize(&once), once);
        }
    }
}

#[test]
fn nv_view_serializes_to_wire_shape() {
    let view = normalize(Some(&json!({
        "categories": [{ "name": "A", "score": 1, "label": "L", "tips": [{ "text": "t", "codeSnippet": null }] }]
    })));
    let v = serde_json::to_value(&view).unwrap();
    assert_eq!(
        v,
        json!({
            "categories": [{ "name": "A", "score": 1, "label": "L", "tips": [{ "text": "t", "codeSnippet": null }] }]
        })
    );
}

#[test]
fn nv_from_terminal_result() {
    let result = parse_result(&sample_compact(), &Options::default()).unwrap();
    let view = NormalizedEvaluationView::from(&result);
    assert_eq!(view.overall_score, Some(Number::from(88)));
    assert_eq!(view.categories.len(), 6);
    assert_eq!(view.categories[3].name, "Error Handling");
    assert_eq!(view.categories[3].tips.len(), 3);
}

#[test]
fn nv_first_category_name() {
    assert_eq!(first_category_name(&json!({})), None);
    assert_eq!(first_category_name(&json!({ "categories": [] })), None);
    assert_eq!(first_category_name(&json!({ "categories": [{}] })), None);
    assert_eq!(first_category_name(&json!({ "categories": [{ "name": " " }] })), None);
    assert_eq!(
        first_category_name(&json!({ "categories": [{ "name": "Code Clarity" }, { "name": "B" }] })),
        Some("Code Clarity")
    );
}
