use super::*;
use tokio_util::sync::CancellationToken;

fn compact_chunks(seed: u64) -> Vec<String> {
    let text = sample_compact();
    chunk_by_char(&text, &lcg_sizes(seed, text.chars().count()))
}

#[tokio::test]
async fn br_run_reports_partials_then_final() {
    let source = ScriptedSource::new(compact_chunks(5));
    let mut seen: Vec<Value> = Vec::new();
    let result = run(
        &source,
        "fn main() {}",
        &Options::default(),
        &CancellationToken::new(),
        |v| seen.push(v.clone()),
    )
    .await
    .unwrap();

    assert_eq!(result.overall_score, 88);
    assert!(seen.len() >= 2);
    for pair in seen.windows(2) {
        assert!(is_prefix_consistent(&pair[0], &pair[1]));
    }
    assert_eq!(seen.last(), Some(&sample_value()));

    let requests = source.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("fn main() {}"));
    assert_eq!(requests[0].system, Options::default().prompt.system);
}

#[tokio::test]
async fn br_final_value_is_reported_once_more() {
    let source = ScriptedSource::new([sample_compact()]);
    let mut count = 0;
    run(&source, "x", &Options::default(), &CancellationToken::new(), |_| count += 1)
        .await
        .unwrap();
    // one for the complete fragment, one for the final strict parse
    assert_eq!(count, 2);
}

#[tokio::test]
async fn br_empty_fragments_are_ignored() {
    let text = sample_compact();
    let (head, tail) = text.split_at(40);
    let source = ScriptedSource::new(["", head, "", "", tail, ""]);
    let mut count = 0;
    let result = run(&source, "x", &Options::default(), &CancellationToken::new(), |_| count += 1)
        .await
        .unwrap();
    assert_eq!(result.categories.len(), 6);
    assert_eq!(count, 3);
}

#[tokio::test]
async fn br_transport_failure_mid_stream() {
    let source = ScriptedSource::new(compact_chunks(9)).fail_after(2, "connection reset");
    let mut count = 0;
    let err = run(&source, "x", &Options::default(), &CancellationToken::new(), |_| count += 1)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EvalError::Transport(StreamError::interrupted("connection reset"))
    );
    assert!(count <= 2);
}

#[tokio::test]
async fn br_transport_failure_on_open() {
    let source = ScriptedSource::failing_open("401 unauthorized");
    let mut count = 0;
    let err = run(&source, "x", &Options::default(), &CancellationToken::new(), |_| count += 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::Transport(StreamError::Open(_))));
    assert_eq!(count, 0);
}

#[tokio::test]
async fn br_malformed_terminal_result() {
    let mut v = sample_value();
    v["categories"].as_array_mut().unwrap().truncate(5);
    let text = serde_json::to_string(&v).unwrap();
    let source = ScriptedSource::new(chunk_by_char(&text, &lcg_sizes(11, text.chars().count())));
    let mut count = 0;
    let err = run(&source, "x", &Options::default(), &CancellationToken::new(), |_| count += 1)
        .await
        .unwrap_err();
    match err {
        EvalError::Malformed(e) => assert_eq!(e.raw, text),
        other => panic!("expected malformed, got {:?}", other),
    }
    // partials still streamed in before the terminal rejection
    assert!(count > 0);
}

#[tokio::test]
async fn br_cancelled_run_stops_callbacks() {
    let source = ScriptedSource::new(compact_chunks(13));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut count = 0;
    let result = run(&source, "x", &Options::default(), &cancel, |_| count += 1).await;
    assert!(result.is_ok());
    assert_eq!(count, 0);
}

#[tokio::test]
async fn br_cancel_midway() {
    let source = ScriptedSource::new(compact_chunks(21));
    let cancel = CancellationToken::new();
    let mut count = 0;
    let result = run(&source, "x", &Options::default(), &cancel, |_| {
        count += 1;
        if count == 3 {
            cancel.cancel();
        }
    })
    .await;
    assert!(result.is_ok());
    assert_eq!(count, 3);
}
