use super::*;
use serde_json::{Value, json};

// Shared test helpers
fn lcg_sizes(seed: u64, len: usize) -> Vec<usize> {
    let mut x = seed;
    let mut out = Vec::new();
    let mut total = 0usize;
    while total < len {
        // LCG: constants from Numerical Recipes
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        // chunk size in [1..16]
        let mut n = (((x >> 24) as usize) % 16) + 1;
        if total + n > len {
            n = len - total;
        }
        out.push(n);
        total += n;
    }
    out
}

fn chunk_by_char(s: &str, sizes: &[usize]) -> Vec<String> {
    let mut res = Vec::new();
    let mut iter = s.chars();
    for &n in sizes {
        let mut chunk = String::new();
        for _ in 0..n {
            if let Some(c) = iter.next() {
                chunk.push(c);
            } else {
                break;
            }
        }
        if !chunk.is_empty() {
            res.push(chunk);
        }
    }
    // Append remainder if any
    let rest: String = iter.collect();
    if !rest.is_empty() {
        res.push(rest);
    }
    res
}

/// Char-boundary prefixes of `s`, from empty to the whole string.
fn char_prefixes(s: &str) -> impl Iterator<Item = &str> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .map(move |i| &s[..i])
}

/// Every field present in `partial` is present in `full` with the same value;
/// arrays may be shorter and their elements may themselves be partial.
fn is_prefix_consistent(partial: &Value, full: &Value) -> bool {
    match (partial, full) {
        (Value::Object(p), Value::Object(f)) => p
            .iter()
            .all(|(k, v)| f.get(k).is_some_and(|fv| is_prefix_consistent(v, fv))),
        (Value::Array(p), Value::Array(f)) => {
            p.len() <= f.len() && p.iter().zip(f).all(|(a, b)| is_prefix_consistent(a, b))
        }
        _ => partial == full,
    }
}

fn category(name: &str, score: f64, label: &str, tips: Value) -> Value {
    json!({ "name": name, "score": score, "label": label, "tips": tips })
}

fn sample_value() -> Value {
    json!({
        "overallScore": 88,
        "summary": "Good job. The code is readable and mostly idiomatic, with a few rough edges in error handling.",
        "categories": [
            category("Code Clarity", 9.0, "Excellent", json!([
                { "text": "Split the long loop body into a helper.", "codeSnippet": "fn step(state: &mut State) {\n    // ...\n}" },
                { "text": "Name the magic number 42.", "codeSnippet": "const ANSWER: u32 = 42;" },
                { "text": "Keep comments next to the code they describe.", "codeSnippet": null }
            ])),
            category("Efficiency", 7.5, "Good", json!([
                { "text": "Avoid cloning the vector on every call.", "codeSnippet": "fn total(xs: &[u32]) -> u32 { xs.iter().sum() }" },
                { "text": "Use a HashSet for membership checks.", "codeSnippet": null },
                { "text": "Break early once the value is found.", "codeSnippet": null },
                { "text": "Preallocate with with_capacity.", "codeSnippet": "let mut v = Vec::with_capacity(n);" }
            ])),
            category("Best Practices", 8.0, "Good", json!([
                { "text": "Prefer iterators over index loops.", "codeSnippet": null },
                { "text": "Derive Debug on public types.", "codeSnippet": "#[derive(Debug)]" },
                { "text": "Escape paths like \"C:\\\\temp\\\\out\" carefully.", "codeSnippet": "let p = \"C:\\\\temp\";" }
            ])),
            category("Error Handling", 5.0, "Fair", json!([
                { "text": "Return a Result instead of panicking.", "codeSnippet": "fn parse(s: &str) -> Result<u32, ParseIntError> { s.parse() }" },
                { "text": "Add context to errors.", "codeSnippet": null },
                { "text": "Don't ignore the return value of write.", "codeSnippet": "writer.write_all(buf)?;" }
            ])),
            category("Naming Conventions", 8.5, "Good", json!([
                { "text": "Use snake_case for functions.", "codeSnippet": "fn compute_total() {}" },
                { "text": "Avoid one-letter names outside short closures.", "codeSnippet": null },
                { "text": "Résumé-style abbreviations hurt readability.", "codeSnippet": null }
            ])),
            category("Code Structure", 6.0, "Fair", json!([
                { "text": "Move parsing into its own module.", "codeSnippet": "mod parser;" },
                { "text": "Group related constants.", "codeSnippet": null },
                { "text": "Keep main short.", "codeSnippet": "fn main() { app::run() }" },
                { "text": "Tab\tseparated output needs a header.", "codeSnippet": null }
            ]))
        ]
    })
}

fn sample_compact() -> String {
    serde_json::to_string(&sample_value()).unwrap()
}

fn sample_pretty() -> String {
    serde_json::to_string_pretty(&sample_value()).unwrap()
}

fn fenced(body: &str) -> String {
    format!("```json\n{}\n```\n", body)
}

mod builder_run;
mod normalize_view;
