use crate::source::EvaluationRequest;

pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// Names the default instructions ask for, in display order.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Code Clarity",
    "Efficiency",
    "Best Practices",
    "Error Handling",
    "Naming Conventions",
    "Code Structure",
];

const DEFAULT_SYSTEM: &str = "You are a patient programming instructor reviewing a student's code. \
Respond with a single JSON object and nothing else. The object has exactly these keys: \
\"overallScore\" (integer 0-100), \
\"summary\" (2-3 sentences), \
\"categories\" (array of exactly 6 objects, in this order: Code Clarity, Efficiency, Best Practices, \
Error Handling, Naming Conventions, Code Structure). \
Each category has \"name\", \"score\" (0-10), \"label\" (Excellent, Good, Fair or Needs Work) \
and \"tips\" (array of 3-4 objects with \"text\" and \"codeSnippet\"). \
Set \"codeSnippet\" to null when no snippet applies; never omit it.";

const DEFAULT_TASK: &str = "Evaluate the following code:\n\n{subject}";

/// Instructions sent with every evaluation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    pub system: String,
    /// Task text; every `{subject}` is replaced by the subject.
    pub task: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM.to_string(),
            task: DEFAULT_TASK.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Build a request, truncating the subject to at most `max_subject_len` bytes.
    pub fn render(&self, subject: &str, max_subject_len: usize) -> EvaluationRequest {
        let subject = truncate_at_char_boundary(subject, max_subject_len);
        EvaluationRequest {
            system: self.system.clone(),
            prompt: self.task.replace(SUBJECT_PLACEHOLDER, subject),
        }
    }
}

fn truncate_at_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
