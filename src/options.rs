use crate::prompt::PromptTemplate;

#[derive(Clone, Debug)]
pub struct Options {
    /// Skip a Markdown fenced code block like ```json ... ``` around the object.
    pub fenced_code_blocks: bool,
    /// Collect repair log entries for every fragment. Retrieve them with
    /// `ResultBuilder::take_repair_log`.
    pub logging: bool,
    /// Context window size used when building log context snippets.
    /// Controls how many bytes are captured on both sides of the position.
    pub log_context_window: usize,
    /// Instructions and task template sent to the stream source.
    pub prompt: PromptTemplate,
    /// Subjects longer than this many bytes are truncated before interpolation.
    pub max_subject_len: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fenced_code_blocks: true,
            logging: false,
            log_context_window: 10,
            prompt: PromptTemplate::default(),
            max_subject_len: 20_000,
        }
    }
}
