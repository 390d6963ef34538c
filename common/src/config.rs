#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Reports every processed file and every skipped element.
    pub verbose: bool,
    /// Worker threads used to decode documents.
    ///
    /// `0` lets the thread pool pick, `1` decodes documents one after another.
    pub jobs: usize,
}
