use wordlens_core::types::AnalysisResult;

/// Shown when the model found nothing.
pub const NO_RESULTS: &str = "No results";

/// Receives each successful result list.
pub trait DisplaySink: Send + Sync {
    fn show(&self, results: &[AnalysisResult]);
}

/// Render results as numbered text cards.
pub fn render_results(results: &[AnalysisResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {}\n   {}\n   \"{}\"",
                i + 1,
                r.word(),
                r.definition(),
                r.sample_sentence()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prints rendered cards to stdout.
pub struct StdoutSink;

impl DisplaySink for StdoutSink {
    fn show(&self, results: &[AnalysisResult]) {
        println!("{}", render_results(results));
    }
}
