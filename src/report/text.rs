use crate::core::orchestrator::BatchSummary;
use anyhow::Result;
use std::fmt::Write;
use std::path::Path;

/// Plain-text end-of-run summary printed by `seqtyper run`
pub fn generate_text_summary(summary: &BatchSummary, outdir: &Path) -> Result<String> {
    let mut output = String::new();

    writeln!(&mut output, "Done!")?;
    writeln!(&mut output, "Your results are in: {}", outdir.display())?;
    writeln!(&mut output)?;

    writeln!(&mut output, "- Processed: {:6} records", summary.processed)?;
    writeln!(&mut output, "- Typed:     {:6} records", summary.typed)?;
    writeln!(&mut output, "- Failed:    {:6} records", summary.failed)?;
    if summary.skipped > 0 {
        writeln!(&mut output, "- Skipped:   {:6} files (more than one record)", summary.skipped)?;
    }
    writeln!(&mut output, "Report: {}", summary.report_path.display())?;

    Ok(output)
}
