//! Human-readable cascade reports.

use std::fmt::{self, Write};

use math_audio_fir_design::db_to_amplitude;

use crate::cascade::CascadeReport;
use crate::designer::{CandidateOutcome, FilterResult};

/// Formats coefficients as a flat list with full precision.
pub fn format_coefficients(coeffs: &[f64]) -> String {
    let items: Vec<String> = coeffs.iter().map(|c| format!("{:?}", c)).collect();
    format!("[{}]", items.join(", "))
}

fn write_stage<W: Write>(out: &mut W, result: &FilterResult, verbose: bool) -> fmt::Result {
    let stage = &result.stage;
    writeln!(
        out,
        "{}; sample rate = {} Hz, stop band range: {} - {} Hz, transition band: {:.6}",
        stage.label(),
        stage.sample_rate,
        stage.stopband_start_hz,
        stage.stopband_end_hz,
        stage.transition
    )?;
    writeln!(
        out,
        "  pass band: 0 - {} Hz ({})",
        stage.passband_edge_hz,
        stage.policy.name()
    )?;
    writeln!(out, "  order: {} ({} taps)", result.order, result.tap_count())?;
    writeln!(
        out,
        "  stop band attenuation: {:.2} dB (peak gain {:.3e})",
        result.achieved_stopband_attenuation_db,
        db_to_amplitude(result.achieved_stopband_attenuation_db)
    )?;
    writeln!(
        out,
        "  filter coefficients: {}",
        format_coefficients(&result.compressed_coefficients)
    )?;

    if verbose {
        writeln!(out, "  search:")?;
        for record in &result.search_trace {
            match &record.outcome {
                CandidateOutcome::Rejected { attenuation_db } => writeln!(
                    out,
                    "    order {:3}: {:8.2} dB  rejected",
                    record.order, attenuation_db
                )?,
                CandidateOutcome::Accepted { attenuation_db } => writeln!(
                    out,
                    "    order {:3}: {:8.2} dB  accepted",
                    record.order, attenuation_db
                )?,
            }
        }
    }
    Ok(())
}

/// Renders `report` as text, one block per stage and the total cost last.
///
/// With `verbose` each block also lists the evaluated candidates.
pub fn format_report(report: &CascadeReport, verbose: bool) -> String {
    if verbose {
        format!("{:#}", report)
    } else {
        report.to_string()
    }
}

/// Alternate form (`{:#}`) lists the evaluated candidates of every stage.
impl fmt::Display for CascadeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verbose = f.alternate();
        writeln!(
            f,
            "base sample rate: {} Hz, oversampling: {}x, target: {} dB",
            self.config.base_sample_rate,
            self.config.max_oversampling,
            self.config.target_stopband_attenuation_db
        )?;
        for result in &self.stages {
            writeln!(f)?;
            write_stage(f, result, verbose)?;
        }
        writeln!(f)?;
        writeln!(f, "total cost estimation: {}", self.total_cost_estimate)
    }
}
