//! Markdown changelog across a sequence of bill versions.

use std::fmt::Write;

use porkchop_core::Comparison;
use tracing::warn;

/// Entries listed per category in each step.
pub const TOP_ENTRIES: usize = 5;

/// One transition between consecutive versions.
#[derive(Debug, Clone, Copy)]
pub struct VersionStep<'a> {
    pub from: &'a str,
    pub to: &'a str,
    /// `None` when the comparison could not be produced for this pair.
    pub comparison: Option<&'a Comparison>,
}

/// Render a changelog for `title` covering `steps` in order.
///
/// ```text
/// # Changelog: Further Continuing Appropriations Act, 2025
///
/// ## Introduced -> Engrossed
/// - Lines added: 12
/// - Lines removed: 3
/// ...
/// ```
pub fn render_changelog(title: &str, steps: &[VersionStep<'_>]) -> String {
    let mut out = String::new();
    write_changelog(&mut out, title, steps).unwrap_or_else(|e| {
        warn!(error = %e, "changelog rendering stopped early");
    });
    out
}

/// Write the changelog into any [`Write`] sink.
pub fn write_changelog(
    out: &mut impl Write,
    title: &str,
    steps: &[VersionStep<'_>],
) -> std::fmt::Result {
    writeln!(out, "# Changelog: {title}\n")?;
    if steps.is_empty() {
        return writeln!(out, "Only one version available; no changes to report.");
    }

    for step in steps {
        writeln!(out, "## {} -> {}\n", step.from, step.to)?;
        match step.comparison {
            Some(comparison) => render_step(out, comparison)?,
            None => writeln!(out, "No comparison data available.")?,
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_step(out: &mut impl Write, c: &Comparison) -> std::fmt::Result {
    writeln!(out, "- Lines added: {}", c.additions_count)?;
    writeln!(out, "- Lines removed: {}", c.removals_count)?;
    writeln!(out, "- Similarity: {:.1}%", c.similarity_ratio * 100.0)?;
    if c.funding_total_a != c.funding_total_b {
        writeln!(
            out,
            "- Funding: {} -> {} ({})",
            format_dollars(c.funding_total_a),
            format_dollars(c.funding_total_b),
            format_delta(c.funding_delta())
        )?;
    }

    let added: Vec<_> = c.spending_added().take(TOP_ENTRIES).collect();
    if !added.is_empty() {
        writeln!(out, "\n**Spending added:**")?;
        for s in added {
            writeln!(out, "- {}: {}", s.amount, s.text)?;
        }
    }
    let removed: Vec<_> = c.spending_removed().take(TOP_ENTRIES).collect();
    if !removed.is_empty() {
        writeln!(out, "\n**Spending removed:**")?;
        for s in removed {
            writeln!(out, "- {}: {}", s.amount, s.text)?;
        }
    }
    if !c.changes.is_empty() {
        writeln!(out, "\n**Key changes:**")?;
        for change in c.changes.iter().take(TOP_ENTRIES) {
            writeln!(
                out,
                "- {} ({}): {}",
                change.section,
                change.kind.as_str(),
                change.detail
            )?;
        }
    }
    Ok(())
}

/// Whole-dollar amount with thousands separators: `$1,234,567`.
pub fn format_dollars(amount: f64) -> String {
    let rounded = amount.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0.0 && rounded > 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Signed dollar delta: `+$5,000` / `-$5,000`.
pub fn format_delta(delta: f64) -> String {
    if delta < 0.0 {
        format_dollars(delta)
    } else {
        format!("+{}", format_dollars(delta))
    }
}
