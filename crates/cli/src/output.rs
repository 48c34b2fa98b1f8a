//! Terminal output for answers and progress.

use std::io::Write;

/// Format an answer and its citations for the terminal.
///
/// Layout: a blank line, the `📚 Response:` header and the answer, a blank
/// line, then `📖 Sources:` with one `- ` line per source.
pub fn format_response(answer: &str, sources: &[String]) -> String {
    let formatted_sources = sources
        .iter()
        .map(|source| format!("- {}", source))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\n📚 Response:\n{}\n\n📖 Sources:\n{}\n",
        answer, formatted_sources
    )
}

/// Print a progress label without a newline so ` Done!` can follow it.
pub fn start_step<W: Write>(out: &mut W, label: &str) -> std::io::Result<()> {
    write!(out, "{}", label)?;
    out.flush()
}

/// Close a step opened with [`start_step`].
pub fn finish_step<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, " Done!")
}
