//! Response-text cleanup applied ahead of decoding.
//!
//! The model is instructed to emit bare report text, but real responses
//! arrive wrapped in code fences, with row-count hints glued to table
//! headers, and with mixed line endings. The decoder itself stays strict
//! about what a line is; this pass rewrites the envelope so the grammar
//! patterns match.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\n?").expect("static regex must compile")
});
static TRAILING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```[ \t]*$").expect("static regex must compile"));
// "[2 linhas] problemas_detectados{...}:" -> "problemas_detectados{...}:"
static HEADER_PREFIX_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\[[^\]\n]*\][ \t]*([A-Za-z_][A-Za-z0-9_]*\{)")
        .expect("static regex must compile")
});
// "problemas_detectados[2]{...}:" -> "problemas_detectados{...}:"
static HEADER_COUNT_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*[A-Za-z_][A-Za-z0-9_]*)\[\d+\](\{[^{}\n]*\}:)")
        .expect("static regex must compile")
});

/// Strips envelope noise from a raw model response: surrounding whitespace,
/// code-fence markers, bracketed hints attached to table headers, and
/// carriage returns.
///
/// # Examples
///
/// ```
/// use toon_report_decode::preprocess::clean_response_text;
///
/// let raw = "```toon\npercentual_conclusao: 72\n```";
/// assert_eq!(clean_response_text(raw), "percentual_conclusao: 72");
///
/// let hinted = "problemas_detectados[2]{tipo,descricao,severidade}:";
/// assert_eq!(
///     clean_response_text(hinted),
///     "problemas_detectados{tipo,descricao,severidade}:",
/// );
/// ```
pub fn clean_response_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = unified.trim();

    let without_leading = LEADING_FENCE_RE.replace(trimmed, "");
    let without_fences = TRAILING_FENCE_RE.replace(&without_leading, "");
    let without_prefix_hints = HEADER_PREFIX_HINT_RE.replace_all(&without_fences, "$1");
    let cleaned = HEADER_COUNT_HINT_RE.replace_all(&without_prefix_hints, "$1$2");

    cleaned.trim().to_string()
}
