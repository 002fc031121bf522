//! Line accounting and oldest-half eviction
//!
//! Rotation works on physical lines only. A multi-line entry (one carrying a
//! failure trace) can therefore lose its head lines when the cut falls inside
//! it.

/// Default line cap for the rolling log
pub const DEFAULT_MAX_LINES: usize = 2000;

/// Count physical lines the same way `str::lines` splits them
pub fn count_lines(content: &str) -> usize {
    content.lines().count()
}

/// Number of lines rotation keeps out of `count`: the newest `ceil(count/2)`
pub fn lines_to_keep(count: usize) -> usize {
    count - count / 2
}

/// Whether appending `incoming` lines on top of `count` must rotate first.
///
/// For single-line entries this is `count >= max_lines`.
pub fn needs_rotation(count: usize, incoming: usize, max_lines: usize) -> bool {
    count + incoming > max_lines
}

/// Drop the oldest `floor(n/2)` lines, preserving order.
///
/// Returns the retained text (newline-terminated, empty when nothing is
/// kept) and its line count.
pub fn retain_newest_half(content: &str) -> (String, usize) {
    let lines: Vec<&str> = content.lines().collect();
    let drop = lines.len() / 2;
    let kept = &lines[drop..];

    let mut out = String::with_capacity(content.len() / 2 + 1);
    for line in kept {
        out.push_str(line);
        out.push('\n');
    }
    (out, kept.len())
}
