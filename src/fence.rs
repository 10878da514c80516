/// Bare fence delimiter. Tagged fences ("```rust") never match.
pub const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseReport {
    pub input_lines: usize,
    pub output_lines: usize,
    /// Runs of exactly two fences, dropped entirely
    pub empty_blocks_removed: usize,
    /// Runs of three or more fences, reduced to one
    pub runs_collapsed: usize,
    pub blank_lines_skipped: usize,
}

impl CollapseReport {
    pub fn changed(&self) -> bool {
        self.empty_blocks_removed > 0 || self.runs_collapsed > 0
    }
}

/// Trimming follows Unicode `White_Space`, so the ASCII separators
/// U+001C..=U+001F are content, not padding.
#[inline]
pub fn is_fence_delimiter(line: &str) -> bool {
    line.trim() == FENCE
}

#[inline]
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

struct Cursor<'a, S> {
    lines: &'a [S],
    pos: usize,
}

impl<'a, S: AsRef<str>> Cursor<'a, S> {
    fn new(lines: &'a [S]) -> Self {
        Self { lines, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).map(|line| line.as_ref())
    }

    /// Length of the fence run starting at the cursor; 0 on ordinary lines.
    fn fence_run_len(&self) -> usize {
        self.lines[self.pos..]
            .iter()
            .take_while(|line| is_fence_delimiter(line.as_ref()))
            .count()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_blank_lines(&mut self) -> usize {
        let skipped = self.lines[self.pos..]
            .iter()
            .take_while(|line| is_blank(line.as_ref()))
            .count();
        self.pos += skipped;
        skipped
    }
}

/// Drops empty fenced code blocks and squashes longer fence runs to a single
/// delimiter. Blank lines directly after either are dropped as well.
pub fn collapse_fences<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    collapse_fences_with_report(lines).0
}

pub fn collapse_fences_with_report<S: AsRef<str>>(lines: &[S]) -> (Vec<String>, CollapseReport) {
    let mut cursor = Cursor::new(lines);
    let mut output = Vec::with_capacity(lines.len());
    let mut report = CollapseReport {
        input_lines: lines.len(),
        ..CollapseReport::default()
    };

    while let Some(line) = cursor.peek() {
        match cursor.fence_run_len() {
            2 => {
                tracing::debug!("Removing empty code block at line {}", cursor.pos + 1);
                cursor.advance(2);
                report.empty_blocks_removed += 1;
            }
            count if count > 2 => {
                tracing::debug!(
                    "Collapsing {} consecutive fences at line {}",
                    count,
                    cursor.pos + 1
                );
                output.push(format!("{FENCE}\n"));
                cursor.advance(count);
                report.runs_collapsed += 1;
            }
            _ => {
                output.push(line.to_string());
                cursor.advance(1);
                continue;
            }
        }

        report.blank_lines_skipped += cursor.skip_blank_lines();
    }

    report.output_lines = output.len();
    (output, report)
}
