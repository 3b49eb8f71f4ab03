//! Granularity chunking of extracted text.
//!
//! A helper's raw output is segmented into bounded units of non-blank
//! lines. Granularity 0 is a deliberate short-preview mode: only one chunk
//! holding the first lines of the extraction is ever produced.

use crate::types::PREVIEW_LINES;

/// Split raw extracted text into chunk strings.
///
/// Blank lines are discarded; kept lines are joined with `\n`. With
/// `granularity == 0` at most one chunk of up to [`PREVIEW_LINES`] lines is
/// yielded and the rest of the input is ignored. With `granularity == g > 0`
/// a chunk is flushed every `g` accumulated lines, plus a final shorter
/// chunk for any remainder.
///
/// The returned iterator is lazy and a pure function of its input: calling
/// `split` twice on the same text yields the same chunks.
pub fn split(text: &str, granularity: u32) -> Chunks<'_> {
    Chunks {
        lines: text.lines(),
        granularity,
        done: false,
    }
}

pub struct Chunks<'a> {
    lines: std::str::Lines<'a>,
    granularity: u32,
    done: bool,
}

impl Iterator for Chunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let limit = if self.granularity == 0 {
            PREVIEW_LINES
        } else {
            self.granularity as usize
        };
        let mut chunk = String::new();
        let mut count = 0usize;
        for line in self.lines.by_ref() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if !chunk.is_empty() {
                chunk.push('\n');
            }
            chunk.push_str(line);
            count += 1;
            if count == limit {
                // Preview mode stops after its single chunk.
                if self.granularity == 0 {
                    self.done = true;
                }
                return Some(chunk);
            }
        }
        self.done = true;
        if count > 0 {
            Some(chunk)
        } else {
            None
        }
    }
}
