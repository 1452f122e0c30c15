//! Boundary-aware splitting of large diffs.
//!
//! A diff is treated as plain lines. The only structure recognised is the
//! file-boundary line (`diff --git ...`), which always starts a new chunk.
//! Each chunk after the first is prefixed with the trailing lines of its
//! predecessor so the backend sees some context across the split.

/// Marker that opens a new file section in a unified git diff.
pub const FILE_BOUNDARY: &str = "diff --git";

/// A contiguous run of lines from the input plus the overlap copied from the
/// previous chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
  overlap: Vec<&'a str>,
  lines:   Vec<&'a str>
}

impl<'a> Chunk<'a> {
  /// Lines copied from the end of the previous chunk.
  pub fn overlap(&self) -> &[&'a str] {
    &self.overlap
  }

  /// Lines that belong to this chunk in the original input.
  pub fn lines(&self) -> &[&'a str] {
    &self.lines
  }

  /// The chunk's own content, without the overlap prefix.
  pub fn body(&self) -> String {
    self.lines.concat()
  }

  /// Size of the body as counted by the chunker.
  pub fn size(&self) -> usize {
    self.lines.iter().map(|line| line_size(line)).sum()
  }

  /// Overlap prefix followed by the body; this is what gets summarized.
  pub fn text(&self) -> String {
    let mut text = String::with_capacity(self.overlap.iter().map(|l| l.len()).sum::<usize>() + self.size());
    for line in self.overlap.iter().chain(self.lines.iter()) {
      text.push_str(line);
      if !line.ends_with('\n') {
        text.push('\n');
      }
    }
    text
  }
}

/// Splits text into chunks of at most `budget` bytes with `overlap` lines of
/// shared context between neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
  budget:  usize,
  overlap: usize
}

impl Chunker {
  pub fn new(budget: usize, overlap: usize) -> Self {
    Self { budget, overlap }
  }

  pub fn budget(&self) -> usize {
    self.budget
  }

  pub fn overlap(&self) -> usize {
    self.overlap
  }

  pub fn split<'a>(&self, text: &'a str) -> Vec<Chunk<'a>> {
    let mut chunks: Vec<Chunk<'a>> = self
      .boundaries(text)
      .into_iter()
      .map(|lines| Chunk { overlap: Vec::new(), lines })
      .collect();

    // Overlap is taken from the original bodies, never from an already
    // prefixed chunk.
    if self.overlap > 0 && chunks.len() > 1 {
      for i in 1..chunks.len() {
        let previous = &chunks[i - 1].lines;
        let start = previous.len().saturating_sub(self.overlap);
        let overlap = previous[start..].to_vec();
        chunks[i].overlap = overlap;
      }
    }

    chunks
  }

  fn boundaries<'a>(&self, text: &'a str) -> Vec<Vec<&'a str>> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_size = 0;

    for (i, &line) in lines.iter().enumerate() {
      let size = line_size(line);

      if is_file_boundary(line) || current_size + size > self.budget {
        flush(&mut chunks, &mut current, &mut current_size);
      }

      current.push(line);
      current_size += size;

      let next_is_boundary = lines.get(i + 1).is_some_and(|next| is_file_boundary(next));
      if i == lines.len() - 1 || next_is_boundary {
        flush(&mut chunks, &mut current, &mut current_size);
      }
    }

    chunks
  }
}

/// Convenience wrapper returning the rendered chunk strings in order.
pub fn chunk(text: &str, budget: usize, overlap: usize) -> Vec<String> {
  Chunker::new(budget, overlap)
    .split(text)
    .iter()
    .map(Chunk::text)
    .collect()
}

pub fn is_file_boundary(line: &str) -> bool {
  line.starts_with(FILE_BOUNDARY)
}

// Line length without its terminator, plus one for the separator.
fn line_size(line: &str) -> usize {
  line.strip_suffix('\n').unwrap_or(line).len() + 1
}

fn flush<'a>(chunks: &mut Vec<Vec<&'a str>>, current: &mut Vec<&'a str>, current_size: &mut usize) {
  if !current.is_empty() {
    chunks.push(std::mem::take(current));
  }
  *current_size = 0;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn numbered(count: usize) -> String {
    (0..count).map(|i| format!("line {i:03}\n")).collect()
  }

  fn file_section(name: &str, lines: usize) -> String {
    let mut section = format!("diff --git a/{name} b/{name}\n");
    for i in 0..lines {
      section.push_str(&format!("+{name} change {i}\n"));
    }
    section
  }

  #[test]
  fn test_empty_text_yields_no_chunks() {
    assert!(Chunker::new(100, 5).split("").is_empty());
    assert!(chunk("", 100, 5).is_empty());
  }

  #[test]
  fn test_small_text_is_single_chunk_without_overlap() {
    let text = "one\ntwo\nthree\n";
    let chunks = Chunker::new(1000, 5).split(text);
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].overlap().is_empty());
    assert_eq!(chunks[0].text(), text);
  }

  #[test]
  fn test_bodies_reconstruct_input() {
    let text = format!("{}{}{}", file_section("a.rs", 40), numbered(57), file_section("b.rs", 3));
    let chunks = Chunker::new(120, 5).split(&text);
    let rebuilt: String = chunks.iter().map(Chunk::body).collect();
    assert_eq!(rebuilt, text);
  }

  #[test]
  fn test_reconstructs_input_without_trailing_newline() {
    let text = "first\nsecond\nthird";
    let chunks = Chunker::new(8, 1).split(text);
    let rebuilt: String = chunks.iter().map(Chunk::body).collect();
    assert_eq!(rebuilt, text);
  }

  #[test]
  fn test_bodies_respect_budget() {
    let text = numbered(200);
    for chunk in Chunker::new(100, 5).split(&text) {
      assert!(chunk.size() <= 100, "chunk of {} bytes", chunk.size());
    }
  }

  #[test]
  fn test_oversized_line_forms_its_own_chunk() {
    let long = "x".repeat(50);
    let text = format!("a\n{long}\nb\n");
    let chunks = Chunker::new(10, 0).split(&text);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1].body(), format!("{long}\n"));
    assert_eq!(chunks[1].size(), 51);
  }

  #[test]
  fn test_two_file_sections_under_budget_make_two_chunks() {
    let text = format!("{}{}", file_section("a.rs", 3), file_section("b.rs", 3));
    let chunks = Chunker::new(10_000, 0).split(&text);
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].body().starts_with("diff --git a/a.rs"));
    assert!(chunks[1].body().starts_with("diff --git a/b.rs"));
  }

  #[test]
  fn test_preamble_before_first_boundary_is_separate() {
    let text = format!("commit message header\n{}", file_section("a.rs", 2));
    let chunks = Chunker::new(10_000, 0).split(&text);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].body(), "commit message header\n");
  }

  #[test]
  fn test_no_chunk_mixes_file_sections() {
    let text = format!("{}{}{}", file_section("a.rs", 10), file_section("b.rs", 2), file_section("c.rs", 30));
    let chunks = Chunker::new(150, 5).split(&text);
    assert!(chunks.len() >= 3);
    for chunk in &chunks {
      let boundaries = chunk.lines().iter().filter(|l| is_file_boundary(l)).count();
      assert!(boundaries <= 1);
      if boundaries == 1 {
        assert!(is_file_boundary(chunk.lines()[0]));
      }
    }
  }

  #[test]
  fn test_overlap_uses_original_previous_chunk() {
    let text = numbered(30);
    let chunker = Chunker::new(40, 3);
    let chunks = chunker.split(&text);
    assert!(chunks.len() > 2);

    for i in 1..chunks.len() {
      let previous = chunks[i - 1].lines();
      let expected = &previous[previous.len().saturating_sub(3)..];
      assert_eq!(chunks[i].overlap(), expected);
      assert!(chunks[i].text().starts_with(&expected.concat()));
      assert!(chunks[i].text().ends_with(&chunks[i].body()));
    }
  }

  #[test]
  fn test_overlap_takes_whole_short_previous_chunk() {
    let text = format!("{}{}", file_section("a.rs", 1), file_section("b.rs", 1));
    let chunks = Chunker::new(10_000, 5).split(&text);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].overlap(), chunks[0].lines());
  }

  #[test]
  fn test_zero_overlap_adds_nothing() {
    let text = numbered(30);
    for chunk in Chunker::new(40, 0).split(&text) {
      assert!(chunk.overlap().is_empty());
      assert_eq!(chunk.text(), chunk.body());
    }
  }

  #[test]
  fn test_chunk_helper_renders_overlap() {
    let chunks = chunk("a\nb\nc\nd\n", 4, 1);
    assert_eq!(chunks, vec!["a\nb\n", "b\nc\nd\n"]);
  }
}
