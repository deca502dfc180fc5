//! Heading-aware document chunking
//!
//! Long documents split into addressable chunks at configured heading
//! levels, with oversized sections further split at paragraph boundaries
//! and undersized chunks merged back into their predecessor. Heading
//! markers inside fenced code blocks are ignored.

use crate::config::ChunkConfig;
use crate::document::strip_frontmatter;

/// One addressable slice of a document
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Position within the result; always equals the chunk's index in
    /// [`ChunkResult::chunks`]
    pub index: usize,

    /// Heading the chunk falls under; empty for preamble or headingless text
    pub heading: String,

    /// Markdown level of the heading, 0 when there is none
    pub heading_level: usize,

    /// Trimmed chunk text, including the heading line itself
    pub content: String,

    /// Character count of `content`
    pub char_count: usize,
}

/// The outcome of chunking one document
#[derive(Debug, Clone)]
pub struct ChunkResult {
    /// Chunks in document order
    pub chunks: Vec<Chunk>,

    /// Number of chunks
    pub total: usize,

    /// Character count of the metadata-stripped source
    pub source_char_count: usize,

    /// Whether the document was actually split
    pub was_split: bool,
}

/// Split a document into chunks according to `config`
///
/// A leading metadata header is stripped before anything is measured.
/// Documents shorter than `min_chars` (or with chunking disabled) come back
/// as a single chunk.
pub fn chunk_document(text: &str, config: &ChunkConfig) -> ChunkResult {
    let body = strip_frontmatter(text);
    let source_char_count = body.chars().count();

    if !config.enabled || source_char_count < config.min_chars {
        let content = body.trim().to_string();
        let char_count = content.chars().count();
        return ChunkResult {
            chunks: vec![Chunk {
                index: 0,
                heading: String::new(),
                heading_level: 0,
                content,
                char_count,
            }],
            total: 1,
            source_char_count,
            was_split: false,
        };
    }

    let headings = find_headings(body, &config.heading_levels);

    let sections = if headings.is_empty() {
        vec![Section {
            heading: String::new(),
            level: 0,
            content: body,
        }]
    } else {
        let mut sections = Vec::with_capacity(headings.len() + 1);
        let preamble = &body[..headings[0].offset];
        if !preamble.trim().is_empty() {
            sections.push(Section {
                heading: String::new(),
                level: 0,
                content: preamble,
            });
        }
        for (i, heading) in headings.iter().enumerate() {
            let end = headings
                .get(i + 1)
                .map(|next| next.offset)
                .unwrap_or(body.len());
            sections.push(Section {
                heading: heading.text.clone(),
                level: heading.level,
                content: &body[heading.offset..end],
            });
        }
        sections
    };

    let mut raw: Vec<Chunk> = Vec::new();
    for section in sections {
        let trimmed = section.content.trim();
        if trimmed.chars().count() <= config.max_chars {
            raw.push(Chunk {
                index: 0,
                heading: section.heading,
                heading_level: section.level,
                content: trimmed.to_string(),
                char_count: 0,
            });
            continue;
        }
        for (i, piece) in pack_paragraphs(trimmed, config.max_chars).into_iter().enumerate() {
            let heading = if i == 0 || section.heading.is_empty() {
                section.heading.clone()
            } else {
                format!("{} (cont.)", section.heading)
            };
            raw.push(Chunk {
                index: 0,
                heading,
                heading_level: section.level,
                content: piece,
                char_count: 0,
            });
        }
    }

    // Merge pass: short chunks fold into their predecessor, keeping the
    // predecessor's heading. The first chunk has nothing to merge into.
    let mut merged: Vec<Chunk> = Vec::new();
    for chunk in raw {
        let trimmed_len = chunk.content.trim().chars().count();
        if trimmed_len < config.min_chars && !merged.is_empty() {
            let prev = merged.last_mut().expect("non-empty");
            if trimmed_len > 0 {
                prev.content.push_str("\n\n");
                prev.content.push_str(chunk.content.trim());
            }
        } else {
            merged.push(chunk);
        }
    }

    let mut chunks: Vec<Chunk> = merged
        .into_iter()
        .filter(|c| !c.content.trim().is_empty())
        .collect();

    if chunks.is_empty() {
        chunks.push(Chunk {
            index: 0,
            heading: String::new(),
            heading_level: 0,
            content: String::new(),
            char_count: 0,
        });
    }

    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.index = i;
        chunk.char_count = chunk.content.chars().count();
    }

    let total = chunks.len();
    ChunkResult {
        chunks,
        total,
        source_char_count,
        was_split: total > 1,
    }
}

struct Section<'a> {
    heading: String,
    level: usize,
    content: &'a str,
}

struct HeadingMark {
    /// Byte offset of the heading line within the body
    offset: usize,
    level: usize,
    text: String,
}

/// Locate heading lines at the configured levels, skipping fenced code
///
/// Fences open with a line of three or more identical backticks or tildes
/// and close with a line of at least as many of the same character.
fn find_headings(body: &str, levels: &[usize]) -> Vec<HeadingMark> {
    let mut headings = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let trimmed = line.trim();

        if let Some((fence_char, fence_len)) = fence {
            let run = leading_run(trimmed, fence_char);
            if run >= fence_len && trimmed[run..].trim().is_empty() {
                fence = None;
            }
            continue;
        }

        for fence_char in ['`', '~'] {
            let run = leading_run(trimmed, fence_char);
            if run >= 3 {
                fence = Some((fence_char, run));
                break;
            }
        }
        if fence.is_some() {
            continue;
        }

        let hashes = leading_run(trimmed, '#');
        if hashes > 0 && levels.contains(&hashes) {
            if let Some(rest) = trimmed[hashes..].strip_prefix(' ') {
                headings.push(HeadingMark {
                    offset: line_start,
                    level: hashes,
                    text: rest.trim().to_string(),
                });
            }
        }
    }

    headings
}

fn leading_run(s: &str, ch: char) -> usize {
    s.chars().take_while(|c| *c == ch).count()
}

/// Greedily pack blank-line-separated paragraphs up to `max_chars`
///
/// A single paragraph longer than `max_chars` is kept whole rather than
/// split mid-paragraph; an accepted approximation.
fn pack_paragraphs(text: &str, max_chars: usize) -> Vec<String> {
    let paragraphs = split_paragraphs(text);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for para in paragraphs {
        let para_chars = para.chars().count();
        if current.is_empty() {
            current = para.to_string();
            current_chars = para_chars;
        } else if current_chars + 2 + para_chars <= max_chars {
            current.push_str("\n\n");
            current.push_str(para);
            current_chars += 2 + para_chars;
        } else {
            pieces.push(current);
            current = para.to_string();
            current_chars = para_chars;
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Split text at blank lines into trimmed, non-empty paragraphs
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let mut in_blank = false;

    for line in text.split_inclusive('\n') {
        let blank = line.trim().is_empty();
        if blank && !in_blank {
            let para = text[start..offset].trim();
            if !para.is_empty() {
                paragraphs.push(para);
            }
            in_blank = true;
        } else if !blank && in_blank {
            start = offset;
            in_blank = false;
        }
        offset += line.len();
    }
    if !in_blank {
        let tail = text[start..].trim();
        if !tail.is_empty() {
            paragraphs.push(tail);
        }
    }
    paragraphs
}
