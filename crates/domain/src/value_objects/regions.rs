//! Region keyword splitting for Regional Prompter prompts
//!
//! A regional prompt is plain text divided by keywords:
//!
//! ```text
//! 2girls ADDCOMM red hair ADDCOL blue hair BREAK green eyes
//! ```
//!
//! Splitting keeps byte offsets for every chunk so that a chunk can be
//! rewritten in place, leaving the keywords and the whitespace around them
//! exactly as the caller typed them.
//!
//! # Example
//!
//! ```
//! use presetforge_domain::{split_regions, RegionKeyword};
//!
//! let split = split_regions("A ADDCOL B", &RegionKeyword::delimiters(false));
//! assert_eq!(split.chunk_texts(), vec!["A", "B"]);
//!
//! let rewritten = split.rewrite(|_, chunk| Some(format!("<{}>", chunk.text)));
//! assert_eq!(rewritten, "<A> ADDCOL <B>");
//! ```

use serde::{Deserialize, Serialize};

/// Region delimiter keywords, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKeyword {
    AddComm,
    AddBase,
    AddCol,
    AddRow,
    Break,
    And,
}

impl RegionKeyword {
    /// Keywords that always split, in precedence order
    pub const FIXED: [RegionKeyword; 5] = [
        Self::AddComm,
        Self::AddBase,
        Self::AddCol,
        Self::AddRow,
        Self::Break,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddComm => "ADDCOMM",
            Self::AddBase => "ADDBASE",
            Self::AddCol => "ADDCOL",
            Self::AddRow => "ADDROW",
            Self::Break => "BREAK",
            Self::And => "AND",
        }
    }

    /// The active delimiter set. `AND` only splits while the plugin is
    /// allowed to convert it (`not_change_and == false`).
    pub fn delimiters(not_change_and: bool) -> Vec<RegionKeyword> {
        let mut set = Self::FIXED.to_vec();
        if !not_change_and {
            set.push(Self::And);
        }
        set
    }
}

impl std::fmt::Display for RegionKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword occurrence in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordHit {
    pub keyword: RegionKeyword,
    /// Byte offset of the keyword's first character
    pub start: usize,
}

impl KeywordHit {
    pub fn end(&self) -> usize {
        self.start + self.keyword.as_str().len()
    }
}

/// One trimmed, non-blank region of a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Byte offset where the trimmed text starts in the source
    pub start: usize,
    /// Byte offset just past the trimmed text
    pub end: usize,
}

/// Result of splitting a prompt on region keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSplit {
    source: String,
    pub keywords: Vec<KeywordHit>,
    /// Chunk 0 is the base chunk
    pub chunks: Vec<Chunk>,
}

impl RegionSplit {
    /// Whether any delimiter occurred at all
    pub fn has_delimiters(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn chunk_texts(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Rebuild the source, replacing each chunk for which `replace` returns
    /// `Some`. Text between chunks is copied verbatim.
    pub fn rewrite<F>(&self, mut replace: F) -> String
    where
        F: FnMut(usize, &Chunk) -> Option<String>,
    {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for (index, chunk) in self.chunks.iter().enumerate() {
            out.push_str(&self.source[cursor..chunk.start]);
            match replace(index, chunk) {
                Some(replacement) => out.push_str(&replacement),
                None => out.push_str(&chunk.text),
            }
            cursor = chunk.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Find whole-word keyword occurrences, left to right.
///
/// A keyword touching an ASCII letter, digit or underscore is part of a
/// larger word (`ANDROID`, `BREAKFAST`) and does not count.
pub fn find_keywords(text: &str, delimiters: &[RegionKeyword]) -> Vec<KeywordHit> {
    let bytes = text.as_bytes();
    let mut hits = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let at_boundary = i == 0 || !is_word_byte(bytes[i - 1]);
        let hit = if at_boundary {
            delimiters.iter().copied().find(|keyword| {
                let word = keyword.as_str().as_bytes();
                let end = i + word.len();
                bytes[i..].starts_with(word) && (end == bytes.len() || !is_word_byte(bytes[end]))
            })
        } else {
            None
        };

        match hit {
            Some(keyword) => {
                hits.push(KeywordHit { keyword, start: i });
                i += keyword.as_str().len();
            }
            None => i += 1,
        }
    }
    hits
}

/// Split `text` on the given delimiters, dropping keywords and blank chunks.
pub fn split_regions(text: &str, delimiters: &[RegionKeyword]) -> RegionSplit {
    let keywords = find_keywords(text, delimiters);
    let mut chunks = Vec::with_capacity(keywords.len() + 1);

    let mut segment_start = 0;
    let boundaries = keywords
        .iter()
        .map(|hit| (hit.start, hit.end()))
        .chain(std::iter::once((text.len(), text.len())));

    for (segment_end, next_start) in boundaries {
        let segment = &text[segment_start..segment_end];
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            let offset = segment.len() - segment.trim_start().len();
            let start = segment_start + offset;
            chunks.push(Chunk {
                text: trimmed.to_string(),
                start,
                end: start + trimmed.len(),
            });
        }
        segment_start = next_start;
    }

    RegionSplit {
        source: text.to_string(),
        keywords,
        chunks,
    }
}
