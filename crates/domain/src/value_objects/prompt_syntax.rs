//! Prompt weighting syntax
//!
//! SD WebUI emphasis forms:
//!
//! - `(text)` - 1.1x weight, `((text))` - 1.21x
//! - `[text]` - 0.9x weight
//! - `{text}` - no meaning to the backend, but used by some extensions
//! - `\(text\)` - escaped, literal parentheses

use crate::error::PromptSyntaxError;

#[derive(Default)]
struct Depths {
    paren: usize,
    bracket: usize,
    brace: usize,
}

impl Depths {
    fn total(&self) -> usize {
        self.paren + self.bracket + self.brace
    }
}

/// Check that `()`, `[]` and `{}` are balanced, honoring backslash escapes.
///
/// Positions in errors are character offsets.
pub fn check_weighting(prompt: &str) -> Result<(), PromptSyntaxError> {
    let mut depths = Depths::default();
    let mut escaped = false;

    for (position, ch) in prompt.chars().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        let counter = match ch {
            '\\' => {
                escaped = true;
                continue;
            }
            '(' | ')' => &mut depths.paren,
            '[' | ']' => &mut depths.bracket,
            '{' | '}' => &mut depths.brace,
            _ => continue,
        };
        if matches!(ch, '(' | '[' | '{') {
            *counter += 1;
        } else if *counter == 0 {
            return Err(PromptSyntaxError::Unmatched {
                bracket: ch,
                position,
            });
        } else {
            *counter -= 1;
        }
    }

    for (group, open) in [
        ("parentheses", depths.paren),
        ("brackets", depths.bracket),
        ("braces", depths.brace),
    ] {
        if open != 0 {
            return Err(PromptSyntaxError::Unclosed { group, open });
        }
    }
    Ok(())
}

/// Number of weighting groups open just before byte offset `at`.
///
/// Stray closing brackets are ignored here; `check_weighting` reports them.
pub fn nesting_depth_at(prompt: &str, at: usize) -> usize {
    let mut depths = Depths::default();
    let mut escaped = false;

    for (offset, ch) in prompt.char_indices() {
        if offset >= at {
            break;
        }
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '(' => depths.paren += 1,
            '[' => depths.bracket += 1,
            '{' => depths.brace += 1,
            ')' => depths.paren = depths.paren.saturating_sub(1),
            ']' => depths.bracket = depths.bracket.saturating_sub(1),
            '}' => depths.brace = depths.brace.saturating_sub(1),
            _ => {}
        }
    }
    depths.total()
}
