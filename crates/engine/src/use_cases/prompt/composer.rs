//! Prompt composition with Regional Prompter awareness.
//!
//! A preset template wraps the caller prompt and supplies a negative prompt.
//! Plain prompts are simply joined with them. Prompts divided by region
//! keywords (`ADDCOL`, `BREAK`, ...) are rewritten chunk by chunk so every
//! region still receives the template text where the plugin expects it.

use presetforge_domain::{
    check_weighting, nesting_depth_at, split_regions, CompositionError, PromptSyntaxError,
    PromptTemplate, RegionKeyword, RegionSplit, RegionalConfig,
};

const SEPARATOR: &str = ", ";

/// Composed positive and negative prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    /// Whether the positive prompt was rewritten per region
    pub regions_active: bool,
    /// Region handling abandoned for the simple join, in discovery order
    pub issues: Vec<CompositionError>,
}

/// Merge the caller's prompts with a preset template.
///
/// Never fails: if region keywords cannot be handled without breaking the
/// prompt's weighting syntax, the problem is recorded in `issues` and the
/// simple join is used instead.
pub fn compose(
    user_prompt: &str,
    template: Option<&PromptTemplate>,
    regional: Option<&RegionalConfig>,
    user_negative: Option<&str>,
) -> Composition {
    let user_negative = user_negative.filter(|n| !n.trim().is_empty());

    let Some(template) = template else {
        return Composition {
            prompt: user_prompt.to_string(),
            negative_prompt: user_negative.map(str::to_string),
            regions_active: false,
            issues: Vec::new(),
        };
    };

    let regional = regional.copied().unwrap_or_default();
    let delimiters = RegionKeyword::delimiters(regional.not_change_and);
    let mut issues = Vec::new();

    let regions = match region_split(user_prompt, &delimiters) {
        Ok(regions) => regions,
        Err(issue) => {
            issues.push(issue);
            None
        }
    };
    let regions_active = regions.is_some();

    let prompt = match regions {
        Some(split) => wrap_regions(&split, template, &regional),
        None => join(&[template.prefix(), Some(user_prompt), template.suffix()]),
    };

    let negative_prompt = match (template.negative(), user_negative) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (Some(preset), Some(user)) if !regions_active => Some(join(&[Some(preset), Some(user)])),
        (Some(preset), Some(user)) => Some(region_negative(
            preset,
            user,
            &delimiters,
            &regional,
            &mut issues,
        )),
    };

    Composition {
        prompt,
        negative_prompt,
        regions_active,
        issues,
    }
}

/// Join non-blank parts with `", "`.
fn join(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .filter_map(|part| *part)
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Split `text` into regions, or `None` when it has no region keyword.
fn region_split(
    text: &str,
    delimiters: &[RegionKeyword],
) -> Result<Option<RegionSplit>, CompositionError> {
    let split = split_regions(text, delimiters);
    if !split.has_delimiters() {
        return Ok(None);
    }

    // Only the nesting depth at each keyword matters.
    if let Some(hit) = split
        .keywords
        .iter()
        .find(|hit| nesting_depth_at(text, hit.start) > 0)
    {
        return Err(match check_weighting(text) {
            Err(unclosed @ PromptSyntaxError::Unclosed { .. }) => {
                CompositionError::UnbalancedWeighting(unclosed)
            }
            _ => CompositionError::DelimiterInsideGroup {
                keyword: hit.keyword.as_str(),
                position: text[..hit.start].chars().count(),
            },
        });
    }

    if split.chunks.is_empty() {
        return Err(CompositionError::EmptyRegions);
    }
    Ok(Some(split))
}

fn wrap_regions(split: &RegionSplit, template: &PromptTemplate, regional: &RegionalConfig) -> String {
    // Common and base prompts already carry the template text into every region.
    // Any occurrence counts here, even one glued to another word.
    let source = split.source();
    let wrap_all = !regional.use_common
        && !source.contains(RegionKeyword::AddComm.as_str())
        && !regional.use_base
        && !source.contains(RegionKeyword::AddBase.as_str());

    split.rewrite(|index, chunk| {
        (index == 0 || wrap_all)
            .then(|| join(&[template.prefix(), Some(chunk.text.as_str()), template.suffix()]))
    })
}

fn region_negative(
    preset_negative: &str,
    user_negative: &str,
    delimiters: &[RegionKeyword],
    regional: &RegionalConfig,
    issues: &mut Vec<CompositionError>,
) -> String {
    match region_split(user_negative, delimiters) {
        Ok(Some(split)) if split.chunks.len() > 1 && !regional.use_negative_common => {
            split.rewrite(|_, chunk| Some(join(&[Some(preset_negative), Some(chunk.text.as_str())])))
        }
        Ok(_) => join(&[Some(preset_negative), Some(user_negative)]),
        Err(issue) => {
            issues.push(issue);
            join(&[Some(preset_negative), Some(user_negative)])
        }
    }
}
