//! Regional Prompter arguments: 16 fixed slots, plus the combined mask image
//! in mask mode.

use presetforge_domain::{is_ratio_list, ExtensionKind, RegionMode, RegionalPrompterConfig};
use serde_json::Value;

use super::{BuildContext, PositionalArgs};

/// Caller key carrying the combined mask image
pub const MASK_PARAM: &str = "rp_mask";

#[derive(Debug, Clone, PartialEq)]
pub struct RegionalPrompterArgs {
    pub active: bool,
    pub debug: bool,
    pub mode: RegionMode,
    pub matrix_submode: String,
    pub mask_submode: String,
    pub prompt_submode: String,
    pub divide_ratio: String,
    pub base_ratio: String,
    pub use_base: bool,
    pub use_common: bool,
    pub use_ncommon: bool,
    pub calc_mode: String,
    pub not_change_and: bool,
    pub lora_stop_step: String,
    pub lora_hires_stop_step: String,
    pub threshold: String,
    /// Trailing optional slot, only filled in mask mode
    pub mask: Option<String>,
}

impl PositionalArgs for RegionalPrompterArgs {
    const KIND: ExtensionKind = ExtensionKind::RegionalPrompter;

    fn into_args(self) -> Vec<Value> {
        let Self {
            active,
            debug,
            mode,
            matrix_submode,
            mask_submode,
            prompt_submode,
            divide_ratio,
            base_ratio,
            use_base,
            use_common,
            use_ncommon,
            calc_mode,
            not_change_and,
            lora_stop_step,
            lora_hires_stop_step,
            threshold,
            mask,
        } = self;
        let mut args: Vec<Value> = vec![
            active.into(),
            debug.into(),
            mode.as_str().into(),
            matrix_submode.into(),
            mask_submode.into(),
            prompt_submode.into(),
            divide_ratio.into(),
            base_ratio.into(),
            use_base.into(),
            use_common.into(),
            use_ncommon.into(),
            calc_mode.into(),
            not_change_and.into(),
            lora_stop_step.into(),
            lora_hires_stop_step.into(),
            threshold.into(),
        ];
        if let Some(mask) = mask {
            args.push(mask.into());
        }
        args
    }
}

/// Build Regional Prompter arguments, or `None` when inactive.
pub fn build(config: &RegionalPrompterConfig, ctx: &BuildContext<'_>) -> Option<RegionalPrompterArgs> {
    if !config.is_active() {
        return None;
    }

    let base_ratio = config
        .base_ratio()
        .filter(|ratio| is_ratio_list(ratio))
        .unwrap_or(ctx.settings.rp_default_base_ratio());

    let mode = config.mode();
    let mask = match mode {
        RegionMode::Mask => ctx.params.str(MASK_PARAM).map(str::to_string),
        RegionMode::Matrix | RegionMode::Prompt => None,
    };

    Some(RegionalPrompterArgs {
        active: true,
        debug: config.debug(),
        mode,
        matrix_submode: config.matrix_submode().to_string(),
        mask_submode: config.mask_submode().to_string(),
        prompt_submode: config.prompt_submode().to_string(),
        divide_ratio: config.divide_ratio().to_string(),
        base_ratio: base_ratio.to_string(),
        use_base: config.use_base(),
        use_common: config.use_common(),
        use_ncommon: config.use_negative_common(),
        calc_mode: config.calc_mode().to_string(),
        not_change_and: config.not_change_and(),
        lora_stop_step: config.lora_stop_step().to_string(),
        lora_hires_stop_step: config.lora_hires_stop_step().to_string(),
        threshold: config.threshold().to_string(),
        mask,
    })
}
