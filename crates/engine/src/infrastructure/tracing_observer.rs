//! Observer that reports assembly diagnostics as `tracing` events.

use presetforge_domain::{CompositionError, ExtensionKind};

use super::ports::{AssemblyObserver, OmitReason};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AssemblyObserver for TracingObserver {
    fn composition_fallback(&self, preset: &str, error: &CompositionError) {
        tracing::warn!(
            preset = %preset,
            error = %error,
            "Regional prompt composition skipped, using simple join"
        );
    }

    fn extension_built(&self, preset: &str, extension: ExtensionKind, slots: usize) {
        tracing::debug!(
            preset = %preset,
            plugin = extension.plugin_key(),
            slots,
            "Built extension arguments"
        );
    }

    fn extension_omitted(&self, preset: &str, extension: &str, reason: OmitReason) {
        tracing::debug!(
            preset = %preset,
            extension = %extension,
            reason = reason.as_str(),
            "Extension omitted from payload"
        );
    }
}
