use std::path::Path;

use hangar_config::{Addon, AddonTrack};

use crate::inspector::{InstallInspector, UpdateCheckOptions};
use crate::install_status::InstallStatus;

/// Everything the rules look at during one pass.
pub struct DetectionContext<'a> {
    pub addon: &'a Addon,
    pub selected_track: Option<&'a AddonTrack>,
    pub discovered: bool,
    pub install_dir: &'a Path,
    pub inspector: &'a dyn InstallInspector,
}

/// One row of the install-status decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionRule {
    HiddenUndiscovered,
    NoTrackSelected,
    MissingInstallDir,
    GitCheckout,
    UpdateCheck,
}

impl DetectionRule {
    /// Evaluation order. The first rule producing a status ends the pass.
    pub const ORDER: [DetectionRule; 5] = [
        DetectionRule::HiddenUndiscovered,
        DetectionRule::NoTrackSelected,
        DetectionRule::MissingInstallDir,
        DetectionRule::GitCheckout,
        DetectionRule::UpdateCheck,
    ];

    pub async fn evaluate(self, ctx: &DetectionContext<'_>) -> Option<InstallStatus> {
        match self {
            DetectionRule::HiddenUndiscovered => {
                (ctx.addon.hidden && !ctx.discovered).then_some(InstallStatus::Hidden)
            }
            DetectionRule::NoTrackSelected => {
                ctx.selected_track.is_none().then_some(InstallStatus::Unknown)
            }
            DetectionRule::MissingInstallDir => (!ctx.inspector.install_dir_exists(ctx.install_dir))
                .then_some(InstallStatus::FreshInstall),
            DetectionRule::GitCheckout => ctx
                .inspector
                .is_git_checkout(ctx.install_dir)
                .then_some(InstallStatus::GitInstall),
            DetectionRule::UpdateCheck => Some(Self::check_for_update(ctx).await),
        }
    }

    async fn check_for_update(ctx: &DetectionContext<'_>) -> InstallStatus {
        let Some(track) = ctx.selected_track else {
            return InstallStatus::Unknown;
        };
        let options = UpdateCheckOptions {
            force_cache_bust: true,
        };
        match ctx
            .inspector
            .check_for_update(&track.url, ctx.install_dir, options)
            .await
        {
            Ok(info) if info.is_fresh_install => InstallStatus::FreshInstall,
            Ok(info) if info.needs_update => InstallStatus::NeedsUpdate,
            Ok(_) => InstallStatus::UpToDate,
            Err(e) => {
                tracing::error!(addon = %ctx.addon.key, error = %e, "update check failed");
                InstallStatus::Unknown
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub status: InstallStatus,
    pub rule: DetectionRule,
}

/// Runs the rules in [`DetectionRule::ORDER`] and stops at the first match.
pub async fn detect_status(ctx: &DetectionContext<'_>) -> Detection {
    for rule in DetectionRule::ORDER {
        if let Some(status) = rule.evaluate(ctx).await {
            tracing::debug!(addon = %ctx.addon.key, ?rule, %status, "install status detected");
            return Detection { status, rule };
        }
    }
    Detection {
        status: InstallStatus::Unknown,
        rule: DetectionRule::UpdateCheck,
    }
}
