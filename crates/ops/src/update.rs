//! Update check against the version endpoint

use crate::{OpsCtx, UpdateAvailable};
use nxfw_errors::{Error, NetworkError};
use nxfw_events::{AppEvent, EventEmitter, UpdateEvent};
use nxfw_types::{SystemUpdateMeta, TitleVersion};

/// Ask the CDN for the latest system-update root
///
/// # Errors
///
/// Returns a `NetworkError` if the request fails or the response lists no
/// system-update meta.
pub async fn latest_update(ctx: &OpsCtx) -> Result<SystemUpdateMeta, Error> {
    let info = ctx.client.get_latest_version().await?;
    info.latest().copied().ok_or_else(|| {
        NetworkError::InvalidResponse {
            endpoint: ctx.client.endpoints().version_base().to_string(),
            message: "system_update_metas is empty".to_string(),
        }
        .into()
    })
}

/// Compare the remote root version with `current`
///
/// Only an exact match counts as up to date. A remote ordinal lower than
/// `current` is still reported as available, flagged as a downgrade.
///
/// # Errors
///
/// Returns a `NetworkError` if the version check fails.
pub async fn check_update(
    ctx: &OpsCtx,
    current: TitleVersion,
) -> Result<Option<UpdateAvailable>, Error> {
    ctx.emit(AppEvent::Update(UpdateEvent::CheckStarted { current }));

    let latest = latest_update(ctx).await?;
    if latest.title_version == current {
        ctx.emit(AppEvent::Update(UpdateEvent::UpToDate { version: current }));
        return Ok(None);
    }

    let update = UpdateAvailable {
        title_id: latest.title_id,
        current,
        remote: latest.title_version,
        downgrade: latest.title_version < current,
    };
    ctx.emit(AppEvent::Update(UpdateEvent::Available {
        current,
        title_id: update.title_id,
        remote: update.remote,
        downgrade: update.downgrade,
    }));
    Ok(Some(update))
}
