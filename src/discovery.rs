//! Finding attached cameras and opening sessions on them.

use crate::catalog::{AbilitiesCatalog, DriverContext, PortCatalog};
use crate::driver::{DetectedCamera, DeviceHandle, Driver};
use crate::errors::{CameraError, Result};
use crate::session::CameraSession;

/// Outcome of a multi-device listing.
///
/// `sessions` keeps the order the driver reported devices in. Candidates that
/// could not be opened are listed in `failures` as
/// [`CameraError::DiscoveryPartialFailure`].
#[derive(Debug)]
pub struct DiscoveryReport<H: DeviceHandle> {
    pub sessions: Vec<CameraSession<H>>,
    pub failures: Vec<CameraError>,
}

impl<H: DeviceHandle> DiscoveryReport<H> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Autodetect, then drop entries on a generic fallback port.
fn detect_candidates<D: Driver>(ctx: &DriverContext<D>) -> Result<Vec<DetectedCamera>> {
    let detected = ctx
        .driver()
        .autodetect()
        .map_err(|e| CameraError::driver("autodetect", e))?;

    let excluded = &ctx.config().discovery.excluded_ports;
    let candidates: Vec<DetectedCamera> = detected
        .into_iter()
        .filter(|camera| {
            let skip = excluded.iter().any(|port| port == &camera.port);
            if skip {
                log::debug!(
                    "Skipping generic port entry {} ({})",
                    camera.port,
                    camera.model
                );
            }
            !skip
        })
        .collect();

    log::info!("Detected {} camera(s)", candidates.len());
    Ok(candidates)
}

fn bind_candidate<D: Driver>(
    ctx: &DriverContext<D>,
    abilities: &AbilitiesCatalog,
    ports: &PortCatalog,
    camera: &DetectedCamera,
) -> Result<CameraSession<D::Handle>> {
    let ability = abilities.lookup_model(&camera.model)?;
    let port = ports.lookup_path(&camera.port)?;
    let handle = ctx
        .driver()
        .bind(ability, port)
        .map_err(|e| CameraError::driver("init camera", e))?;
    Ok(CameraSession::new(
        handle,
        camera.model.clone(),
        camera.port.clone(),
        ctx.config().clone(),
    ))
}

fn partial_failure(camera: &DetectedCamera, err: CameraError) -> CameraError {
    CameraError::DiscoveryPartialFailure {
        model: camera.model.clone(),
        port: camera.port.clone(),
        reason: err.to_string(),
    }
}

/// Open a session on every reachable camera.
///
/// Autodetection and catalog loading failures abort the listing. A candidate
/// that cannot be resolved or bound is skipped and reported.
pub fn list_available_cameras<D: Driver>(
    ctx: &DriverContext<D>,
) -> Result<DiscoveryReport<D::Handle>> {
    let candidates = detect_candidates(ctx)?;
    let abilities = ctx.ensure_abilities_loaded()?;
    let ports = ctx.ensure_ports_loaded()?;

    let mut report = DiscoveryReport {
        sessions: Vec::with_capacity(candidates.len()),
        failures: Vec::new(),
    };

    for camera in &candidates {
        match bind_candidate(ctx, &abilities, &ports, camera) {
            Ok(session) => report.sessions.push(session),
            Err(e) => {
                log::warn!(
                    "Skipping camera {} on {}: {}",
                    camera.model,
                    camera.port,
                    e
                );
                report.failures.push(partial_failure(camera, e));
            }
        }
    }

    log::info!(
        "Opened {} camera(s), {} failed",
        report.sessions.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Open the camera of `model` on `port`, without autodetection.
pub fn open_camera<D: Driver>(
    ctx: &DriverContext<D>,
    model: &str,
    port: &str,
) -> Result<CameraSession<D::Handle>> {
    let abilities = ctx.ensure_abilities_loaded()?;
    let ports = ctx.ensure_ports_loaded()?;
    bind_candidate(ctx, &abilities, &ports, &DetectedCamera::new(model, port))
}

/// Open the first detected camera that binds.
///
/// [`CameraError::NoDevices`] when nothing is detected; when every candidate
/// fails, the last failure is returned.
pub fn open_first_available<D: Driver>(ctx: &DriverContext<D>) -> Result<CameraSession<D::Handle>> {
    let candidates = detect_candidates(ctx)?;
    if candidates.is_empty() {
        return Err(CameraError::NoDevices);
    }
    let abilities = ctx.ensure_abilities_loaded()?;
    let ports = ctx.ensure_ports_loaded()?;

    let mut last_error = CameraError::NoDevices;
    for camera in &candidates {
        match bind_candidate(ctx, &abilities, &ports, camera) {
            Ok(session) => return Ok(session),
            Err(e) => {
                log::warn!(
                    "Skipping camera {} on {}: {}",
                    camera.model,
                    camera.port,
                    e
                );
                last_error = partial_failure(camera, e);
            }
        }
    }
    Err(last_error)
}
