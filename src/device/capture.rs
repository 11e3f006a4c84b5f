use crate::device::driver::DeviceDriver;
use crate::error::StudioError;
use crate::project::project_model::{Platform, Project, StateVersion, now_timestamp};
use crate::recording::recording_model::DeviceArtifacts;

/// Pull screenshot, source, context and session from the driver. Any failed
/// call aborts the capture.
pub fn capture_artifacts(driver: &mut dyn DeviceDriver) -> Result<DeviceArtifacts, StudioError> {
    let screenshot_base64 = driver.take_screenshot()?;
    let page_source = driver.get_page_source()?;
    let current_context = driver.get_context()?;
    let session_details = driver.get_session()?;

    Ok(DeviceArtifacts {
        session_details,
        screenshot_base64,
        page_source,
        current_context,
    })
}

/// Capture a state version and the platform it belongs to.
pub fn capture_version(
    driver: &mut dyn DeviceDriver,
) -> Result<(Platform, StateVersion), StudioError> {
    let artifacts = capture_artifacts(driver)?;
    let platform = Platform::from_session(&artifacts.session_details).ok_or_else(|| {
        StudioError::Device {
            call: "getSession",
            message: "session has no recognizable platformName".to_string(),
        }
    })?;

    Ok((
        platform,
        StateVersion {
            screen_shot: artifacts.screenshot_base64,
            page_source: artifacts.page_source,
            context_name: artifacts.current_context,
            session_details: artifacts.session_details,
            time_stamp: now_timestamp(),
        },
    ))
}

/// Capture the device screen into a state of a page, replacing the version
/// for the device's platform. The project is untouched if capture fails.
pub fn capture_into_state(
    project: &mut Project,
    driver: &mut dyn DeviceDriver,
    page_id: &str,
    state_id: &str,
) -> Result<Platform, StudioError> {
    if project.page(page_id).and_then(|p| p.state(state_id)).is_none() {
        return Err(match project.page(page_id) {
            None => StudioError::PageNotFound(page_id.to_string()),
            Some(_) => StudioError::StateNotFound {
                page: page_id.to_string(),
                state: state_id.to_string(),
            },
        });
    }

    let (platform, version) = capture_version(driver)?;
    project.capture_state_version(page_id, state_id, platform, version)?;
    Ok(platform)
}
