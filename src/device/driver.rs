use serde_json::Value;

use crate::error::StudioError;

/// Connection to a device automation session.
///
/// Implemented by whatever talks to the device; the studio only reads from
/// it.
pub trait DeviceDriver {
    /// Current screen as a base64-encoded PNG.
    fn take_screenshot(&mut self) -> Result<String, StudioError>;

    /// Current UI hierarchy as XML.
    fn get_page_source(&mut self) -> Result<String, StudioError>;

    /// Active context name, e.g. `NATIVE_APP` or `WEBVIEW_1`.
    fn get_context(&mut self) -> Result<String, StudioError>;

    /// Session details / capabilities.
    fn get_session(&mut self) -> Result<Value, StudioError>;
}

// ============================================================================
// Static driver: replays fixed artifacts
// ============================================================================

/// Driver that serves artifacts from memory. Each call to `push_screen`
/// queues the next screen; once the queue is down to one screen it keeps
/// returning it.
#[derive(Debug, Clone, Default)]
pub struct StaticDriver {
    screens: std::collections::VecDeque<(String, String)>,
    pub context: String,
    pub session: Value,
    /// When set, every call fails with this message
    pub fail_with: Option<String>,
}

impl StaticDriver {
    pub fn new(session: Value) -> Self {
        Self {
            screens: Default::default(),
            context: "NATIVE_APP".to_string(),
            session,
            fail_with: None,
        }
    }

    pub fn push_screen(&mut self, page_source: &str, screenshot: &str) {
        self.screens
            .push_back((page_source.to_string(), screenshot.to_string()));
    }

    /// Move to the next queued screen, keeping the last one.
    pub fn advance(&mut self) {
        if self.screens.len() > 1 {
            self.screens.pop_front();
        }
    }

    fn check(&self, call: &'static str) -> Result<(), StudioError> {
        match &self.fail_with {
            Some(message) => Err(StudioError::Device {
                call,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn current(&self, call: &'static str) -> Result<&(String, String), StudioError> {
        self.check(call)?;
        self.screens.front().ok_or_else(|| StudioError::Device {
            call,
            message: "no screen loaded".to_string(),
        })
    }
}

impl DeviceDriver for StaticDriver {
    fn take_screenshot(&mut self) -> Result<String, StudioError> {
        Ok(self.current("takeScreenshot")?.1.clone())
    }

    fn get_page_source(&mut self) -> Result<String, StudioError> {
        Ok(self.current("getPageSource")?.0.clone())
    }

    fn get_context(&mut self) -> Result<String, StudioError> {
        self.check("getContext")?;
        Ok(self.context.clone())
    }

    fn get_session(&mut self) -> Result<Value, StudioError> {
        self.check("getSession")?;
        Ok(self.session.clone())
    }
}
