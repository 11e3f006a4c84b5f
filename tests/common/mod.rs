#![allow(dead_code)]

use page_studio::project::project_model::{Page, State, StateVersion, StateVersions};
use page_studio::recording::recording_model::{DeviceArtifacts, RecordingEntry};
use serde_json::{Value, json};

pub const LOGIN_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><hierarchy><layout><button text="Login" id="login"/><button text="Cancel"/><label text="Welcome"/></layout></hierarchy>"#;

pub fn page(id: &str, name: &str, module: &str) -> Page {
    Page {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        module: module.into(),
        states: Vec::new(),
        ai_analysis: None,
    }
}

pub fn android_session() -> Value {
    json!({ "platformName": "Android", "deviceName": "emulator-5554" })
}

pub fn version(page_source: &str, screenshot: &str) -> StateVersion {
    StateVersion {
        screen_shot: screenshot.into(),
        page_source: page_source.into(),
        context_name: "NATIVE_APP".into(),
        session_details: android_session(),
        time_stamp: "2026-01-01T00:00:00.000Z".into(),
    }
}

/// Page with a single default state captured on Android.
pub fn captured_page(id: &str, page_source: &str) -> Page {
    let mut p = page(id, "Login", "Auth");
    p.states.push(State {
        id: "s1".into(),
        title: "Empty form".into(),
        description: String::new(),
        is_default: true,
        versions: StateVersions {
            ios: None,
            android: Some(version(page_source, "iVBOR")),
        },
    });
    p
}

pub fn entry(xml: &str, shot: &str) -> RecordingEntry {
    entry_at(0, xml, shot)
}

pub fn entry_at(action_time: i64, xml: &str, shot: &str) -> RecordingEntry {
    RecordingEntry {
        action_time,
        action: json!({ "action": "tap" }),
        device_artifacts: DeviceArtifacts {
            session_details: android_session(),
            screenshot_base64: shot.into(),
            page_source: xml.into(),
            current_context: "NATIVE_APP".into(),
        },
        is_condensed: None,
    }
}
