//! Browser bridge: the SVG heatmap page forwards pointer events here and
//! applies the returned render commands to its DOM.

use std::sync::{Mutex, MutexGuard};

use heatmap_cat_core::{
    ClickOutcome, Grid, HeatmapSelector, Navigator, SelectionError, TimeRange,
};
use heatmap_cat_protocol::RenderCommand;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The page submits its own range form; the navigator keeps the last
/// committed range for it to read back through [`last_range`].
#[derive(Debug, Default)]
struct FormNavigator {
    last: Option<TimeRange>,
}

impl Navigator for FormNavigator {
    fn navigate(&mut self, range: TimeRange) {
        self.last = Some(range);
    }
}

type Session = HeatmapSelector<FormNavigator>;

static SESSIONS: Mutex<Vec<Session>> = Mutex::new(Vec::new());

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Ignored,
    Started { start: String },
    Committed { start: String, end: String },
}

/// Everything one event produced. `error` is set for user-facing problems
/// such as a reversed range; the commands still have to be applied.
#[derive(Debug, Serialize)]
struct Response {
    commands: Vec<RenderCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    fn drain(session: &mut Session) -> Self {
        Self {
            commands: session.take_commands(),
            outcome: None,
            error: None,
        }
    }
}

fn sessions() -> Result<MutexGuard<'static, Vec<Session>>, String> {
    SESSIONS.lock().map_err(|_| "session registry poisoned".to_string())
}

fn with_session(
    handle: usize,
    f: impl FnOnce(&mut Session) -> Result<Response, SelectionError>,
) -> Result<Response, String> {
    let mut sessions = sessions()?;
    let session = sessions
        .get_mut(handle)
        .ok_or_else(|| "invalid session handle".to_string())?;
    match f(&mut *session) {
        Ok(response) => Ok(response),
        Err(err) => Ok(Response {
            error: Some(err.to_string()),
            ..Response::drain(session)
        }),
    }
}

fn create(grid_json: &str) -> Result<usize, String> {
    let grid = Grid::from_json(grid_json.as_bytes()).map_err(|e| e.to_string())?;
    let session =
        HeatmapSelector::new(grid, FormNavigator::default()).map_err(|e| e.to_string())?;
    let mut sessions = sessions()?;
    sessions.push(session);
    Ok(sessions.len() - 1)
}

fn click_inner(handle: usize, id: &str, details: Option<&str>) -> Result<Response, String> {
    with_session(handle, |session| {
        let outcome = match session.on_click(id, details)? {
            ClickOutcome::Ignored => Outcome::Ignored,
            ClickOutcome::Started(start) => Outcome::Started {
                start: start.to_string(),
            },
            ClickOutcome::Committed(range) => Outcome::Committed {
                start: range.start.to_string(),
                end: range.end.to_string(),
            },
        };
        Ok(Response {
            outcome: Some(outcome),
            ..Response::drain(session)
        })
    })
}

fn last_range_inner(handle: usize) -> Result<Option<String>, String> {
    let sessions = sessions()?;
    let session = sessions
        .get(handle)
        .ok_or_else(|| "invalid session handle".to_string())?;
    Ok(session.navigator().last.map(|range| range.to_string()))
}

fn to_json(response: Result<Response, String>) -> Result<String, JsError> {
    let response = response.map_err(|e| JsError::new(&e))?;
    serde_json::to_string(&response).map_err(|e| JsError::new(&e.to_string()))
}

/// Index a rendered heatmap. Returns a handle for the event functions.
#[wasm_bindgen]
pub fn create_session(grid_json: &str) -> Result<usize, JsError> {
    create(grid_json).map_err(|e| JsError::new(&e))
}

#[wasm_bindgen]
pub fn hover(handle: usize, id: &str) -> Result<String, JsError> {
    to_json(with_session(handle, |session| {
        session.on_hover(id)?;
        Ok(Response::drain(session))
    }))
}

#[wasm_bindgen]
pub fn hover_exit(handle: usize) -> Result<String, JsError> {
    to_json(with_session(handle, |session| {
        session.on_hover_exit();
        Ok(Response::drain(session))
    }))
}

/// `details` is the text of the page's details element for the cell.
#[wasm_bindgen]
pub fn click(handle: usize, id: &str, details: Option<String>) -> Result<String, JsError> {
    to_json(click_inner(handle, id, details.as_deref()))
}

/// Most recently committed range as `"<start> <end>"`, for the page's
/// range form. `undefined` until a selection has been committed.
#[wasm_bindgen]
pub fn last_range(handle: usize) -> Result<Option<String>, JsError> {
    last_range_inner(handle).map_err(|e| JsError::new(&e))
}

#[wasm_bindgen]
pub fn reset(handle: usize) -> Result<String, JsError> {
    to_json(with_session(handle, |session| {
        session.reset();
        Ok(Response::drain(session))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"{
        "cells": [
            {"id": "bkg", "x": 0, "y": 0, "width": 100, "height": 100,
             "fill": {"color": {"r": 255, "g": 255, "b": 255}}},
            {"id": "a", "x": 10, "y": 50, "width": 8, "height": 8,
             "fill": {"color": {"r": 255, "g": 231, "b": 212}},
             "details": "time 14s, range 342-361ms, count: 2, colpct: 0%"},
            {"id": "b", "x": 30, "y": 20, "width": 8, "height": 8,
             "fill": {"color": {"r": 255, "g": 231, "b": 212}},
             "details": "time 9s, range 0-19ms, count: 1, colpct: 0%"}
        ]
    }"#;

    #[test]
    fn reversed_range_reports_error_with_reset_commands() {
        let Ok(handle) = create(GRID) else {
            unreachable!("valid grid");
        };
        let started = click_inner(handle, "a", None);
        assert!(matches!(
            started.as_ref().map(|r| r.outcome.as_ref()),
            Ok(Some(Outcome::Started { start })) if start == "14.342"
        ));

        let rejected = click_inner(handle, "b", None);
        let Ok(rejected) = rejected else {
            unreachable!("handle is valid");
        };
        assert!(rejected.outcome.is_none());
        assert!(rejected.error.is_some());
        // The start cell's fill is restored.
        assert!(!rejected.commands.is_empty());
    }

    #[test]
    fn committed_range_is_kept_for_the_form() {
        let Ok(handle) = create(GRID) else {
            unreachable!("valid grid");
        };
        assert_eq!(last_range_inner(handle), Ok(None));
        let _ = click_inner(handle, "b", None);
        let committed = click_inner(handle, "a", None);
        assert!(matches!(
            committed.as_ref().map(|r| r.outcome.as_ref()),
            Ok(Some(Outcome::Committed { start, end })) if start == "9.000" && end == "14.361"
        ));
        assert_eq!(last_range_inner(handle), Ok(Some("9.000 14.361".to_string())));
    }

    #[test]
    fn bad_handle_and_bad_grid_are_hard_errors() {
        assert!(click_inner(usize::MAX, "a", None).is_err());
        assert!(last_range_inner(usize::MAX).is_err());
        assert!(create("{").is_err());
        assert!(create(r#"{"cells": []}"#).is_err());
    }
}
