/// stowview web bindings
///
/// Exposes the stowage plan to a browser page. Rendering stays with the
/// page's 3D engine: it reads `instances_json()` to build one box per
/// container and receives visual state changes through a callback.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_net::http::Request;
use serde::Serialize;
use stowview_core::{
    ContainerSize, PlacedContainer, SearchCriteria, StowagePlan, StructuralLayout, VisualSink,
    VisualState,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// One box for the page's scene graph
#[derive(Debug, Serialize)]
struct RenderInstance<'a> {
    index: usize,
    id: &'a str,
    bay: u32,
    row: u32,
    tier: u32,
    size: ContainerSize,
    below_deck: bool,
    position: [f32; 3],
    dimensions: [f32; 3],
    color: String,
    opacity: f32,
    translucent: bool,
    state: VisualState,
}

impl<'a> RenderInstance<'a> {
    fn new(index: usize, container: &'a PlacedContainer) -> Self {
        let treatment = container.treatment();
        let record = &container.record;
        let (p, d) = (container.position, container.dimensions());
        Self {
            index,
            id: &record.id,
            bay: record.bay,
            row: record.row,
            tier: record.tier,
            size: record.size,
            below_deck: container.below_deck,
            position: [p.x, p.y, p.z],
            dimensions: [d.x, d.y, d.z],
            color: css_color(treatment.color),
            opacity: treatment.opacity,
            translucent: treatment.is_translucent(),
            state: container.state,
        }
    }
}

fn css_color(color: stowview_core::Color) -> String {
    format!("#{:06x}", color.to_hex())
}

fn render_instances(containers: &[PlacedContainer]) -> Vec<RenderInstance<'_>> {
    containers
        .iter()
        .enumerate()
        .map(|(index, container)| RenderInstance::new(index, container))
        .collect()
}

/// One visual state change, held until the plan is no longer borrowed
#[derive(Debug, Clone, PartialEq)]
struct VisualUpdate {
    index: usize,
    color: String,
    opacity: f32,
    state: VisualState,
}

/// Sink that queues changes for `StowageViewer::notify`
#[derive(Debug, Default)]
struct PendingUpdates(Vec<VisualUpdate>);

impl VisualSink for PendingUpdates {
    fn set_visual_state(&mut self, index: usize, container: &PlacedContainer, state: VisualState) {
        let treatment = container.treatment();
        self.0.push(VisualUpdate {
            index,
            color: css_color(treatment.color),
            opacity: treatment.opacity,
            state,
        });
    }
}

fn state_name(state: VisualState) -> &'static str {
    match state {
        VisualState::Normal => "normal",
        VisualState::Highlighted => "highlighted",
        VisualState::Dimmed => "dimmed",
    }
}

fn alert(message: &str) {
    log::error!("{}", message);
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info)
        .map_err(|e| JsValue::from_str(&format!("Failed to init logger: {}", e)))?;
    Ok(())
}

#[wasm_bindgen]
pub struct StowageViewer {
    plan: Rc<RefCell<StowagePlan>>,
    on_visual_state: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl StowageViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> StowageViewer {
        StowageViewer {
            plan: Rc::new(RefCell::new(StowagePlan::new())),
            on_visual_state: None,
        }
    }

    /// Register `(index, color, opacity, state) => void`, called for every
    /// container whose display changes on search or reset
    pub fn set_visual_state_callback(&mut self, callback: js_sys::Function) {
        self.on_visual_state = Some(callback);
    }

    /// Fetch and parse the structural layout. Resolves once loaded; on
    /// failure shows an alert, rejects, and leaves the viewer unable to place
    /// containers until the page is reloaded.
    pub fn load_layout(&self, url: String) -> js_sys::Promise {
        let plan = Rc::clone(&self.plan);
        future_to_promise(async move {
            match fetch_text(&url).await {
                Ok(text) => {
                    let result = plan
                        .borrow_mut()
                        .set_layout(StructuralLayout::from_json(&text));
                    result.map_err(|err| {
                        alert(&format!("Failed to load ship layout: {err}"));
                        to_js(err)
                    })?;
                }
                Err(err) => {
                    let reason = format!("{url}: {}", err.as_string().unwrap_or_default());
                    plan.borrow_mut().fail_layout(reason.clone());
                    alert(&format!("Failed to load ship layout: {reason}"));
                    return Err(err);
                }
            }
            Ok(JsValue::TRUE)
        })
    }

    pub fn layout_ready(&self) -> bool {
        self.plan.borrow().layout().is_some()
    }

    /// Replace the displayed containers with a manifest (JSON or CSV text).
    /// Returns the placement summary as JSON. On failure shows an alert and
    /// keeps the current containers.
    pub fn load_manifest(&self, text: &str) -> Result<String, JsValue> {
        let summary = self.plan.borrow_mut().load_manifest(text).map_err(|err| {
            alert(&format!("Failed to load manifest: {err}"));
            to_js(err)
        })?;
        serde_json::to_string(&summary).map_err(to_js)
    }

    /// Highlight containers matching the input fields; blank fields match
    /// anything. Returns the number of matches.
    pub fn search(
        &self,
        id: &str,
        bay: &str,
        row: &str,
        tier: &str,
        size: &str,
    ) -> Result<usize, JsValue> {
        let criteria = SearchCriteria::from_inputs(id, bay, row, tier, size).map_err(to_js)?;
        let mut pending = PendingUpdates::default();
        let outcome = self.plan.borrow_mut().search(criteria, &mut pending);
        self.notify(pending.0);
        Ok(outcome.matched)
    }

    pub fn reset(&self) {
        let mut pending = PendingUpdates::default();
        self.plan.borrow_mut().reset(&mut pending);
        self.notify(pending.0);
    }

    /// Every placed container with position, size and current color
    pub fn instances_json(&self) -> Result<String, JsValue> {
        let plan = self.plan.borrow();
        serde_json::to_string(&render_instances(plan.containers())).map_err(to_js)
    }

    /// `[min_x, min_y, min_z, max_x, max_y, max_z]` of the placed containers, empty when none
    pub fn bounds(&self) -> Vec<f32> {
        match self.plan.borrow().bounds() {
            Some((min, max)) => vec![min.x, min.y, min.z, max.x, max.y, max.z],
            None => Vec::new(),
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.plan.borrow().skipped().len()
    }
}

impl StowageViewer {
    /// Hand the collected changes to the page. The plan must not be borrowed
    /// here: the callback may call back into the viewer.
    fn notify(&self, updates: Vec<VisualUpdate>) {
        let Some(callback) = &self.on_visual_state else {
            return;
        };
        for update in updates {
            let args = js_sys::Array::of4(
                &JsValue::from(update.index as u32),
                &JsValue::from_str(&update.color),
                &JsValue::from(update.opacity),
                &JsValue::from_str(state_name(update.state)),
            );
            if let Err(err) = callback.apply(&JsValue::NULL, &args) {
                log::warn!("visual state callback failed: {:?}", err);
            }
        }
    }
}

impl Default for StowageViewer {
    fn default() -> Self {
        Self::new()
    }
}

async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let resp = Request::get(url).send().await.map_err(to_js)?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
    }
    resp.text().await.map_err(to_js)
}
