#![cfg(target_arch = "wasm32")]
//! Browser front-end: mounts the starfield scene on a canvas and drives it
//! from `requestAnimationFrame`.

use starfield_core::scene::SceneObjects;
use starfield_core::SimulationState;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

mod config;
mod dom;
mod events;
mod frame;
mod render;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("starfield-web starting");
    Ok(())
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:?}", e))
}

/// Live scene returned by [`mount`]. Dropping it without `teardown` leaves the
/// loop running.
#[wasm_bindgen]
pub struct SceneHandle {
    ctx: Rc<RefCell<frame::FrameContext>>,
    listeners: events::ListenerRegistry,
    frame_loop: Option<frame::LoopHandle>,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Stop the loop, remove every listener and free GPU resources. Idempotent.
    pub fn teardown(&mut self) {
        let Some(frame_loop) = self.frame_loop.take() else {
            return;
        };
        frame_loop.stop();
        self.listeners.remove_all();
        self.ctx.borrow_mut().close();
        log::info!("[teardown] scene stopped");
    }

    /// Rebuild GPU resources after a device or surface loss.
    pub fn recover(&self) -> js_sys::Promise {
        let ctx = self.ctx.clone();
        future_to_promise(async move {
            frame::attach_gpu(&ctx).await.map_err(to_js)?;
            Ok(JsValue::TRUE)
        })
    }

    #[wasm_bindgen(js_name = isSuspended)]
    pub fn is_suspended(&self) -> bool {
        self.ctx.borrow().surface.needs_recovery()
    }
}

/// Mount the scene on `<canvas id=canvas_id>`. A missing WebGPU adapter is not
/// fatal: the handle reports `isSuspended()` and the host may call `recover`.
#[wasm_bindgen]
pub async fn mount(canvas_id: String, options: JsValue) -> Result<SceneHandle, JsValue> {
    mount_scene(&canvas_id, &options).await.map_err(to_js)
}

async fn mount_scene(canvas_id: &str, options: &JsValue) -> anyhow::Result<SceneHandle> {
    let canvas = dom::find_canvas(canvas_id)?;
    let viewport = dom::sync_canvas_backing_size(&canvas);
    let config::MountOptions {
        scene: scene_config,
        film,
    } = config::parse_options(options);

    let scene = Rc::new(SceneObjects::generate(&scene_config)?);
    let sim = SimulationState::new(instant::now(), scene_config.seed, film, viewport);
    let ctx = Rc::new(RefCell::new(frame::FrameContext::new(
        canvas.clone(),
        sim,
        scene,
        scene_config,
    )));

    let mut listeners = events::ListenerRegistry::default();
    events::wire_input(&mut listeners, &canvas, &ctx);
    events::wire_resize(&mut listeners, &canvas, &ctx);

    if let Err(e) = frame::attach_gpu(&ctx).await {
        log::error!("[gpu] WebGPU init error: {:?}", e);
    }
    let frame_loop = frame::start_loop(ctx.clone());
    log::info!("[scene] mounted on #{}", canvas_id);

    Ok(SceneHandle {
        ctx,
        listeners,
        frame_loop: Some(frame_loop),
    })
}
