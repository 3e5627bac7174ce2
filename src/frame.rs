use crate::render::GpuState;
use starfield_core::scene::{SceneConfig, SceneObjects};
use starfield_core::{SimulationState, SurfaceLifecycle, Viewport};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub canvas: web::HtmlCanvasElement,
    pub sim: SimulationState,
    pub scene: Rc<SceneObjects>,
    pub scene_config: SceneConfig,
    pub gpu: Option<GpuState>,
    pub surface: SurfaceLifecycle,
    /// Set from the device-lost callback; consumed at the start of a frame.
    pub device_lost: Arc<AtomicBool>,
    pub closed: bool,
}

impl FrameContext {
    pub fn new(
        canvas: web::HtmlCanvasElement,
        sim: SimulationState,
        scene: Rc<SceneObjects>,
        scene_config: SceneConfig,
    ) -> Self {
        Self {
            canvas,
            sim,
            scene,
            scene_config,
            gpu: None,
            surface: SurfaceLifecycle::default(),
            device_lost: Arc::new(AtomicBool::new(false)),
            closed: false,
        }
    }

    /// One animation frame. The simulation keeps ticking while rendering is
    /// suspended so nothing jumps when the surface comes back.
    pub fn frame(&mut self, now_ms: f64) {
        if self.device_lost.swap(false, Ordering::SeqCst) {
            self.suspend();
        }
        let state = self.sim.tick(now_ms);
        if !self.surface.can_render() {
            return;
        }
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        match gpu.render(&state) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[surface] lost or outdated; reconfiguring");
                gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("[gpu] out of memory");
                self.suspend();
            }
            Err(e) => log::warn!("[gpu] frame skipped: {:?}", e),
        }
    }

    /// Camera aspect always follows; GPU targets only once they exist.
    pub fn resize(&mut self, viewport: Viewport) {
        self.sim.resize(viewport);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(viewport);
        }
    }

    pub fn suspend(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.release();
        }
        self.surface.lost();
    }

    pub fn close(&mut self) {
        self.closed = true;
        if let Some(gpu) = self.gpu.take() {
            gpu.release();
        }
    }
}

/// Create GPU resources unless they are already live. Used for the first
/// initialization and for host-driven recovery after a loss. Only one attempt
/// runs at a time; a second call made while one is pending returns an error.
pub async fn attach_gpu(ctx: &Rc<RefCell<FrameContext>>) -> anyhow::Result<()> {
    let (canvas, scene, scene_config, device_lost) = {
        let mut c = ctx.borrow_mut();
        if c.closed {
            anyhow::bail!("scene was torn down");
        }
        if c.surface.can_render() {
            return Ok(());
        }
        // refuses while another attempt is still awaiting the adapter
        c.surface.begin_init()?;
        c.device_lost = Arc::new(AtomicBool::new(false));
        (
            c.canvas.clone(),
            c.scene.clone(),
            c.scene_config.clone(),
            c.device_lost.clone(),
        )
    };
    // size may have changed while suspended
    let viewport = crate::dom::sync_canvas_backing_size(&canvas);
    let result = GpuState::new(&canvas, viewport, &scene, &scene_config, device_lost).await;

    let mut c = ctx.borrow_mut();
    match result {
        Ok(gpu) if c.closed => {
            gpu.release();
            c.surface.failed();
            anyhow::bail!("scene was torn down during initialization")
        }
        Ok(gpu) => {
            c.sim.resize(viewport);
            c.gpu = Some(gpu);
            c.surface.activated()?;
            Ok(())
        }
        Err(e) => {
            c.surface.failed();
            Err(e)
        }
    }
}

type TickClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct LoopHandle {
    running: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
    tick: TickClosure,
}

impl LoopHandle {
    /// Cancel the pending frame and drop the closure (breaking its self-reference).
    pub fn stop(&self) {
        self.running.set(false);
        if let (Some(id), Some(w)) = (self.raf_id.take(), web::window()) {
            _ = w.cancel_animation_frame(id);
        }
        self.tick.borrow_mut().take();
    }
}

fn request_frame(tick: &TickClosure) -> Option<i32> {
    let window = web::window()?;
    let tick = tick.borrow();
    let callback = tick.as_ref()?;
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) -> LoopHandle {
    let tick: TickClosure = Rc::new(RefCell::new(None));
    let running = Rc::new(Cell::new(true));
    let raf_id = Rc::new(Cell::new(None));

    let tick_clone = tick.clone();
    let running_tick = running.clone();
    let raf_tick = raf_id.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
        if !running_tick.get() {
            return;
        }
        frame_ctx.borrow_mut().frame(now_ms);
        raf_tick.set(request_frame(&tick_clone));
    }) as Box<dyn FnMut(f64)>));
    raf_id.set(request_frame(&tick));

    LoopHandle {
        running,
        raf_id,
        tick,
    }
}
