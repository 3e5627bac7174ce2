//! DOM listener wiring. Every listener goes through [`ListenerRegistry`] so
//! teardown can remove them all.

use crate::dom;
use crate::frame::FrameContext;
use starfield_core::InputEvent;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Handler = Closure<dyn FnMut(web::Event)>;

#[derive(Default)]
pub struct ListenerRegistry {
    entries: Vec<(web::EventTarget, &'static str, Handler)>,
}

impl ListenerRegistry {
    /// `passive: false` lets the handler call `preventDefault` on touch/wheel.
    pub fn add(
        &mut self,
        target: &web::EventTarget,
        name: &'static str,
        passive: Option<bool>,
        handler: impl FnMut(web::Event) + 'static,
    ) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let result = match passive {
            Some(p) => {
                let opts = web::AddEventListenerOptions::new();
                opts.set_passive(p);
                target.add_event_listener_with_callback_and_add_event_listener_options(
                    name,
                    closure.as_ref().unchecked_ref(),
                    &opts,
                )
            }
            None => target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref()),
        };
        if let Err(e) = result {
            log::warn!("failed to add {} listener: {:?}", name, e);
            return;
        }
        self.entries.push((target.clone(), name, closure));
    }

    pub fn remove_all(&mut self) {
        let count = self.entries.len();
        for (target, name, closure) in self.entries.drain(..) {
            _ = target.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
        if count > 0 {
            log::info!("[teardown] removed {} listeners", count);
        }
    }
}

/// Client position of the first touch, with the active touch count.
fn first_touch(ev: &web::TouchEvent) -> (u32, f32, f32) {
    let touches = ev.touches();
    match touches.get(0) {
        Some(t) => (touches.length(), t.client_x() as f32, t.client_y() as f32),
        None => (touches.length(), 0.0, 0.0),
    }
}

fn forward(
    registry: &mut ListenerRegistry,
    target: &web::EventTarget,
    name: &'static str,
    passive: Option<bool>,
    ctx: &Rc<RefCell<FrameContext>>,
    map: impl Fn(&web::Event) -> Option<InputEvent> + 'static,
) {
    let ctx = ctx.clone();
    registry.add(target, name, passive, move |ev| {
        if let Some(input) = map(&ev) {
            ctx.borrow_mut().sim.handle_input(input);
        }
    });
}

pub fn wire_input(
    registry: &mut ListenerRegistry,
    canvas: &web::HtmlCanvasElement,
    ctx: &Rc<RefCell<FrameContext>>,
) {
    let target: &web::EventTarget = canvas.as_ref();

    forward(registry, target, "mousedown", None, ctx, |ev| {
        let m = ev.dyn_ref::<web::MouseEvent>()?;
        Some(InputEvent::PointerDown {
            x: m.client_x() as f32,
            y: m.client_y() as f32,
        })
    });
    forward(registry, target, "mousemove", None, ctx, |ev| {
        let m = ev.dyn_ref::<web::MouseEvent>()?;
        Some(InputEvent::PointerMove {
            x: m.client_x() as f32,
            y: m.client_y() as f32,
        })
    });
    forward(registry, target, "mouseup", None, ctx, |_| {
        Some(InputEvent::PointerUp)
    });

    forward(registry, target, "wheel", Some(false), ctx, |ev| {
        let w = ev.dyn_ref::<web::WheelEvent>()?;
        ev.prevent_default();
        Some(InputEvent::Wheel {
            delta_y: w.delta_y() as f32,
        })
    });

    forward(registry, target, "touchstart", Some(false), ctx, |ev| {
        let t = ev.dyn_ref::<web::TouchEvent>()?;
        let (touches, x, y) = first_touch(t);
        Some(InputEvent::TouchStart { touches, x, y })
    });
    forward(registry, target, "touchmove", Some(false), ctx, |ev| {
        let t = ev.dyn_ref::<web::TouchEvent>()?;
        ev.prevent_default();
        let (touches, x, y) = first_touch(t);
        Some(InputEvent::TouchMove { touches, x, y })
    });
    forward(registry, target, "touchend", None, ctx, |_| {
        Some(InputEvent::TouchEnd)
    });
}

pub fn wire_resize(
    registry: &mut ListenerRegistry,
    canvas: &web::HtmlCanvasElement,
    ctx: &Rc<RefCell<FrameContext>>,
) {
    let Some(window) = web::window() else {
        return;
    };
    let canvas = canvas.clone();
    let ctx = ctx.clone();
    registry.add(window.as_ref(), "resize", None, move |_| {
        let viewport = dom::sync_canvas_backing_size(&canvas);
        log::debug!("[resize] {}x{}", viewport.width, viewport.height);
        ctx.borrow_mut().resize(viewport);
    });
}
