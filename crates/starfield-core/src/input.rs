/// Input the web layer forwards to the simulation.
///
/// Coordinates are CSS pixels relative to the page; only deltas matter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// `touches` is the number of active touch points; only one is honored.
    TouchStart { touches: u32, x: f32, y: f32 },
    TouchMove { touches: u32, x: f32, y: f32 },
    TouchEnd,
    Wheel { delta_y: f32 },
}
