//! Host options object → `SceneConfig` + `FilmGrainConfig`.
//!
//! Film grain keys accept a number (constant) or a zero-argument function
//! (called once per frame). Unknown keys are logged and skipped; values of the
//! wrong type leave the default in place.

use js_sys::{Function, Object, Reflect};
use starfield_core::glitch::FilmGrainConfig;
use starfield_core::scene::SceneConfig;
use starfield_core::Provider;
use wasm_bindgen::{JsCast, JsValue};

pub struct MountOptions {
    pub scene: SceneConfig,
    pub film: FilmGrainConfig,
}

fn film_slot<'a>(film: &'a mut FilmGrainConfig, key: &str) -> Option<&'a mut Provider> {
    Some(match key {
        "noiseIntensity" => &mut film.noise_intensity,
        "scanlineIntensity" => &mut film.scanline_intensity,
        "scanlineCount" => &mut film.scanline_count,
        "vignette" => &mut film.vignette,
        "chroma" => &mut film.chroma,
        "jitter" => &mut film.jitter,
        "glitchIntervalSeconds" => &mut film.glitch_interval_seconds,
        "glitchDurationSeconds" => &mut film.glitch_duration_seconds,
        "glitchStrength" => &mut film.glitch_strength,
        "glitchBandHeight" => &mut film.glitch_band_height,
        "glitchScrollSpeed" => &mut film.glitch_scroll_speed,
        _ => return None,
    })
}

/// Number → constant, function → dynamic. A function that throws or returns a
/// non-number yields NaN, which the provider turns into 0.
fn provider_from(value: &JsValue) -> Option<Provider> {
    if let Some(n) = value.as_f64() {
        return Some(Provider::constant(n as f32));
    }
    let f = value.dyn_ref::<Function>()?.clone();
    Some(Provider::dynamic(move || {
        f.call0(&JsValue::NULL)
            .ok()
            .and_then(|v| v.as_f64())
            .map_or(f32::NAN, |v| v as f32)
    }))
}

const SCENE_KEYS: [&str; 6] = [
    "starCount",
    "dustCount",
    "backgroundPlanets",
    "saturation",
    "contrast",
    "brightness",
];

fn apply_scene_key(scene: &mut SceneConfig, key: &str, n: f64) {
    match key {
        "starCount" => scene.star_count = n.max(0.0) as u32,
        "dustCount" => scene.dust_count = n.max(0.0) as u32,
        "backgroundPlanets" => scene.background_planets = n.max(0.0) as u32,
        "saturation" => scene.color_enhance.saturation = n as f32,
        "contrast" => scene.color_enhance.contrast = n as f32,
        "brightness" => scene.color_enhance.brightness = n as f32,
        _ => {}
    }
}

pub fn parse_options(options: &JsValue) -> MountOptions {
    let obj = options.dyn_ref::<Object>();
    let seed = obj
        .and_then(|o| Reflect::get(o, &JsValue::from_str("seed")).ok())
        .and_then(|v| v.as_f64())
        .map(|v| v.max(0.0) as u64)
        .unwrap_or_else(rand::random);

    let mut scene = SceneConfig {
        seed,
        ..SceneConfig::default()
    };
    let mut film = FilmGrainConfig::seeded(seed);

    let Some(obj) = obj else {
        return MountOptions { scene, film };
    };
    for key in Object::keys(obj).iter() {
        let Some(key) = key.as_string() else { continue };
        if key == "seed" {
            continue;
        }
        let value = match Reflect::get(obj, &JsValue::from_str(&key)) {
            Ok(v) => v,
            Err(_) => continue,
        };
        if let Some(slot) = film_slot(&mut film, &key) {
            match provider_from(&value) {
                Some(p) => *slot = p,
                None => log::warn!("[config] {} must be a number or function; using default", key),
            }
            continue;
        }
        if !SCENE_KEYS.contains(&key.as_str()) {
            log::warn!("[config] unknown option {}", key);
            continue;
        }
        match value.as_f64() {
            Some(n) => apply_scene_key(&mut scene, &key, n),
            None => log::warn!("[config] {} ignored (expected a number)", key),
        }
    }
    log::info!("[config] seed={} stars={} dust={}", seed, scene.star_count, scene.dust_count);
    MountOptions { scene, film }
}
