//! Icon generation for the system tray.

/// Icon size in pixels.
pub const ICON_SIZE: u32 = 32;

/// Tray icon while a default playback device exists.
#[cfg(windows)]
pub fn create_active_icon() -> Result<tray_icon::Icon, String> {
    let rgba = generate_speaker_icon(true);
    tray_icon::Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).map_err(|e| e.to_string())
}

/// Tray icon while no playback device is available.
#[cfg(windows)]
pub fn create_idle_icon() -> Result<tray_icon::Icon, String> {
    let rgba = generate_speaker_icon(false);
    tray_icon::Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).map_err(|e| e.to_string())
}

/// Generate a speaker icon as RGBA data.
pub fn generate_speaker_icon(active: bool) -> Vec<u8> {
    let size = ICON_SIZE as usize;
    let mut rgba = vec![0u8; size * size * 4];

    let center = size as f32 / 2.0;
    let radius = size as f32 / 2.0 - 1.0;

    let (r, g, b) = if active {
        (40u8, 110u8, 200u8) // Blue while a device is active
    } else {
        (120u8, 120u8, 120u8) // Gray when there is nothing to play on
    };

    // Filled circle with an anti-aliased rim
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let dist = (dx * dx + dy * dy).sqrt();

            let alpha = if dist < radius {
                255
            } else if dist < radius + 1.0 {
                ((radius + 1.0 - dist) * 255.0) as u8
            } else {
                continue;
            };
            put(&mut rgba, size, x, y, [r, g, b, alpha]);
        }
    }

    draw_speaker_shape(&mut rgba, size);

    if active {
        draw_sound_waves(&mut rgba, size);
    }

    rgba
}

fn put(rgba: &mut [u8], size: usize, x: usize, y: usize, color: [u8; 4]) {
    if x < size && y < size {
        let idx = (y * size + x) * 4;
        rgba[idx..idx + 4].copy_from_slice(&color);
    }
}

/// Speaker box plus a cone widening to the right.
fn draw_speaker_shape(rgba: &mut [u8], size: usize) {
    const WHITE: [u8; 4] = [255, 255, 255, 255];
    let mid = size / 2;

    // Box
    for y in (mid - 3)..(mid + 3) {
        for x in 8..12 {
            put(rgba, size, x, y, WHITE);
        }
    }

    // Cone: half-height grows by one pixel per column
    for (step, x) in (12..18).enumerate() {
        let half = 3 + step;
        for y in (mid - half)..(mid + half) {
            put(rgba, size, x, y, WHITE);
        }
    }
}

/// Two arcs to the right of the cone.
fn draw_sound_waves(rgba: &mut [u8], size: usize) {
    const WHITE: [u8; 4] = [255, 255, 255, 255];
    let origin_x = 17.0f32;
    let origin_y = size as f32 / 2.0;

    for wave_radius in [5.0f32, 9.0] {
        for y in 0..size {
            for x in 18..size {
                let dx = x as f32 + 0.5 - origin_x;
                let dy = y as f32 + 0.5 - origin_y;
                let dist = (dx * dx + dy * dy).sqrt();
                // Keep the arc within ±45° of horizontal
                if (dist - wave_radius).abs() < 0.8 && dy.abs() <= dx {
                    put(rgba, size, x, y, WHITE);
                }
            }
        }
    }
}
