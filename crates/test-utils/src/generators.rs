//! Synthetic wind fields.
//!
//! All grids are row-major (row 0 first) with values in m/s.

/// A cyclonic vortex around the grid centre: returns `(u, v)` with speed
/// growing linearly to `max_speed` at the corners.
pub fn create_vortex(width: usize, height: usize, max_speed: f32) -> (Vec<f32>, Vec<f32>) {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);

    let mut u = Vec::with_capacity(width * height);
    let mut v = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            // Row index grows southward, so flip dy to point north
            let dx = col as f32 - cx;
            let dy = cy - row as f32;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist == 0.0 {
                u.push(0.0);
                v.push(0.0);
                continue;
            }
            let speed = dist / max_dist * max_speed;
            // Counter-clockwise tangent
            u.push(-dy / dist * speed);
            v.push(dx / dist * speed);
        }
    }
    (u, v)
}
