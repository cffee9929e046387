//! Pointer-reactive particle field drawn behind the page.
//!
//! Coordinates are braille sub-pixels: a terminal of `cols x rows` cells is a
//! `cols*2 x rows*4` field. Time is measured in 60 Hz frames, so `step(1.0)`
//! is one display refresh.

use crate::canvas::PixelCanvas;
use crate::theme::Rgb;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::TAU;

/// Largest step accepted by [`ParticleField::step`]. Long stalls (suspend,
/// debugger) would otherwise fling particles across the field.
pub(crate) const MAX_DT: f32 = 4.0;

#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldConfig {
    pub(crate) friction: f32,
    pub(crate) spring: f32,
    pub(crate) restitution: f32,

    pub(crate) interaction_radius: f32,
    pub(crate) hover_strength: f32,
    pub(crate) press_strength: f32,

    pub(crate) ripple_radius: f32,
    pub(crate) ripple_strength: f32,

    pub(crate) connection_radius: f32,
    pub(crate) max_particles: usize,
    pub(crate) initial_speed: f32,
    pub(crate) min_size: f32,
    pub(crate) max_size: f32,

    pub(crate) trail_fade: f32,
    pub(crate) glow_radius: f32,
    pub(crate) min_alpha: f32,
    pub(crate) pulse_speed: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            friction: 0.99,
            spring: 0.01,
            restitution: 0.9,

            interaction_radius: 40.0,
            hover_strength: 0.0004,
            press_strength: 0.0032,

            ripple_radius: 30.0,
            ripple_strength: 2.0,

            connection_radius: 22.0,
            max_particles: 150,
            initial_speed: 0.5,
            min_size: 0.5,
            max_size: 1.5,

            trail_fade: 0.3,
            glow_radius: 80.0,
            min_alpha: 0.45,
            pulse_speed: 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Particle {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) origin_x: f32,
    pub(crate) origin_y: f32,
    pub(crate) size: f32,
    pub(crate) phase: f32,
}

impl Particle {
    fn spawn(rng: &mut StdRng, w: f32, h: f32, c: &FieldConfig) -> Self {
        let x = rng.gen::<f32>() * w;
        let y = rng.gen::<f32>() * h;
        Particle {
            x,
            y,
            vx: (rng.gen::<f32>() - 0.5) * c.initial_speed,
            vy: (rng.gen::<f32>() - 0.5) * c.initial_speed,
            origin_x: x,
            origin_y: y,
            size: c.min_size + rng.gen::<f32>() * (c.max_size - c.min_size).max(0.0),
            phase: rng.gen::<f32>() * TAU,
        }
    }

    #[cfg(test)]
    pub(crate) fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    fn dist_to(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Pointer {
    /// Unknown until the terminal reports the first mouse event.
    pub(crate) pos: Option<(f32, f32)>,
    pub(crate) pressed: bool,
}

/// Particle budget for a viewport `cols` cells wide.
pub(crate) fn target_count(cols: u16, max_particles: usize) -> usize {
    let n = if cols < 60 {
        40
    } else if cols < 120 {
        80
    } else {
        150
    };
    n.min(max_particles)
}

pub(crate) struct ParticleField {
    pub(crate) particles: Vec<Particle>,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) pointer: Pointer,
    config: FieldConfig,
    rng: StdRng,
}

impl ParticleField {
    pub(crate) fn new(config: FieldConfig, width: f32, height: f32, cols: u16, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let width = width.max(0.0);
        let height = height.max(0.0);
        let n = target_count(cols, config.max_particles);
        let particles = (0..n)
            .map(|_| Particle::spawn(&mut rng, width, height, &config))
            .collect();
        Self {
            particles,
            width,
            height,
            pointer: Pointer::default(),
            config,
            rng,
        }
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub(crate) fn move_pointer(&mut self, x: f32, y: f32) {
        self.pointer.pos = Some((x, y));
    }

    pub(crate) fn press(&mut self, x: f32, y: f32) {
        self.pointer.pos = Some((x, y));
        self.pointer.pressed = true;
        self.ripple(x, y);
    }

    pub(crate) fn release(&mut self) {
        self.pointer.pressed = false;
    }

    /// Advances every particle by `dt` frames.
    pub(crate) fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
        if dt == 0.0 {
            return;
        }

        let c = self.config;
        let damping = c.friction.powf(dt);
        let (w, h) = (self.width, self.height);
        let pointer = self.pointer;

        for p in &mut self.particles {
            p.x += p.vx * dt;
            p.y += p.vy * dt;

            p.vx *= damping;
            p.vy *= damping;

            p.vx += (p.origin_x - p.x) * c.spring * dt;
            p.vy += (p.origin_y - p.y) * c.spring * dt;

            if p.x < 0.0 {
                p.x = 0.0;
                p.vx = p.vx.abs() * c.restitution;
            } else if p.x > w {
                p.x = w;
                p.vx = -p.vx.abs() * c.restitution;
            }
            if p.y < 0.0 {
                p.y = 0.0;
                p.vy = p.vy.abs() * c.restitution;
            } else if p.y > h {
                p.y = h;
                p.vy = -p.vy.abs() * c.restitution;
            }

            if let Some((mx, my)) = pointer.pos {
                let dx = mx - p.x;
                let dy = my - p.y;
                let d = (dx * dx + dy * dy).sqrt();
                if d < c.interaction_radius {
                    let f = (c.interaction_radius - d) / c.interaction_radius;
                    // pressed pulls in hard, hovering nudges away
                    let k = if pointer.pressed {
                        c.press_strength
                    } else {
                        -c.hover_strength
                    };
                    p.vx += dx * k * f * dt;
                    p.vy += dy * k * f * dt;
                }
            }

            p.phase = (p.phase + c.pulse_speed * dt) % TAU;
        }
    }

    /// One-time outward kick around (x, y). Inward radial motion is reflected
    /// before the kick is added, so every particle inside the radius ends up
    /// faster than it was.
    pub(crate) fn ripple(&mut self, x: f32, y: f32) {
        let r = self.config.ripple_radius;
        let strength = self.config.ripple_strength;
        if r <= 0.0 {
            return;
        }
        for p in self.particles.iter_mut() {
            let dx = p.x - x;
            let dy = p.y - y;
            let d = (dx * dx + dy * dy).sqrt();
            if d >= r {
                continue;
            }
            let (nx, ny) = if d > 1e-4 {
                (dx / d, dy / d)
            } else {
                let a = self.rng.gen::<f32>() * TAU;
                (a.cos(), a.sin())
            };
            let force = (r - d) / r;
            let vr = p.vx * nx + p.vy * ny;
            let boost = vr.abs() + force * strength - vr;
            p.vx += boost * nx;
            p.vy += boost * ny;
        }
    }

    /// Refits the field to new bounds. Existing particles keep their velocity;
    /// their home positions scale with the viewport.
    pub(crate) fn resize(&mut self, width: f32, height: f32, cols: u16) {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let sx = if self.width > 0.0 { width / self.width } else { 1.0 };
        let sy = if self.height > 0.0 { height / self.height } else { 1.0 };
        self.width = width;
        self.height = height;

        let target = target_count(cols, self.config.max_particles);
        self.particles.truncate(target);
        for p in &mut self.particles {
            p.origin_x = (p.origin_x * sx).clamp(0.0, width);
            p.origin_y = (p.origin_y * sy).clamp(0.0, height);
            p.x = p.x.clamp(0.0, width);
            p.y = p.y.clamp(0.0, height);
        }
        while self.particles.len() < target {
            let p = Particle::spawn(&mut self.rng, width, height, &self.config);
            self.particles.push(p);
        }
    }

    /// Every unique pair closer than the connection radius, with its distance.
    pub(crate) fn connections(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let r = self.config.connection_radius;
        let ps = &self.particles;
        (0..ps.len()).flat_map(move |i| {
            ((i + 1)..ps.len()).filter_map(move |j| {
                let d = ps[i].dist_to(ps[j].x, ps[j].y);
                (d < r).then_some((i, j, d))
            })
        })
    }

    pub(crate) fn particle_alpha(&self, p: &Particle) -> f32 {
        let c = &self.config;
        let near = match self.pointer.pos {
            Some((mx, my)) => 1.0 - p.dist_to(mx, my) / c.glow_radius.max(1.0),
            None => 0.0,
        };
        let pulse = 0.85 + 0.15 * p.phase.sin();
        (near.max(c.min_alpha) * pulse).clamp(0.0, 1.0)
    }

    pub(crate) fn render(&self, canvas: &mut PixelCanvas, color: Rgb) {
        if canvas.is_empty() {
            return;
        }
        canvas.fade(self.config.trail_fade);

        for p in &self.particles {
            canvas.fill_disc(p.x, p.y, p.size, 2.0, color, self.particle_alpha(p));
        }

        let r = self.config.connection_radius.max(1e-3);
        for (i, j, d) in self.connections() {
            let (a, b) = (&self.particles[i], &self.particles[j]);
            let alpha = 0.15 + 0.45 * (1.0 - d / r);
            canvas.draw_line(a.x, a.y, b.x, b.y, color, alpha);
        }
    }
}
