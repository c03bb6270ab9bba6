use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

const GRAVITY: f64 = 15.0;
const SPARKS: [char; 6] = ['*', '+', '✦', '✧', '·', '★'];
const BANNERS: [&str; 3] = ["NEW BEST!", "RECORD!", "TOP SCORE!"];

/// One glyph of the new-best animation
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Letters fly to `target` and hold; sparks fall under gravity
    pub target: Option<(f64, f64)>,
}

impl Particle {
    fn spark<R: Rng + ?Sized>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *SPARKS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
            target: None,
        }
    }

    fn letter<R: Rng + ?Sized>(from: (f64, f64), to: (f64, f64), symbol: char, rng: &mut R) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: to.0 - from.0,
            vel_y: to.1 - from.1,
            symbol,
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(2.5..3.5),
            target: Some(to),
        }
    }

    pub fn is_letter(&self) -> bool {
        self.target.is_some()
    }

    /// Returns false once the particle has outlived `max_age`
    fn update(&mut self, dt: f64) -> bool {
        match self.target {
            Some((tx, ty)) => {
                let dist = ((tx - self.x).powi(2) + (ty - self.y).powi(2)).sqrt();
                if dist > 0.5 {
                    self.x += self.vel_x * dt * 2.0;
                    self.y += self.vel_y * dt * 2.0;
                    self.vel_x *= 0.9;
                    self.vel_y *= 0.9;
                } else {
                    self.x = tx;
                    self.y = ty;
                }
            }
            None => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += GRAVITY * dt;
            }
        }
        self.age += dt;
        self.age < self.max_age
    }
}

/// Shown over the results screen when a session sets a new best score
#[derive(Debug, Default)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    pub banner: &'static str,
    elapsed: Duration,
    duration: Duration,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            duration: Duration::from_secs(3),
            width: 80.0,
            height: 24.0,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty() && self.elapsed < self.duration
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();
        self.particles.clear();
        self.elapsed = Duration::ZERO;
        self.width = f64::from(width.max(1));
        self.height = f64::from(height.max(1));
        self.banner = BANNERS.choose(&mut rng).copied().unwrap_or(BANNERS[0]);

        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        let spacing = 2.0;
        let left = cx - (self.banner.chars().count() as f64 - 1.0) * spacing / 2.0;
        for (i, ch) in self.banner.chars().enumerate().filter(|(_, c)| *c != ' ') {
            let from = (cx + rng.gen_range(-10.0..10.0), cy + rng.gen_range(-5.0..5.0));
            let to = (left + i as f64 * spacing, cy - 2.0);
            self.particles.push(Particle::letter(from, to, ch, &mut rng));
        }
        for _ in 0..20 {
            let x = cx + rng.gen_range(-15.0..15.0);
            let y = cy + rng.gen_range(-6.0..6.0);
            self.particles.push(Particle::spark(x, y, &mut rng));
        }
    }

    pub fn stop(&mut self) {
        self.particles.clear();
        self.elapsed = self.duration;
    }

    /// Steps the animation; sparks leaving the viewport are dropped early.
    pub fn advance(&mut self, dt: Duration) {
        if !self.is_active() {
            self.particles.clear();
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let step = dt.as_secs_f64();
        let (w, h) = (self.width, self.height);
        let margin = 5.0;
        self.particles.retain_mut(|p| {
            let alive = p.update(step);
            let gone = !p.is_letter() && (p.y > h + margin || p.x < -margin || p.x > w + margin);
            alive && !gone
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inactive() {
        let celebration = Celebration::new();
        assert!(!celebration.is_active());
        assert!(celebration.particles.is_empty());
    }

    #[test]
    fn start_spells_banner_and_adds_sparks() {
        let mut celebration = Celebration::new();
        celebration.start(80, 24);

        assert!(celebration.is_active());
        let letters: String = celebration
            .particles
            .iter()
            .filter(|p| p.is_letter())
            .map(|p| p.symbol)
            .collect();
        assert_eq!(letters, celebration.banner.replace(' ', ""));
        assert!(celebration.particles.iter().any(|p| !p.is_letter()));
    }

    #[test]
    fn letters_converge_on_targets() {
        let mut rng = rand::thread_rng();
        let mut p = Particle::letter((0.0, 0.0), (10.0, 5.0), 'N', &mut rng);
        let start = (10.0f64.powi(2) + 5.0f64.powi(2)).sqrt();
        for _ in 0..10 {
            p.update(0.1);
        }
        let (tx, ty) = p.target.unwrap();
        let dist = ((tx - p.x).powi(2) + (ty - p.y).powi(2)).sqrt();
        assert!(dist < start);
    }

    #[test]
    fn sparks_fall() {
        let mut rng = rand::thread_rng();
        let mut p = Particle::spark(10.0, 10.0, &mut rng);
        let vel_y = p.vel_y;
        assert!(p.update(0.1));
        assert!(p.vel_y > vel_y);
    }

    #[test]
    fn ends_after_duration() {
        let mut celebration = Celebration::new();
        celebration.start(80, 24);
        for _ in 0..10 {
            celebration.advance(Duration::from_millis(100));
        }
        assert!(celebration.is_active());

        celebration.advance(Duration::from_secs(3));
        assert!(!celebration.is_active());
        assert!(celebration.particles.is_empty());
    }

    #[test]
    fn offscreen_sparks_are_dropped() {
        let mut celebration = Celebration::new();
        celebration.start(20, 10);
        let mut rng = rand::thread_rng();
        celebration.particles.push(Particle::spark(100.0, 100.0, &mut rng));

        celebration.advance(Duration::from_millis(100));
        assert!(celebration.particles.iter().all(|p| p.is_letter() || p.x <= 25.0));
    }
}
