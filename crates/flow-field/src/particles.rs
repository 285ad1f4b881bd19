//! Weighted particle seeding and the per-frame particle simulation.
//!
//! Particles spawn uniformly over in-domain pixels: a column is chosen with
//! probability proportional to its row count through the field's prefix-sum
//! weights, then a row within it. Each frame particles step along the field,
//! land in an intensity bucket when the step is drawable, and respawn once
//! they exceed their maximum age.

use rand::rngs::StdRng;
use rand::Rng;

use crate::field::{Field, Magnitude};

/// Binary search in a non-decreasing slice.
///
/// Returns the index of a matching element, or `-(insertion_point + 1)`.
pub fn binary_search(a: &[usize], v: usize) -> isize {
    let mut low: isize = 0;
    let mut high: isize = a.len() as isize - 1;
    while low <= high {
        let mid = low + ((high - low) >> 1);
        let p = a[mid as usize];
        if p < v {
            low = mid + 1;
        } else if p == v {
            return mid;
        } else {
            high = mid - 1;
        }
    }
    -(low + 1)
}

/// Pixel position owning the `p`-th in-domain row, `p < field.total_weight()`.
pub fn seed_position(field: &Field, p: usize) -> Option<(f64, f64)> {
    let weights = field.weights();
    let columns = field.columns();

    let found = binary_search(weights, p);
    let mut x = if found < 0 { -found - 2 } else { found };
    if x < 0 {
        return None;
    }
    while (x as usize) < columns.len() && columns[x as usize].is_none() {
        x += 1;
    }
    let index = x as usize;
    let column = columns.get(index)?.as_ref()?;
    let row = p.checked_sub(weights[index])?;
    if row >= column.len() {
        return None;
    }
    Some((
        (field.x_origin() + x as i32) as f64,
        (column.start_row + row as i32) as f64,
    ))
}

/// Uniformly random in-domain pixel, or `None` for an empty field.
pub fn random_position<R: Rng + ?Sized>(field: &Field, rng: &mut R) -> Option<(f64, f64)> {
    let total = field.total_weight();
    if total == 0 {
        return None;
    }
    seed_position(field, rng.gen_range(0..total))
}

/// One particle of the fixed-size pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Next position, valid while the particle sits in a bucket.
    pub xt: f64,
    pub yt: f64,
    pub age: u32,
}

/// The particle pool and its per-frame intensity buckets.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    buckets: Vec<Vec<usize>>,
    max_age: u32,
    max_intensity: f64,
    rng: StdRng,
}

impl ParticleSystem {
    /// Seed `count` particles with ages uniform in `[0, max_age)`.
    pub fn new(
        field: &Field,
        count: usize,
        max_age: u32,
        max_intensity: f64,
        bucket_count: usize,
        mut rng: StdRng,
    ) -> Self {
        let particles = (0..count)
            .map(|_| {
                let (x, y) = random_position(field, &mut rng).unwrap_or((f64::NAN, f64::NAN));
                Particle {
                    x,
                    y,
                    xt: x,
                    yt: y,
                    age: rng.gen_range(0..max_age.max(1)),
                }
            })
            .collect();

        Self {
            particles,
            buckets: vec![Vec::new(); bucket_count.max(1)],
            max_age,
            max_intensity,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particle indices per intensity bucket from the last `evolve`.
    pub fn buckets(&self) -> &[Vec<usize>] {
        &self.buckets
    }

    /// Bucket for a visible magnitude.
    pub fn style_index(&self, m: f64) -> usize {
        let last = (self.buckets.len() - 1) as f64;
        let i = (m.min(self.max_intensity) / self.max_intensity * last).floor();
        i.clamp(0.0, last) as usize
    }

    /// Advance every particle one step through `field`.
    pub fn evolve(&mut self, field: &Field) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }

        for i in 0..self.particles.len() {
            if self.particles[i].age > self.max_age {
                let (x, y) = random_position(field, &mut self.rng).unwrap_or((f64::NAN, f64::NAN));
                let particle = &mut self.particles[i];
                particle.x = x;
                particle.y = y;
                particle.age = 0;
            }

            let (x, y) = (self.particles[i].x, self.particles[i].y);
            let vector = field.sample(x, y);
            match vector.magnitude {
                Magnitude::Nil => self.particles[i].age = self.max_age,
                m => {
                    let xt = x + vector.u;
                    let yt = y + vector.v;
                    let next = field.sample(xt, yt).magnitude;
                    if let (Magnitude::Visible(value), true) = (m, next > Magnitude::Invisible) {
                        let bucket = self.style_index(value);
                        let particle = &mut self.particles[i];
                        particle.xt = xt;
                        particle.yt = yt;
                        self.buckets[bucket].push(i);
                    } else {
                        let particle = &mut self.particles[i];
                        particle.x = xt;
                        particle.y = yt;
                    }
                }
            }
            self.particles[i].age += 1;
        }
    }

    /// Line segments to draw for one bucket: `(from, to)`.
    pub fn segments(&self, bucket: usize) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
        self.buckets
            .get(bucket)
            .into_iter()
            .flatten()
            .map(move |&i| {
                let p = &self.particles[i];
                ([p.x, p.y], [p.xt, p.yt])
            })
    }

    /// Move every drawn particle to its next position.
    pub fn commit(&mut self) {
        for bucket in &self.buckets {
            for &i in bucket {
                let particle = &mut self.particles[i];
                particle.x = particle.xt;
                particle.y = particle.yt;
            }
        }
    }
}
