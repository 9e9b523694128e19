//! # World Random Number Generator
//!
//! A small multiply-with-carry generator used to seed every noise field in the world.
//!
//! The generator keeps two 32-bit lanes and only ever uses wrapping `u32` arithmetic,
//! so a given seed produces the same stream on every platform. The carry of each lane is
//! taken with a sign-extending shift of the lane's `i32` reinterpretation, which is what
//! fixes the published stream. Two worlds built from the
//! same seed therefore sample identical noise and generate identical chunks.

/// Divisor that maps a full `u32` onto `[0, 1)`.
const U32_RANGE: f64 = 4_294_967_296.0;

/// Seeded pseudo-random stream with a bit-exact, platform independent output.
///
/// # Examples
///
/// ```
/// use voxel_world::WorldRng;
///
/// let mut a = WorldRng::new(42);
/// let mut b = WorldRng::new(42);
/// assert_eq!(a.next_f64(), b.next_f64());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldRng {
    m_w: u32,
    m_z: u32,
}

impl WorldRng {
    /// Creates a stream from any integer seed. The seed wraps modulo 2^32.
    pub fn new(seed: i64) -> Self {
        let seed = seed as u32;
        WorldRng {
            m_w: 123_456_789u32.wrapping_add(seed),
            m_z: 987_654_321u32.wrapping_sub(seed),
        }
    }

    /// Advances both lanes and returns the raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.m_z = 36969u32
            .wrapping_mul(self.m_z & 0xFFFF)
            .wrapping_add(carry(self.m_z));
        self.m_w = 18000u32
            .wrapping_mul(self.m_w & 0xFFFF)
            .wrapping_add(carry(self.m_w));
        (self.m_z << 16).wrapping_add(self.m_w & 0xFFFF)
    }

    /// Returns the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / U32_RANGE
    }
}

/// High half of a lane, sign-extended.
fn carry(lane: u32) -> u32 {
    ((lane as i32) >> 16) as u32
}
