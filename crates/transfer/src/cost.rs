/// Largest chunk stored for free: 24 KiB minus the per-call overhead.
pub const FREE_TIER_BYTES: u64 = 24 * 1024 - 326;

/// Storage pricing applied to each written chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    /// Chunks up to this many bytes are free.
    pub free_tier_bytes: u64,
    /// Fixed bytes added to each chunk before pricing.
    pub overhead_bytes: u64,
    /// Size of one pricing unit.
    pub unit_bytes: u64,
    /// Price of one unit, in wei.
    pub price_per_unit: u128,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            free_tier_bytes: FREE_TIER_BYTES,
            overhead_bytes: 326,
            unit_bytes: 24 * 1024,
            price_per_unit: 1_000_000_000_000_000_000,
        }
    }
}

impl Pricing {
    /// Value owed for storing a chunk of `chunk_size` bytes, in wei.
    ///
    /// Rounded down to whole units.
    pub fn estimate(&self, chunk_size: u64) -> u128 {
        if chunk_size <= self.free_tier_bytes {
            return 0;
        }
        let units = (chunk_size + self.overhead_bytes) / self.unit_bytes.max(1);
        units as u128 * self.price_per_unit
    }
}
