mod bitmask;

pub use bitmask::{Bitmask, Indices};

/// Maximum number of distinct flags a [`Bitmask`] can hold.
pub const MAX_BITS: u32 = u64::BITS;

/// A value that occupies exactly one bit of a [`Bitmask`].
pub trait Bitable {
    fn bit(&self) -> u64;
    fn index(&self) -> u32;
}

/// Plain bit positions. Used for hardware-defined indices that have no
/// named enum (physical button numbers, axis numbers).
impl Bitable for u32 {
    #[inline]
    fn bit(&self) -> u64 {
        if *self < MAX_BITS {
            1u64 << *self
        } else {
            0
        }
    }

    #[inline]
    fn index(&self) -> u32 {
        *self
    }
}
