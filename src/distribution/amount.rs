// Amount selection and unit conversion
// Display-unit amounts are chosen per recipient; conversion to the smallest unit is exact integer math

use crate::identity::Address;
use alloy_primitives::U256;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Errors from amount selection or conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must be positive")]
    Zero,

    #[error("Invalid amount range: min {min} > max {max}")]
    InvalidRange { min: u64, max: u64 },

    #[error("Amount {amount} with {decimals} decimals overflows 256 bits")]
    Overflow { amount: u64, decimals: u8 },
}

/// Chooses how many display units a recipient receives
pub trait AmountPolicy: Send {
    /// Pick the amount for `recipient`. Called once per recipient, not per attempt.
    fn select(&mut self, recipient: &Address) -> u64;
}

/// Uniform random integer in `min..=max`
pub struct UniformAmount {
    min: u64,
    max: u64,
    rng: StdRng,
}

impl UniformAmount {
    /// Create a policy seeded from the OS
    pub fn new(min: u64, max: u64) -> Result<Self, AmountError> {
        Self::with_rng(min, max, StdRng::from_entropy())
    }

    /// Create a reproducible policy
    pub fn seeded(min: u64, max: u64, seed: u64) -> Result<Self, AmountError> {
        Self::with_rng(min, max, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min: u64, max: u64, rng: StdRng) -> Result<Self, AmountError> {
        if min == 0 {
            return Err(AmountError::Zero);
        }
        if min > max {
            return Err(AmountError::InvalidRange { min, max });
        }
        Ok(Self { min, max, rng })
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

impl AmountPolicy for UniformAmount {
    fn select(&mut self, _recipient: &Address) -> u64 {
        self.rng.gen_range(self.min..=self.max)
    }
}

/// The same amount for everyone
pub struct FixedAmount(pub u64);

impl AmountPolicy for FixedAmount {
    fn select(&mut self, _recipient: &Address) -> u64 {
        self.0
    }
}

/// `amount * 10^decimals`, exactly, or an error
pub fn to_smallest_unit(amount: u64, decimals: u8) -> Result<U256, AmountError> {
    if amount == 0 {
        return Err(AmountError::Zero);
    }
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .and_then(|factor| factor.checked_mul(U256::from(amount)))
        .ok_or(AmountError::Overflow { amount, decimals })
}
