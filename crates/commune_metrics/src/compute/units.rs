//! Nano and per-epoch ("horus") unit conversion.
//!
//! Display values are derived from raw integers. Rounding happens in the integer
//! domain, half-up, so `1_005_000_000` nano always renders as `1.01`.

use crate::compute::DeriveError;

/// Nano units per display token.
pub const NANO_PER_UNIT: u64 = 1_000_000_000;

/// Largest supported number of decimal places for [`round_scaled`].
const MAX_DECIMALS: u32 = 18;

/// Raw stake (nano) to display scale. Unrounded.
pub fn to_display_stake(raw: u64) -> f64 {
    raw as f64 / NANO_PER_UNIT as f64
}

/// Per-block raw emission to a per-epoch display value for a subnet with `tempo`
/// blocks per epoch. A zero tempo means the tempo is unknown and no epoch scaling is
/// applied.
pub fn to_display_emission(raw: u64, tempo: u64) -> f64 {
    raw as f64 / (NANO_PER_UNIT as f64 * epoch_divisor(tempo) as f64)
}

/// Display stake rounded half-up to `decimals` places.
pub fn display_stake_rounded(raw: u64, decimals: u32) -> f64 {
    round_scaled(u128::from(raw), u128::from(NANO_PER_UNIT), decimals)
}

/// Display emission (epoch-adjusted) rounded half-up to `decimals` places.
pub fn display_emission_rounded(raw: u64, tempo: u64, decimals: u32) -> f64 {
    let divisor = u128::from(NANO_PER_UNIT) * epoch_divisor(tempo);
    round_scaled(u128::from(raw), divisor, decimals)
}

/// `raw / divisor` rounded half-up to `decimals` places.
///
/// `divisor` must be non-zero; every caller in this crate passes a multiple of
/// [`NANO_PER_UNIT`].
pub fn round_scaled(raw: u128, divisor: u128, decimals: u32) -> f64 {
    let unit = 10u128.pow(decimals.min(MAX_DECIMALS));
    // raw <= u64::MAX, so raw * unit * 2 stays below u128::MAX.
    let scaled = (raw * unit * 2 + divisor) / (divisor * 2);
    scaled as f64 / unit as f64
}

/// Display amount back to nano. Rejects negative, non-finite and out-of-range values.
pub fn to_nano(display: f64) -> Result<u64, DeriveError> {
    if !display.is_finite() || display < 0.0 {
        return Err(DeriveError::InvalidAmount(display.to_string()));
    }
    let nano = (display * NANO_PER_UNIT as f64).round();
    if nano >= u64::MAX as f64 {
        return Err(DeriveError::Overflow("to_nano"));
    }
    Ok(nano as u64)
}

fn epoch_divisor(tempo: u64) -> u128 {
    if tempo == 0 {
        1
    } else {
        u128::from(tempo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn stake_display_unrounded() {
        assert_eq!(to_display_stake(1_500_000_000), 1.5);
        assert_eq!(to_display_stake(0), 0.0);
    }

    #[test]
    fn stake_rounds_half_up() {
        assert_eq!(display_stake_rounded(1_005_000_000, 2), 1.01);
        assert_eq!(display_stake_rounded(1_004_999_999, 2), 1.0);
        assert_eq!(display_stake_rounded(1_000_000_000, 2), 1.0);
    }

    #[test]
    fn emission_scaled_by_tempo() {
        assert_eq!(to_display_emission(2_000_000_000, 100), 0.02);
        assert_eq!(display_emission_rounded(123_456_789_000, 100, 4), 1.2346);
    }

    #[test]
    fn zero_tempo_is_identity() {
        assert_eq!(to_display_emission(2_000_000_000, 0), 2.0);
        assert_eq!(
            display_emission_rounded(2_000_000_000, 0, 4),
            display_emission_rounded(2_000_000_000, 1, 4)
        );
    }

    #[test]
    fn tiny_emission_rounds_to_zero() {
        assert_eq!(display_emission_rounded(500, 1, 4), 0.0);
    }

    #[test]
    fn to_nano_rejects_negative() {
        assert!(matches!(to_nano(-1.0), Err(DeriveError::InvalidAmount(_))));
        assert!(matches!(to_nano(f64::NAN), Err(DeriveError::InvalidAmount(_))));
        assert_eq!(to_nano(1.5).unwrap(), 1_500_000_000);
    }

    #[test]
    fn max_raw_does_not_overflow() {
        let v = display_emission_rounded(u64::MAX, u64::MAX, 4);
        assert!(v >= 0.0);
        let s = display_stake_rounded(u64::MAX, 18);
        assert!(s > 1.8e10);
    }

    proptest! {
        #[test]
        fn display_round_trip_within_precision(raw in 0u64..=1_000_000_000_000_000) {
            let back = to_nano(display_stake_rounded(raw, 2)).unwrap();
            // 2 decimals = 1e7 nano, half of which is the rounding tolerance; the
            // rest covers f64 representation of large values.
            let tolerance = 5_000_000 + raw / 1_000_000_000_000;
            prop_assert!(back.abs_diff(raw) <= tolerance, "raw={raw} back={back}");
        }
    }
}
