//! Numeric packing utilities
//!
//! Provides conversions between f32 and compact GPU attribute formats:
//! - f32 ↔ f16 (IEEE 754 half-float, 1 sign + 5 exponent + 10 mantissa,
//!   bias 15)
//! - f32x4 → packed 10-10-10-2 words (unsigned and signed normalized)
//!
//! The half-float conversions are self-contained bit transforms - no
//! allocation, no error cases, every input pattern maps to an output
//! pattern.

// ============================================================================
// Half-Float (f16) Conversion
// ============================================================================

const F32_EXP_MASK: u32 = 0x7f80_0000;
const F32_MAN_MASK: u32 = 0x007f_ffff;
/// Hidden bit of the f32 mantissa, also the carry bit of mantissa rounding
const F32_MAN_HIDDEN: u32 = 0x0080_0000;
/// Smallest f32 exponent field that still maps to a normal half
const F32_EXP_HALF_MIN: u32 = 0x3880_0000;
/// First f32 exponent field past the largest normal half
const F32_EXP_HALF_MAX: u32 = 0x4780_0000;
/// Bias difference (127 - 15) shifted into the f32 exponent field
const F32_HALF_BIAS_OFFSET: u32 = 0x3800_0000;

const F16_EXP_MASK: u16 = 0x7c00;
const F16_MAN_MASK: u16 = 0x03ff;
/// Collapsed pattern for NaNs whose payload has the high mantissa bit set
const F16_NAN_HIGH: u16 = 0x7e00;

/// Convert f32 to f16 bits.
///
/// Total over all inputs. The mantissa is rounded up when the guard bit
/// (bit 12, the highest dropped bit) is set, with carry into the exponent.
/// Finite values past the half range saturate to signed infinity; values
/// below it denormalize, possibly to signed zero. NaN payloads are
/// truncated through unless the high mantissa bit is set (collapsed to
/// `0x7e00`) or the truncation would read as infinity (forced to `0x7c01`).
pub fn f32_to_f16(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = bits & F32_EXP_MASK;
    let man = bits & F32_MAN_MASK;

    // Inf and NaN keep the all-ones exponent
    if exp == F32_EXP_MASK {
        return if man == 0 {
            sign | F16_EXP_MASK
        } else if man >= 0x0040_0000 {
            sign | F16_NAN_HIGH
        } else if man >> 13 == 0 {
            sign | F16_EXP_MASK | 1
        } else {
            sign | F16_EXP_MASK | (man >> 13) as u16
        };
    }

    // Guard-bit rounding; a carry out of the mantissa bumps the exponent
    let man_rounded = man + ((man & 0x1000) << 1);
    let (exp, man) = if man_rounded & F32_MAN_HIDDEN != 0 {
        (exp + F32_MAN_HIDDEN, 0)
    } else {
        (exp, man_rounded)
    };

    // Below the smallest normal half: shift the hidden-bit mantissa down
    // by the exponent deficit (plus the 13 dropped bits)
    if exp < F32_EXP_HALF_MIN {
        let shift = (126 - (exp >> 23)).min(31);
        return sign | ((man | F32_MAN_HIDDEN) >> shift) as u16;
    }

    // Past the largest normal half: saturate to infinity
    if exp >= F32_EXP_HALF_MAX {
        return sign | F16_EXP_MASK;
    }

    sign | (((exp - F32_HALF_BIAS_OFFSET) | man) >> 13) as u16
}

/// Convert f16 bits to f32.
///
/// Total and exact: every half value widens without loss. Denormals are
/// renormalized by leading-zero count, infinities and NaNs keep the
/// all-ones exponent with the NaN payload preserved.
pub fn f16_to_f32(bits: u16) -> f32 {
    let sign = ((bits as u32) & 0x8000) << 16;
    let exp = (bits & F16_EXP_MASK) as u32;
    let man = (bits & F16_MAN_MASK) as u32;

    let magnitude = if exp == F16_EXP_MASK as u32 {
        // inf / NaN: exponent all ones, payload widened in place
        F32_EXP_MASK | (man << 13)
    } else if exp != 0 {
        // normal: re-bias 15 -> 127, mantissa into the wider field
        ((exp + 0x1_c000) << 13) | (man << 13)
    } else if man != 0 {
        // denormal: renormalize by the leading-zero count
        let shift = man.leading_zeros() - 8;
        let renorm_man = (man << shift) & F32_MAN_MASK;
        ((126 - shift) << 23) | renorm_man
    } else {
        // signed zero
        0
    };

    f32::from_bits(sign | magnitude)
}

// ============================================================================
// 10-10-10-2 Packing
// ============================================================================

/// Pack four floats in [0, 1] into an unsigned-normalized 10-10-10-2 word.
///
/// x/y/z get 10 bits each, w gets the top 2. Inputs are clamped.
#[inline]
pub fn pack_unorm_10_10_10_2(x: f32, y: f32, z: f32, w: f32) -> u32 {
    let qx = (x.clamp(0.0, 1.0) * 1023.0) as u32;
    let qy = (y.clamp(0.0, 1.0) * 1023.0) as u32;
    let qz = (z.clamp(0.0, 1.0) * 1023.0) as u32;
    let qw = (w.clamp(0.0, 1.0) * 3.0) as u32;
    qx | (qy << 10) | (qz << 20) | (qw << 30)
}

/// Array form of [`pack_unorm_10_10_10_2`]
#[inline]
pub fn pack_unorm_10_10_10_2_v(v: [f32; 4]) -> u32 {
    pack_unorm_10_10_10_2(v[0], v[1], v[2], v[3])
}

/// Pack four floats in [-1, 1] into a signed-normalized 10-10-10-2 word.
///
/// x/y/z are quantized to [-511, 511] two's complement in 10 bits, w to
/// [-1, 1] in the top 2. Inputs are clamped.
#[inline]
pub fn pack_snorm_10_10_10_2(x: f32, y: f32, z: f32, w: f32) -> u32 {
    let qx = ((x.clamp(-1.0, 1.0) * 511.0) as i32 & 0x3ff) as u32;
    let qy = ((y.clamp(-1.0, 1.0) * 511.0) as i32 & 0x3ff) as u32;
    let qz = ((z.clamp(-1.0, 1.0) * 511.0) as i32 & 0x3ff) as u32;
    let qw = ((w.clamp(-1.0, 1.0) as i32) & 0x3) as u32;
    qx | (qy << 10) | (qz << 20) | (qw << 30)
}

/// Array form of [`pack_snorm_10_10_10_2`]
#[inline]
pub fn pack_snorm_10_10_10_2_v(v: [f32; 4]) -> u32 {
    pack_snorm_10_10_10_2(v[0], v[1], v[2], v[3])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_infinity_patterns() {
        assert_eq!(f32_to_f16(0.0), 0x0000);
        assert_eq!(f32_to_f16(-0.0), 0x8000);
        assert_eq!(f32_to_f16(f32::INFINITY), 0x7c00);
        assert_eq!(f32_to_f16(f32::NEG_INFINITY), 0xfc00);
        assert_eq!(f16_to_f32(0x7c00), f32::INFINITY);
        assert_eq!(f16_to_f32(0xfc00), f32::NEG_INFINITY);
        assert_eq!(f16_to_f32(0x0000).to_bits(), 0.0f32.to_bits());
        assert_eq!(f16_to_f32(0x8000).to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn test_known_normal_values() {
        assert_eq!(f32_to_f16(1.0), 0x3c00);
        assert_eq!(f32_to_f16(-2.0), 0xc000);
        assert_eq!(f32_to_f16(0.5), 0x3800);
        assert_eq!(f32_to_f16(65504.0), 0x7bff); // largest normal half
        assert_eq!(f16_to_f32(0x3c00), 1.0);
        assert_eq!(f16_to_f32(0xc000), -2.0);
        assert_eq!(f16_to_f32(0x7bff), 65504.0);
    }

    #[test]
    fn test_finite_overflow_saturates() {
        assert_eq!(f32_to_f16(65536.0), 0x7c00);
        assert_eq!(f32_to_f16(-65536.0), 0xfc00);
        assert_eq!(f32_to_f16(1e30), 0x7c00);
        assert_eq!(f32_to_f16(f32::MAX), 0x7c00);
        assert_eq!(f32_to_f16(f32::MIN), 0xfc00);
    }

    #[test]
    fn test_denormal_generation() {
        assert_eq!(f32_to_f16(f32::from_bits(0x3380_0000)), 0x0001); // 2^-24
        assert_eq!(f32_to_f16(f32::from_bits(0x3300_0000)), 0x0000); // 2^-25
        assert_eq!(f32_to_f16(f32::from_bits(0x3880_0000)), 0x0400); // 2^-14
        // negative underflow keeps its sign
        assert_eq!(f32_to_f16(f32::from_bits(0xb300_0000)), 0x8000);
    }

    #[test]
    fn test_guard_bit_rounding() {
        // dropped bits below the guard truncate
        assert_eq!(f32_to_f16(f32::from_bits(0x3f80_0800)), 0x3c00);
        // guard bit set rounds the kept mantissa up
        assert_eq!(f32_to_f16(f32::from_bits(0x3f80_1000)), 0x3c01);
        // carry all the way out of the mantissa bumps the exponent
        assert_eq!(f32_to_f16(f32::from_bits(0x3fff_f000)), 0x4000);
    }

    #[test]
    fn test_rounding_carry_at_range_edge() {
        // just above 65504 with the guard bit set: carry lands on infinity
        assert_eq!(f32_to_f16(f32::from_bits(0x477f_f000)), 0x7c00);
    }

    #[test]
    fn test_nan_sign_survives_both_directions() {
        let positive = f32::from_bits(0x7fc0_0000);
        let negative = f32::from_bits(0xffc0_0000);
        assert_eq!(f32_to_f16(positive), 0x7e00);
        assert_eq!(f32_to_f16(negative), 0xfe00);
        assert!(f16_to_f32(0x7e00).is_nan());
        assert!(f16_to_f32(0xfe00).is_nan());
        assert_eq!(f16_to_f32(0x7e00).to_bits() >> 31, 0);
        assert_eq!(f16_to_f32(0xfe00).to_bits() >> 31, 1);
    }

    #[test]
    fn test_nan_payload_edge_cases() {
        // payload that would truncate to zero must not read as infinity
        assert_eq!(f32_to_f16(f32::from_bits(0x7f80_0001)), 0x7c01);
        // low payloads truncate through
        assert_eq!(f32_to_f16(f32::from_bits(0x7f80_2000)), 0x7c01);
        assert_eq!(f32_to_f16(f32::from_bits(0x7fbf_e000)), 0x7dff);
        // widening keeps the payload bits
        assert_eq!(f16_to_f32(0x7c01).to_bits(), 0x7f80_2000);
        assert_eq!(f16_to_f32(0x7dff).to_bits(), 0x7fbf_e000);
    }

    #[test]
    fn test_f16_to_f32_matches_reference() {
        for bits in 0..=u16::MAX {
            let ours = f16_to_f32(bits);
            let reference = half::f16::from_bits(bits).to_f32();
            if reference.is_nan() {
                // hardware conversions may quiet signaling payloads, so
                // only require NaN-ness and the sign to agree
                assert!(ours.is_nan(), "{bits:#06x}");
                assert_eq!(
                    ours.to_bits() >> 31,
                    reference.to_bits() >> 31,
                    "{bits:#06x}",
                );
            } else {
                assert_eq!(ours.to_bits(), reference.to_bits(), "{bits:#06x}");
            }
        }
    }

    #[test]
    fn test_roundtrip_every_half_value() {
        for bits in 0..=u16::MAX {
            let exp = bits & 0x7c00;
            let man = bits & 0x03ff;
            if exp == 0x7c00 && man > 0x0200 {
                // high NaN payloads collapse to 0x7e00 by design
                assert_eq!(f32_to_f16(f16_to_f32(bits)), (bits & 0x8000) | 0x7e00);
                continue;
            }
            assert_eq!(f32_to_f16(f16_to_f32(bits)), bits, "{bits:#06x}");
        }
    }

    #[test]
    fn test_roundtrip_exact_f32_values() {
        for value in [0.0f32, 1.0, -1.0, 0.25, 96.0, -65504.0, 6.103_515_6e-5] {
            assert_eq!(f16_to_f32(f32_to_f16(value)), value, "{value}");
        }
    }

    #[test]
    fn test_pack_unorm_10_10_10_2() {
        assert_eq!(pack_unorm_10_10_10_2(0.0, 0.0, 0.0, 0.0), 0);
        assert_eq!(pack_unorm_10_10_10_2(1.0, 0.0, 0.0, 0.0), 0x3ff);
        assert_eq!(pack_unorm_10_10_10_2(0.0, 1.0, 0.0, 0.0), 0x3ff << 10);
        assert_eq!(pack_unorm_10_10_10_2(0.0, 0.0, 1.0, 0.0), 0x3ff << 20);
        assert_eq!(pack_unorm_10_10_10_2(0.0, 0.0, 0.0, 1.0), 0x3 << 30);
        assert_eq!(pack_unorm_10_10_10_2(1.0, 1.0, 1.0, 1.0), u32::MAX);
        // out of range clamps rather than wrapping into other fields
        assert_eq!(pack_unorm_10_10_10_2(2.0, -1.0, 0.0, 9.0), 0x3ff | (0x3 << 30));
    }

    #[test]
    fn test_pack_snorm_10_10_10_2() {
        assert_eq!(pack_snorm_10_10_10_2(0.0, 0.0, 0.0, 0.0), 0);
        assert_eq!(pack_snorm_10_10_10_2(1.0, 0.0, 0.0, 0.0), 0x1ff);
        assert_eq!(pack_snorm_10_10_10_2(-1.0, 0.0, 0.0, 0.0), 0x201);
        assert_eq!(pack_snorm_10_10_10_2(0.0, 0.0, 1.0, 0.0), 0x1ff << 20);
        assert_eq!(pack_snorm_10_10_10_2(0.0, 0.0, 0.0, -1.0), 0x3 << 30);
        // clamped
        assert_eq!(pack_snorm_10_10_10_2(5.0, 0.0, 0.0, 0.0), 0x1ff);
    }

    #[test]
    fn test_pack_array_forms_agree() {
        let v = [0.25, 0.5, 0.75, 1.0];
        assert_eq!(
            pack_unorm_10_10_10_2_v(v),
            pack_unorm_10_10_10_2(v[0], v[1], v[2], v[3]),
        );
        let v = [-0.25, 0.5, -0.75, 1.0];
        assert_eq!(
            pack_snorm_10_10_10_2_v(v),
            pack_snorm_10_10_10_2(v[0], v[1], v[2], v[3]),
        );
    }
}
