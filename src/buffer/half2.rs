use half::f16;

/// Pack two `f32` into a `u32` as `f16`, matching WGSL `pack2x16float`.
///
/// `a` is stored in the low 16 bits.
pub fn pack_half2(a: f32, b: f32) -> u32 {
    (f16::from_f32(a).to_bits() as u32) | ((f16::from_f32(b).to_bits() as u32) << 16)
}

/// Unpack a `u32` into two `f32`, matching WGSL `unpack2x16float`.
pub fn unpack_half2(packed: u32) -> [f32; 2] {
    [
        f16::from_bits(packed as u16).to_f32(),
        f16::from_bits((packed >> 16) as u16).to_f32(),
    ]
}
