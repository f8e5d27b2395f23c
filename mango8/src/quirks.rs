/// Behaviour switches for the points where the original CHIP-8 interpreter
/// and its SUPER-CHIP successor disagree.
///
/// Defaults select the original behaviours; flipping a flag selects the
/// SUPER-CHIP one. The executor is the only consumer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY1/8XY2/8XY3 reset VF to zero after the logical operation.
    pub reset_vf_on_logic: bool,
    /// 8XY6/8XYE shift the value of VY into VX; when `false` VX shifts in
    /// place and VY is ignored.
    pub shift_reads_vy: bool,
    /// FX55/FX65 leave I pointing one past the last register copied.
    pub increment_i_on_copy: bool,
    /// DXYN wraps sprite pixels around the screen edges instead of clipping.
    pub wrap_sprites: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            reset_vf_on_logic: true,
            shift_reads_vy: true,
            increment_i_on_copy: true,
            wrap_sprites: false,
        }
    }
}
