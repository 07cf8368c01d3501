//===========================================================================//

/// The colour depths a BITMAPINFOHEADER may declare.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BmpDepth {
    One,
    Four,
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BmpDepth {
    pub(crate) fn from_bits_per_pixel(
        bits_per_pixel: u16,
    ) -> Option<BmpDepth> {
        match bits_per_pixel {
            1 => Some(BmpDepth::One),
            4 => Some(BmpDepth::Four),
            8 => Some(BmpDepth::Eight),
            16 => Some(BmpDepth::Sixteen),
            24 => Some(BmpDepth::TwentyFour),
            32 => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    /// Depths of 8 bits or fewer index into a colour table.
    pub(crate) fn is_indexed(&self) -> bool {
        matches!(*self, BmpDepth::One | BmpDepth::Four | BmpDepth::Eight)
    }
}

//===========================================================================//


//===========================================================================//
