use crate::error::Result;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// How hard the PNG encoder should try when recompressing an image.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum PngCompression {
    /// Fastest encoding, largest output.
    Fast,
    /// The encoder's default balance.
    Default,
    /// Smallest output.
    #[default]
    Best,
}

impl PngCompression {
    fn to_png(self) -> png::Compression {
        match self {
            PngCompression::Fast => png::Compression::Fast,
            PngCompression::Default => png::Compression::Default,
            PngCompression::Best => png::Compression::Best,
        }
    }
}

//===========================================================================//

/// Decodes a PNG and encodes the same pixels again at the given compression
/// level.  Palette and low-bit-depth images are expanded to 8-bit samples,
/// and only the critical chunks survive.
pub fn recompress_png(
    data: &[u8],
    compression: PngCompression,
) -> Result<Vec<u8>> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info()?;
    let mut buffer = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;
    buffer.truncate(frame.buffer_size());

    let mut output = Vec::new();
    {
        let mut encoder =
            png::Encoder::new(&mut output, frame.width, frame.height);
        encoder.set_color(frame.color_type);
        encoder.set_depth(frame.bit_depth);
        encoder.set_compression(compression.to_png());
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&buffer)?;
        writer.finish()?;
    }
    log::trace!(
        "Recompressed {}x{} PNG from {} to {} bytes",
        frame.width,
        frame.height,
        data.len(),
        output.len()
    );
    Ok(output)
}

//===========================================================================//


//===========================================================================//
