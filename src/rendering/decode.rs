use chatpane_types::DecodeError;
use image::{DynamicImage, ImageError};

/// Outcome of decoding raw attachment bytes
pub type DecodeResult = Result<DynamicImage, DecodeError>;

/// Decode image bytes of any format the `image` crate recognizes
pub fn decode_image(bytes: &[u8]) -> DecodeResult {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format = image::guess_format(bytes).map_err(|e| DecodeError::Unsupported(e.to_string()))?;
    image::load_from_memory_with_format(bytes, format).map_err(|e| match e {
        ImageError::Unsupported(e) => DecodeError::Unsupported(e.to_string()),
        other => DecodeError::Corrupt(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let image = decode_image(&png_bytes(12, 7)).unwrap();
        assert_eq!((image.width(), image.height()), (12, 7));
    }

    #[test]
    fn test_empty_bytes() {
        assert_eq!(decode_image(&[]).unwrap_err(), DecodeError::Empty);
    }

    #[test]
    fn test_garbage_bytes_are_unsupported() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(DecodeError::Unsupported(_))
        ));
    }

    #[test]
    fn test_truncated_png_is_an_error() {
        let bytes = png_bytes(40, 40);
        let result = decode_image(&bytes[..bytes.len() / 2]);
        assert!(result.is_err());
    }
}
