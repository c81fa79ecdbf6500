use crate::engine::protocol::IllustrationImage;

pub fn decode_illustration(bytes: &[u8]) -> Result<IllustrationImage, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(IllustrationImage {
        width: width as usize,
        height: height as usize,
        rgba: rgba.into_raw(),
    })
}
