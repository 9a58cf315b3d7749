//! Writing rendered images to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::renderer::color_to_rgb;
use crate::{ImageBuffer, RenderResult};

/// Write `image` as plain-text PPM (`P3`), one pixel per line, row-major.
pub fn write_ppm<W: Write>(writer: &mut W, image: &ImageBuffer) -> std::io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for color in &image.pixels {
        let [r, g, b] = color_to_rgb(*color);
        writeln!(writer, "{} {} {}", r, g, b)?;
    }
    Ok(())
}

/// Save `image` to `path`. `.ppm` files are written as text PPM, any other
/// extension goes through the `image` crate (PNG, JPEG, ...).
pub fn save<P: AsRef<Path>>(path: P, image: &ImageBuffer) -> RenderResult<()> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let mut writer = BufWriter::new(File::create(path)?);
        write_ppm(&mut writer, image)?;
        writer.flush()?;
    } else {
        image::save_buffer(
            path,
            &image.to_rgb8(),
            image.width,
            image.height,
            image::ColorType::Rgb8,
        )?;
    }

    log::info!(
        "Saved {}x{} image to {}",
        image.width,
        image.height,
        path.display()
    );
    Ok(())
}
