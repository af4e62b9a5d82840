//! Example: draw a badge and write it to disk

use easel::{Canvas, Color, EaselConfig, ImageFit, PixelBuffer, Image, TextAlign};

fn main() -> anyhow::Result<()> {
    easel::init_logging();
    easel::init(&EaselConfig::from_env());

    let avatar = Image::new(PixelBuffer::filled(64, 48, [90, 140, 220, 255]));

    let mut canvas = Canvas::new(320, 120)?;
    canvas
        .set_color(Color::rgb(24, 26, 32))
        .print_rounded_rectangle(0.0, 0.0, 320.0, 120.0, 16.0)
        .print_circular_image(&avatar, 60.0, 60.0, 40.0, ImageFit::Cover)
        .set_color(Color::WHITE)
        .set_text_font("bold 22px sans-serif")
        .set_text_align(TextAlign::Left)
        .print_responsive_text("A rather long display name", 115.0, 55.0, 190.0)
        .set_text_size(14.0)
        .print_wrapped_text("level 12 \u{b7} 4,210 points", 115.0, 85.0, 190.0);

    let png = smol::block_on(canvas.to_buffer_async())?;
    std::fs::write("badge.png", &png)?;

    println!("Easel v{} wrote badge.png ({} bytes)", easel::VERSION, png.len());
    Ok(())
}
