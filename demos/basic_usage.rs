//! Basic usage example for the magick-convert library

use magick_convert::{init, ConversionRequest, Gravity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init()?;

    // Configure the conversion
    let request = ConversionRequest::with_source("convert", "input.jpg")
        .crop_by_ratio(16.0 / 9.0, Gravity::Center)?
        .width(1920)
        .quality(85);

    println!("Running: {}", request.command("output.jpg")?);

    // Convert, keeping the reason on failure
    match request.try_convert("output.jpg") {
        Ok(conversion) => {
            println!("Successfully wrote {}", conversion.destination.display());
            if let Some(status) = conversion.status {
                println!("  Converter finished with {}", status);
            }
        }
        Err(e) => println!("Conversion failed: {}", e.user_message()),
    }

    Ok(())
}
