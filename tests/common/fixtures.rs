//! Image fixtures and mock image server helpers

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Encoded JPEG with a gradient so resampling has real work to do
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 90])
    });
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

/// Encoded PNG with an alpha channel
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([30, (x * 9 % 256) as u8, (y * 7 % 256) as u8, 200])
    });
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Serve `body` at `route` with status 200 and an optional delay
pub async fn serve(server: &MockServer, route: &str, body: Vec<u8>, delay: Option<Duration>) {
    let mut template = ResponseTemplate::new(200).set_body_bytes(body);
    if let Some(delay) = delay {
        template = template.set_delay(delay);
    }
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Serve an error status at `route`
pub async fn serve_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
