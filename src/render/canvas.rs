//! Pixel buffer drawing

/// Fully transparent pixel
pub const TRANSPARENT: u32 = 0x0000_0000;

/// Row-major RGBA8 pixel buffer, one `u32` per pixel with bytes in
/// `R, G, B, A` memory order
pub struct Canvas<'a> {
    pixels: &'a mut [u32],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    /// `pixels` must hold at least `width * height` entries; any extra is
    /// left untouched
    pub fn new(pixels: &'a mut [u32], width: usize, height: usize) -> Self {
        debug_assert!(pixels.len() >= width * height);
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn clear(&mut self, pixel: u32) {
        self.pixels[..self.width * self.height].fill(pixel);
    }

    /// Fill the rectangle with its top-left corner at `(x, y)`, clipped to
    /// the canvas
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, pixel: u32) {
        let x0 = x.clamp(0, self.width as i64) as usize;
        let y0 = y.clamp(0, self.height as i64) as usize;
        let x1 = (x + i64::from(w)).clamp(0, self.width as i64) as usize;
        let y1 = (y + i64::from(h)).clamp(0, self.height as i64) as usize;

        if x0 >= x1 {
            return;
        }
        for row in y0..y1 {
            let start = row * self.width;
            self.pixels[start + x0..start + x1].fill(pixel);
        }
    }

    /// The pixels as tightly packed RGBA8 rows, ready for texture upload
    pub fn as_rgba_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels[..self.width * self.height])
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: u32 = u32::from_ne_bytes([255, 0, 0, 255]);

    #[test]
    fn test_clear() {
        let mut buf = vec![0xDEAD_BEEF; 12];
        let mut canvas = Canvas::new(&mut buf, 4, 3);
        canvas.clear(TRANSPARENT);
        assert!(buf.iter().all(|&p| p == TRANSPARENT));
    }

    #[test]
    fn test_fill_inside() {
        let mut buf = vec![TRANSPARENT; 100];
        let mut canvas = Canvas::new(&mut buf, 10, 10);
        canvas.fill_rect(2, 3, 4, 4, RED);

        assert_eq!(canvas.pixel(2, 3), RED);
        assert_eq!(canvas.pixel(5, 6), RED);
        assert_eq!(canvas.pixel(6, 6), TRANSPARENT);
        assert_eq!(canvas.pixel(5, 7), TRANSPARENT);
        assert_eq!(canvas.pixel(1, 3), TRANSPARENT);
        assert_eq!(buf.iter().filter(|&&p| p == RED).count(), 16);
    }

    #[test]
    fn test_fill_clips_at_edges() {
        let mut buf = vec![TRANSPARENT; 100];
        let mut canvas = Canvas::new(&mut buf, 10, 10);

        // Hangs off the bottom-right corner
        canvas.fill_rect(8, 8, 5, 5, RED);
        // Hangs off the top-left corner
        canvas.fill_rect(-3, -3, 4, 4, RED);

        assert_eq!(canvas.pixel(9, 9), RED);
        assert_eq!(canvas.pixel(0, 0), RED);
        assert_eq!(buf.iter().filter(|&&p| p == RED).count(), 4 + 1);
    }

    #[test]
    fn test_fill_fully_outside() {
        let mut buf = vec![TRANSPARENT; 100];
        let mut canvas = Canvas::new(&mut buf, 10, 10);
        canvas.fill_rect(10, 0, 5, 5, RED);
        canvas.fill_rect(0, 10, 5, 5, RED);
        canvas.fill_rect(-6, -6, 5, 5, RED);
        assert!(buf.iter().all(|&p| p == TRANSPARENT));
    }

    #[test]
    fn test_rgba_bytes_layout() {
        let mut buf = vec![0xDEAD_BEEF; 6];
        let mut canvas = Canvas::new(&mut buf, 2, 2);
        canvas.clear(TRANSPARENT);
        canvas.fill_rect(1, 0, 1, 1, RED);

        let bytes = canvas.as_rgba_bytes();
        // Extra pixels past width * height are not part of the frame
        assert_eq!(bytes.len(), 2 * 2 * 4);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[255, 0, 0, 255]);
    }
}
