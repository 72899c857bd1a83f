use crate::math::{Affine, Rect};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba::new(r, g, b, 255)
    }

    /// Source-over blend of `self` onto `dst`
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            0 => dst,
            255 => self,
            alpha => {
                let sa = alpha as u32;
                let da = dst.a as u32 * (255 - sa) / 255;
                let out_a = sa + da;
                let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * da) / out_a) as u8;
                Rgba::new(
                    mix(self.r, dst.r),
                    mix(self.g, dst.g),
                    mix(self.b, dst.b),
                    out_a as u8,
                )
            }
        }
    }
}

/// Owned RGBA image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Bitmap {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgba) {
        self.pixels[y * self.width + x] = color;
    }
}

/// Drawing target for the gears: a transform stack plus image blits
pub trait Surface {
    /// Pushes the current transform and returns the stack depth before the push
    fn save(&mut self) -> usize;
    /// Pops transforms until the stack depth equals `count`
    fn restore_to_count(&mut self, count: usize);
    /// Pre-concatenates a rotation of `degrees` about (pivot_x, pivot_y)
    fn rotate(&mut self, degrees: f32, pivot_x: i32, pivot_y: i32);
    /// Draws `image` scaled into `dest` under the current transform
    fn draw_image(&mut self, image: &Bitmap, dest: Rect);
}

/// Software surface backed by an RGBA pixel buffer
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
    transform: Affine,
    saved: Vec<Affine>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width * height],
            transform: Affine::IDENTITY,
            saved: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }

    #[cfg(test)]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Resets every pixel to `color`, leaving the transform stack alone
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Resizes the buffer, dropping its contents
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgba::TRANSPARENT; width * height];
    }
}

impl Surface for Canvas {
    fn save(&mut self) -> usize {
        let count = self.saved.len();
        self.saved.push(self.transform);
        count
    }

    fn restore_to_count(&mut self, count: usize) {
        while self.saved.len() > count {
            if let Some(transform) = self.saved.pop() {
                self.transform = transform;
            }
        }
    }

    fn rotate(&mut self, degrees: f32, pivot_x: i32, pivot_y: i32) {
        let rotation = Affine::rotate_about(degrees as f64, pivot_x as f64, pivot_y as f64);
        self.transform = self.transform.then(&rotation);
    }

    fn draw_image(&mut self, image: &Bitmap, dest: Rect) {
        if dest.is_empty() || image.width() == 0 || image.height() == 0 {
            return;
        }
        let Some(inverse) = self.transform.invert() else {
            return;
        };

        let corners = [
            self.transform.apply(dest.left as f64, dest.top as f64),
            self.transform.apply(dest.right() as f64, dest.top as f64),
            self.transform.apply(dest.left as f64, dest.bottom() as f64),
            self.transform.apply(dest.right() as f64, dest.bottom() as f64),
        ];
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for [x, y] in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let min_x = min_x.floor().max(0.0) as usize;
        let min_y = min_y.floor().max(0.0) as usize;
        let max_x = max_x.ceil().min(self.width as f64);
        let max_y = max_y.ceil().min(self.height as f64);
        if max_x <= 0.0 || max_y <= 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as usize, max_y as usize);

        let scale_x = image.width() as f64 / dest.width as f64;
        let scale_y = image.height() as f64 / dest.height as f64;

        // For each pixel in the bounding box, sample the source pixel it maps back to
        for y in min_y..max_y {
            for x in min_x..max_x {
                let [lx, ly] = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
                let u = (lx - dest.left as f64) * scale_x;
                let v = (ly - dest.top as f64) * scale_y;
                if u < 0.0 || v < 0.0 {
                    continue;
                }
                let (u, v) = (u as usize, v as usize);
                if u >= image.width() || v >= image.height() {
                    continue;
                }
                let offset = y * self.width + x;
                self.pixels[offset] = image.get(u, v).over(self.pixels[offset]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RED: Rgba = Rgba::rgb(255, 0, 0);
    const BLUE: Rgba = Rgba::rgb(0, 0, 255);

    /// 2x1 image: red on the left, blue on the right
    fn two_tone() -> Bitmap {
        let mut image = Bitmap::new(2, 1);
        image.set(0, 0, RED);
        image.set(1, 0, BLUE);
        image
    }

    #[test]
    fn save_returns_depth_and_restore_pops_back() {
        let mut canvas = Canvas::new(4, 4);
        let outer = canvas.save();
        canvas.rotate(45.0, 2, 2);
        let rotated = canvas.transform();
        let inner = canvas.save();
        canvas.rotate(30.0, 1, 1);
        assert_eq!((outer, inner), (0, 1));

        canvas.restore_to_count(inner);
        assert_eq!(canvas.transform(), rotated);
        canvas.restore_to_count(outer);
        assert_eq!(canvas.transform(), Affine::IDENTITY);
    }

    #[test]
    fn identity_blit_copies_pixels() {
        let mut canvas = Canvas::new(4, 2);
        canvas.draw_image(&two_tone(), Rect::new(1, 1, 2, 1));
        assert_eq!(canvas.pixel(1, 1), RED);
        assert_eq!(canvas.pixel(2, 1), BLUE);
        assert_eq!(canvas.pixel(0, 1), Rgba::TRANSPARENT);
        assert_eq!(canvas.pixel(1, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn half_turn_mirrors_about_pivot() {
        let mut canvas = Canvas::new(4, 2);
        let count = canvas.save();
        canvas.rotate(180.0, 2, 1);
        canvas.draw_image(&two_tone(), Rect::new(2, 0, 2, 1));
        canvas.restore_to_count(count);

        // source row y=0, x in 2..4 lands on row y=1, x in 0..2, flipped
        assert_eq!(canvas.pixel(1, 1), RED);
        assert_eq!(canvas.pixel(0, 1), BLUE);
        assert_eq!(canvas.pixel(2, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn blit_outside_canvas_is_clipped() {
        let mut canvas = Canvas::new(2, 2);
        canvas.draw_image(&two_tone(), Rect::new(-10, -10, 2, 1));
        canvas.draw_image(&two_tone(), Rect::new(1, 1, 2, 1));
        assert_eq!(canvas.pixel(1, 1), RED);
    }

    #[test]
    fn transparent_pixels_leave_destination() {
        let mut canvas = Canvas::new(1, 1);
        canvas.clear(BLUE);
        canvas.draw_image(&Bitmap::new(1, 1), Rect::new(0, 0, 1, 1));
        assert_eq!(canvas.pixel(0, 0), BLUE);
    }

    #[test]
    fn half_alpha_blends() {
        let blended = Rgba::new(255, 0, 0, 128).over(Rgba::rgb(0, 0, 255));
        assert_eq!(blended.a, 255);
        assert!(blended.r > 100 && blended.b > 100);
    }
}
