//! A small radix-2 FFT and the spectral convolution built on top of
//! it.  The noise generator needs to smooth a whole canvas worth of
//! white noise with a kernel whose support can run to hundreds of
//! cells, and doing that by direct summation is quadratic in the
//! kernel size.  Padding everything out to a power of two and
//! multiplying in the frequency domain keeps startup quick even for
//! large correlation lengths.
//!
//! The driver is the classic iterative Cooley-Tukey: bit-reversal
//! permutation followed by log2(n) butterfly passes.  Nothing here
//! is tuned for peak throughput; it runs once per session.

use num::Complex;
use std::f64::consts::PI;

/// The smallest power of two greater than or equal to `n`.
pub fn next_pow2(n: usize) -> usize {
    let mut p = 1;
    while p < n {
        p <<= 1;
    }
    p
}

/// In-place FFT over a power-of-two-length buffer.  When `inverse`
/// is set, performs the inverse transform including the 1/n scale,
/// so a forward/inverse pair is the identity.
///
/// Panics if the buffer length is not a power of two; callers are
/// expected to have padded with [`next_pow2`] first.
pub fn fft(buf: &mut [Complex<f64>], inverse: bool) {
    let n = buf.len();
    assert!(n.is_power_of_two(), "fft length must be a power of two");
    if n < 2 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            buf.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let ang = sign * 2.0 * PI / (len as f64);
        let wlen = Complex::new(ang.cos(), ang.sin());
        let half = len / 2;
        let mut start = 0;
        while start < n {
            let mut w = Complex::new(1.0, 0.0);
            for off in 0..half {
                let u = buf[start + off];
                let v = buf[start + off + half] * w;
                buf[start + off] = u + v;
                buf[start + off + half] = u - v;
                w = w * wlen;
            }
            start += len;
        }
        len <<= 1;
    }

    if inverse {
        let scale = 1.0 / (n as f64);
        for x in buf.iter_mut() {
            *x = *x * scale;
        }
    }
}

/// Two-dimensional FFT over a row-major `width` x `height` buffer:
/// one pass over the rows, one over the columns.  Both dimensions
/// must be powers of two.
pub fn fft2(buf: &mut [Complex<f64>], width: usize, height: usize, inverse: bool) {
    assert_eq!(buf.len(), width * height);
    for row in buf.chunks_mut(width) {
        fft(row, inverse);
    }
    let mut column = vec![Complex::new(0.0, 0.0); height];
    for x in 0..width {
        for y in 0..height {
            column[y] = buf[y * width + x];
        }
        fft(&mut column, inverse);
        for y in 0..height {
            buf[y * width + x] = column[y];
        }
    }
}

/// Linear 2D convolution of a real `height` x `width` field with a
/// square `ksize` x `ksize` kernel, returning the centered "same"
/// window, with the field treated as zero beyond its edges.  Both
/// operands are zero-padded to power-of-two dimensions large enough
/// that the circular convolution the FFT computes never wraps into
/// the region we keep.
///
/// `ksize` must be odd so the kernel has a center cell.
pub fn convolve_same(
    field: &[f64],
    height: usize,
    width: usize,
    kernel: &[f64],
    ksize: usize,
) -> Vec<f64> {
    assert_eq!(field.len(), height * width);
    assert_eq!(kernel.len(), ksize * ksize);
    assert!(ksize % 2 == 1, "kernel must have a center cell");

    let ph = next_pow2(height + ksize - 1);
    let pw = next_pow2(width + ksize - 1);

    let mut fa = vec![Complex::new(0.0, 0.0); ph * pw];
    for y in 0..height {
        for x in 0..width {
            fa[y * pw + x] = Complex::new(field[y * width + x], 0.0);
        }
    }
    let mut fb = vec![Complex::new(0.0, 0.0); ph * pw];
    for y in 0..ksize {
        for x in 0..ksize {
            fb[y * pw + x] = Complex::new(kernel[y * ksize + x], 0.0);
        }
    }

    fft2(&mut fa, pw, ph, false);
    fft2(&mut fb, pw, ph, false);
    for i in 0..fa.len() {
        fa[i] = fa[i] * fb[i];
    }
    fft2(&mut fa, pw, ph, true);

    // The full linear convolution lives in the top-left
    // (height + ksize - 1) x (width + ksize - 1) corner; the "same"
    // window starts half a kernel in.
    let k = ksize / 2;
    let mut out = vec![0.0; height * width];
    for y in 0..height {
        for x in 0..width {
            out[y * width + x] = fa[(y + k) * pw + (x + k)].re;
        }
    }
    out
}
