use crate::{
    foundation::error::{ChipVisError, ChipVisResult},
    render::frame::FrameRGBA,
};

/// Mean blur with a `kernel` x `kernel` box, then restore pixels that were pure black.
///
/// `kernel` must be odd. Edges are clamped. Alpha is left untouched.
pub fn box_blur_keep_black(frame: &mut FrameRGBA, kernel: u32) -> ChipVisResult<()> {
    if kernel % 2 == 0 {
        return Err(ChipVisError::validation(format!(
            "blur kernel must be odd, got {kernel}"
        )));
    }
    if kernel <= 1 {
        return Ok(());
    }

    let black: Vec<bool> = frame
        .data
        .chunks_exact(4)
        .map(|px| px[0] == 0 && px[1] == 0 && px[2] == 0)
        .collect();

    let radius = (kernel / 2) as i64;
    let mut tmp = frame.data.clone();
    horizontal_pass(&frame.data, &mut tmp, frame.width, frame.height, radius);
    vertical_pass(&tmp, &mut frame.data, frame.width, frame.height, radius);

    for (px, was_black) in frame.data.chunks_exact_mut(4).zip(black) {
        if was_black {
            px[..3].fill(0);
        }
    }
    Ok(())
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: i64) {
    let w = i64::from(width);
    let n = (2 * radius + 1) as u32;
    for y in 0..i64::from(height) {
        let row = |x: i64| ((y * w + x.clamp(0, w - 1)) as usize) * 4;
        let mut acc = [0u32; 3];
        for dx in -radius..=radius {
            let i = row(dx);
            for c in 0..3 {
                acc[c] += u32::from(src[i + c]);
            }
        }
        for x in 0..w {
            let out = row(x);
            for c in 0..3 {
                dst[out + c] = mean(acc[c], n);
            }
            let (add, sub) = (row(x + radius + 1), row(x - radius));
            for c in 0..3 {
                acc[c] = acc[c] + u32::from(src[add + c]) - u32::from(src[sub + c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, radius: i64) {
    let w = i64::from(width);
    let h = i64::from(height);
    let n = (2 * radius + 1) as u32;
    for x in 0..w {
        let col = |y: i64| ((y.clamp(0, h - 1) * w + x) as usize) * 4;
        let mut acc = [0u32; 3];
        for dy in -radius..=radius {
            let i = col(dy);
            for c in 0..3 {
                acc[c] += u32::from(src[i + c]);
            }
        }
        for y in 0..h {
            let out = col(y);
            for c in 0..3 {
                dst[out + c] = mean(acc[c], n);
            }
            let (add, sub) = (col(y + radius + 1), col(y - radius));
            for c in 0..3 {
                acc[c] = acc[c] + u32::from(src[add + c]) - u32::from(src[sub + c]);
            }
        }
    }
}

fn mean(sum: u32, n: u32) -> u8 {
    ((sum + n / 2) / n).min(255) as u8
}
