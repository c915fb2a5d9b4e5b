use anyhow::Result;
use minifb::{Key, Window, WindowOptions};

use crate::projection::project_to_pixel;
use crate::render::overlay::{
    BACKDROP_COLOR, BONE_COLOR, JOINT_COLOR, LOW_CONFIDENCE_COLOR, SKELETON_CONNECTIONS,
};
use crate::sensor::FrameFormat;
use crate::skeleton::Skeleton;

/// minifbを使用した表示アダプター
///
/// マスク適用済みカラービットマップと骨格オーバーレイを描画する。
pub struct MeterWindow {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl MeterWindow {
    /// ウィンドウを作成
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        let buffer = vec![0u32; width * height];

        Ok(Self {
            window,
            buffer,
            width,
            height,
        })
    }

    /// ウィンドウが開いているか
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// 背景を除去したカラーフレームを描画
    ///
    /// マスクは深度解像度なので、カラーピクセルごとに解像度比で縮小した
    /// セルを参照する。マスク外は背景色で塗る。
    pub fn draw_masked_frame(
        &mut self,
        color: &[u32],
        color_format: FrameFormat,
        mask: &[bool],
        depth_format: FrameFormat,
    ) {
        let divisor = (color_format.width / depth_format.width.max(1)).max(1);
        for y in 0..self.height.min(color_format.height) {
            let mask_row = (y / divisor).min(depth_format.height - 1) * depth_format.width;
            for x in 0..self.width.min(color_format.width) {
                let mask_col = (x / divisor).min(depth_format.width - 1);
                let visible = mask[mask_row + mask_col];
                self.buffer[y * self.width + x] = if visible {
                    color[y * color_format.width + x]
                } else {
                    BACKDROP_COLOR
                };
            }
        }
    }

    /// 骨格の関節マーカーと接続線を描画
    pub fn draw_skeleton(&mut self, skeleton: &Skeleton) {
        let w = self.width as u32;
        let h = self.height as u32;

        // 骨格線
        for (start_kind, end_kind) in SKELETON_CONNECTIONS.iter() {
            let start = skeleton.get(*start_kind);
            let end = skeleton.get(*end_kind);
            if start.is_tracked() && end.is_tracked() {
                let p1 = project_to_pixel(start.position, w, h);
                let p2 = project_to_pixel(end.position, w, h);
                self.draw_line(p1.x as i32, p1.y as i32, p2.x as i32, p2.y as i32, BONE_COLOR);
            }
        }

        // 関節マーカー
        for joint in skeleton.joints.iter() {
            let p = project_to_pixel(joint.position, w, h);
            let color = if joint.is_tracked() {
                JOINT_COLOR
            } else {
                LOW_CONFIDENCE_COLOR
            };
            self.draw_circle(p.x as i32, p.y as i32, 3, color);
        }
    }

    /// バッファをウィンドウに表示
    pub fn update(&mut self) -> Result<()> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }

    /// Bresenhamのアルゴリズムで線を描画
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 円を描画（塗りつぶし）
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// ピクセルをセット（境界チェック付き）
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }
}
