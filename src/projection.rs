//! スケルトン空間からピクセル空間への射影

use crate::skeleton::Point3;

/// 射影後の2Dピクセル座標
///
/// depthは元の3D位置のzをそのまま保持する（スケールしない）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// 3D位置を正規化範囲を指定してピクセル座標に射影
///
/// スケルトン空間は上がY正、ピクセル空間は下がY正のためY軸を反転する。
/// 画像境界へ無言でクランプする。失敗しない。
pub fn project_to_pixel_norm(
    position: Point3,
    width: u32,
    height: u32,
    norm_max_x: f32,
    norm_max_y: f32,
) -> ProjectedPoint {
    ProjectedPoint {
        x: scale(width, norm_max_x, position.x),
        y: scale(height, norm_max_y, -position.y),
        depth: position.z,
    }
}

/// 正規化範囲1.0でピクセル座標に射影
pub fn project_to_pixel(position: Point3, width: u32, height: u32) -> ProjectedPoint {
    project_to_pixel_norm(position, width, height, 1.0, 1.0)
}

fn scale(max_pixel: u32, max_skeleton: f32, position: f32) -> f32 {
    let max_pixel = max_pixel as f32;
    let value = (max_pixel / max_skeleton / 2.0) * position + max_pixel / 2.0;
    value.clamp(0.0, max_pixel)
}
