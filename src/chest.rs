//! シルエット走査に基づく胸囲推定
//!
//! 胸囲は骨格関節の距離としては得られないため、肩中央関節をピクセル空間へ
//! 射影した行のシルエット幅を、身長（メートル）/ 身長（ピクセル）の比で
//! 物理単位に変換する。

use crate::fusion::SilhouetteSnapshot;
use crate::projection::project_to_pixel;
use crate::sensor::FrameFormat;
use crate::skeleton::{JointKind, Skeleton};

/// 鎖骨の直上ではなくその下をサンプリングするための固定行オフセット
pub const CHEST_ROW_OFFSET: i32 = 10;

/// 胸囲をメートル単位で推定
///
/// 次の場合は計測不能としてNoneを返す（ゼロ除算や負のゴミ値を伝播させない）:
/// - このティックに前景が検出されず height_in_pixels が未定義/0以下
/// - サンプリング行のシルエットが{-1,-1}（その行にデータなし）
/// - サンプリング行がシルエットテーブルの範囲外
pub fn estimate_chest_width(
    skeleton: &Skeleton,
    height_m: f32,
    snapshot: &SilhouetteSnapshot,
    depth_format: FrameFormat,
    row_offset: i32,
) -> Option<f32> {
    let height_px = snapshot.height_in_pixels()?;
    if height_px <= 0 {
        return None;
    }

    let shoulder_center = skeleton.get(JointKind::ShoulderCenter).position;
    let projected = project_to_pixel(
        shoulder_center,
        depth_format.width as u32,
        depth_format.height as u32,
    );
    let row = projected.y as i32 + row_offset;

    let sil = snapshot.row(row)?;
    if sil.is_empty() {
        return None;
    }

    let width_px = (sil.right_edge - sil.left_edge) as f32;
    Some(width_px * (height_m / height_px as f32))
}
