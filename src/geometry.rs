//! 骨格計測の幾何ユーティリティ
//!
//! センサー固有の型に依存しない純粋関数群。状態を持たない。

use crate::skeleton::{Point3, TrackedJoint};

/// 2点間のユークリッド距離
///
/// 同一点なら0を返す。失敗しない。
pub fn distance(a: Point3, b: Point3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// 連続する点列の経路長（隣接ペアの距離の総和）
///
/// 要素数0または1の列は0を返す。
pub fn path_length(points: &[Point3]) -> f32 {
    points
        .windows(2)
        .map(|pair| distance(pair[0], pair[1]))
        .sum()
}

/// 信頼度がTrackedの関節数（InferredとNotTrackedは除外）
pub fn tracked_count(joints: &[TrackedJoint]) -> usize {
    joints.iter().filter(|j| j.is_tracked()).count()
}
