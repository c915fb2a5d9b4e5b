//! スケルトンからの身体計測エンジン
//!
//! 追跡状態がTrackedのスケルトン1体を入力とし、身長・腕長・脚長・肩幅を
//! 計算する。左右対になる部位は追跡信頼度の高い側を選択する。
//! NotTrackedの関節も位置をそのまま使用する（センサーの最終推定値）。
//! 計測ノイズ源として既知の挙動であり、左右選択以外の信頼度検証は行わない。

use crate::geometry::{distance, path_length, tracked_count};
use crate::skeleton::{JointKind, Skeleton, TrackedJoint};

/// 頭頂部〜首の未追跡区間を補う人体計測上の固定補正値（メートル）
pub const HEAD_OFFSET: f32 = 0.14;

/// 1フレーム分の計測結果（メートル単位、内部は完全精度）
///
/// 追跡スケルトンが得られるたびに全項目を再計算する。フレーム間の
/// 永続化はない。胸囲はシルエットデータが揃わないフレームでは欠損する。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub height: f32,
    pub arm_length: f32,
    pub leg_length: f32,
    pub shoulder_breadth: f32,
    pub chest_width: Option<f32>,
}

impl Measurements {
    /// 表示境界用のラベル付き文字列（小数2桁丸めはここでのみ行う）
    pub fn display_lines(&self) -> Vec<String> {
        let chest = match self.chest_width {
            Some(w) => format!("Chest: {:.2}m", w),
            None => "Chest: ---".to_string(),
        };
        vec![
            format!("Height: {:.2}m", self.height),
            format!("Arm: {:.2}m", self.arm_length),
            format!("Leg: {:.2}m", self.leg_length),
            format!("Shoulder: {:.2}m", self.shoulder_breadth),
            chest,
        ]
    }
}

/// スケルトンから胸囲以外の全計測値を計算
pub fn measure(skeleton: &Skeleton) -> Measurements {
    let leg = leg_length(skeleton);
    Measurements {
        height: upper_body_length(skeleton) + leg + HEAD_OFFSET,
        arm_length: arm_length(skeleton),
        leg_length: leg,
        shoulder_breadth: shoulder_breadth(skeleton),
        chest_width: None,
    }
}

/// 頭→肩中央→背骨→腰中央の経路長
pub fn upper_body_length(skeleton: &Skeleton) -> f32 {
    let chain = joints(
        skeleton,
        &[
            JointKind::Head,
            JointKind::ShoulderCenter,
            JointKind::Spine,
            JointKind::HipCenter,
        ],
    );
    path_length(&positions(&chain))
}

/// 脚長: 追跡関節数が厳密に多い側の脚の経路長（同数なら右脚）
pub fn leg_length(skeleton: &Skeleton) -> f32 {
    let left = joints(
        skeleton,
        &[
            JointKind::HipLeft,
            JointKind::KneeLeft,
            JointKind::AnkleLeft,
            JointKind::FootLeft,
        ],
    );
    let right = joints(
        skeleton,
        &[
            JointKind::HipRight,
            JointKind::KneeRight,
            JointKind::AnkleRight,
            JointKind::FootRight,
        ],
    );
    select_side(&left, &right)
}

/// 腕長: 追跡関節数が厳密に多い側の腕の経路長（同数なら右腕）
pub fn arm_length(skeleton: &Skeleton) -> f32 {
    let left = joints(
        skeleton,
        &[
            JointKind::ShoulderLeft,
            JointKind::ElbowLeft,
            JointKind::WristLeft,
        ],
    );
    let right = joints(
        skeleton,
        &[
            JointKind::ShoulderRight,
            JointKind::ElbowRight,
            JointKind::WristRight,
        ],
    );
    select_side(&left, &right)
}

/// 肩幅: 右肩と左肩の直線距離
pub fn shoulder_breadth(skeleton: &Skeleton) -> f32 {
    distance(
        skeleton.get(JointKind::ShoulderRight).position,
        skeleton.get(JointKind::ShoulderLeft).position,
    )
}

fn joints(skeleton: &Skeleton, kinds: &[JointKind]) -> Vec<TrackedJoint> {
    kinds.iter().map(|&kind| *skeleton.get(kind)).collect()
}

fn positions(joints: &[TrackedJoint]) -> Vec<crate::skeleton::Point3> {
    joints.iter().map(|j| j.position).collect()
}

/// 左が厳密に多い場合のみ左、それ以外は右（評価順による決定的な同数時挙動）
fn select_side(left: &[TrackedJoint], right: &[TrackedJoint]) -> f32 {
    if tracked_count(left) > tracked_count(right) {
        path_length(&positions(left))
    } else {
        path_length(&positions(right))
    }
}
