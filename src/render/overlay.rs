use crate::skeleton::JointKind;

/// 骨格の接続定義 (開始関節, 終了関節)
pub const SKELETON_CONNECTIONS: [(JointKind, JointKind); 19] = [
    // 体幹
    (JointKind::HipCenter, JointKind::Spine),
    (JointKind::Spine, JointKind::ShoulderCenter),
    (JointKind::ShoulderCenter, JointKind::Head),
    // 左腕
    (JointKind::ShoulderCenter, JointKind::ShoulderLeft),
    (JointKind::ShoulderLeft, JointKind::ElbowLeft),
    (JointKind::ElbowLeft, JointKind::WristLeft),
    (JointKind::WristLeft, JointKind::HandLeft),
    // 右腕
    (JointKind::ShoulderCenter, JointKind::ShoulderRight),
    (JointKind::ShoulderRight, JointKind::ElbowRight),
    (JointKind::ElbowRight, JointKind::WristRight),
    (JointKind::WristRight, JointKind::HandRight),
    // 左脚
    (JointKind::HipCenter, JointKind::HipLeft),
    (JointKind::HipLeft, JointKind::KneeLeft),
    (JointKind::KneeLeft, JointKind::AnkleLeft),
    (JointKind::AnkleLeft, JointKind::FootLeft),
    // 右脚
    (JointKind::HipCenter, JointKind::HipRight),
    (JointKind::HipRight, JointKind::KneeRight),
    (JointKind::KneeRight, JointKind::AnkleRight),
    (JointKind::AnkleRight, JointKind::FootRight),
];

/// 関節マーカーの色 (RGB)
pub const JOINT_COLOR: u32 = 0x00FF00; // 緑

/// 骨格線の色 (RGB)
pub const BONE_COLOR: u32 = 0xFFFF00; // 黄色

/// 信頼度が低い関節の色 (RGB)
pub const LOW_CONFIDENCE_COLOR: u32 = 0xFF0000; // 赤

/// 背景除去後の背景色 (RGB)
pub const BACKDROP_COLOR: u32 = 0x103010; // 暗い緑
