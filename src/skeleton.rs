/// Kinect系センサーの20関節インデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum JointKind {
    HipCenter = 0,
    Spine = 1,
    ShoulderCenter = 2,
    Head = 3,
    ShoulderLeft = 4,
    ElbowLeft = 5,
    WristLeft = 6,
    HandLeft = 7,
    ShoulderRight = 8,
    ElbowRight = 9,
    WristRight = 10,
    HandRight = 11,
    HipLeft = 12,
    KneeLeft = 13,
    AnkleLeft = 14,
    FootLeft = 15,
    HipRight = 16,
    KneeRight = 17,
    AnkleRight = 18,
    FootRight = 19,
}

impl JointKind {
    pub const COUNT: usize = 20;

    /// 全関節（センサー配列順）
    pub const ALL: [JointKind; JointKind::COUNT] = [
        Self::HipCenter,
        Self::Spine,
        Self::ShoulderCenter,
        Self::Head,
        Self::ShoulderLeft,
        Self::ElbowLeft,
        Self::WristLeft,
        Self::HandLeft,
        Self::ShoulderRight,
        Self::ElbowRight,
        Self::WristRight,
        Self::HandRight,
        Self::HipLeft,
        Self::KneeLeft,
        Self::AnkleLeft,
        Self::FootLeft,
        Self::HipRight,
        Self::KneeRight,
        Self::AnkleRight,
        Self::FootRight,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }
}

/// センサー空間上の3D位置（メートル単位）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// 関節ごとの追跡信頼度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointConfidence {
    NotTracked,
    Inferred,
    Tracked,
}

/// スケルトン全体の追跡状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    NotTracked,
    PositionOnly,
    Tracked,
}

/// 単一関節の位置と信頼度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedJoint {
    pub kind: JointKind,
    pub position: Point3,
    pub confidence: JointConfidence,
}

impl TrackedJoint {
    pub fn new(kind: JointKind, position: Point3, confidence: JointConfidence) -> Self {
        Self {
            kind,
            position,
            confidence,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.confidence == JointConfidence::Tracked
    }
}

/// 1フレーム分のスケルトン
///
/// スケルトンフレームごとに新規構築され、コールバック終了時に破棄される。
/// フレーム間で共有されない。
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub joints: [TrackedJoint; JointKind::COUNT],
    pub tracking_state: TrackingState,
}

impl Skeleton {
    /// 全関節が原点・NotTrackedのスケルトン
    pub fn new(tracking_state: TrackingState) -> Self {
        let joints = JointKind::ALL
            .map(|kind| TrackedJoint::new(kind, Point3::default(), JointConfidence::NotTracked));
        Self {
            joints,
            tracking_state,
        }
    }

    pub fn get(&self, kind: JointKind) -> &TrackedJoint {
        &self.joints[kind as usize]
    }

    pub fn set_joint(&mut self, kind: JointKind, position: Point3, confidence: JointConfidence) {
        self.joints[kind as usize] = TrackedJoint::new(kind, position, confidence);
    }

    /// センサー配列順で最初の完全追跡スケルトンを選択
    pub fn first_tracked(skeletons: &[Skeleton]) -> Option<&Skeleton> {
        skeletons
            .iter()
            .find(|s| s.tracking_state == TrackingState::Tracked)
    }
}
