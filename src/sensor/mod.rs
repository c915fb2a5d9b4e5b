//! 深度センサーサービスとのインターフェース
//!
//! フレーム取得・座標マッピング・ハードウェアライフサイクルは外部の
//! センサーサービスが提供する。本クレートはこのトレイト境界の内側のみを
//! 実装する。プロセスあたりアクティブなセンサーは1台。

pub mod mock;

use anyhow::Result;

use crate::config::SensorConfig;
use crate::fusion::{ColorCoordinate, ColorGrid, DepthGrid};
use crate::skeleton::Skeleton;

/// 接続状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorStatus {
    Connected,
    Disconnected,
}

/// ストリーム解像度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub width: usize,
    pub height: usize,
}

impl FrameFormat {
    /// 本設計で固定の深度ストリーム解像度
    pub const DEPTH_320X240: FrameFormat = FrameFormat {
        width: 320,
        height: 240,
    };

    /// 本設計で固定のカラーストリーム解像度
    pub const COLOR_640X480: FrameFormat = FrameFormat {
        width: 640,
        height: 480,
    };
}

/// 同一ティックに揃った深度・カラーのペア
///
/// 融合エンジンは両方が揃ったティックでのみ走査を実行する。
#[derive(Debug, Clone)]
pub struct CombinedFrame {
    pub depth: DepthGrid,
    pub color: ColorGrid,
}

/// センサーデバイスの抽象
///
/// スケルトンと深度+カラーは独立したティックで到着し、相互の順序保証は
/// ない。pollは最新フレームのコピーを返し、呼び出し側はロック解放後に
/// 計算する（フレームリソースの長期保持はフレーム枯渇を招く既知の故障
/// モード）。取り逃したフレームは単にスキップされる。
pub trait BodySensor {
    fn status(&self) -> SensorStatus;

    fn depth_format(&self) -> FrameFormat;

    fn color_format(&self) -> FrameFormat;

    /// ストリーム開始。デバイスビジー等は呼び出し側でノーセンサー状態に
    /// フォールバックする
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    /// スケルトンフレームの到着カウンタ。新フレームごとに増加
    fn skeleton_frame_id(&self) -> u64;

    /// 最新のスケルトンフレーム（0体以上）。初回到着前はNone
    fn poll_skeletons(&self) -> Option<Vec<Skeleton>>;

    /// 深度+カラーフレームの到着カウンタ
    fn combined_frame_id(&self) -> u64;

    /// 最新の深度+カラーペア。初回到着前はNone
    fn poll_combined(&self) -> Option<CombinedFrame>;

    /// 深度グリッドの各セルに対応するカラー画像座標を返す
    fn map_depth_to_color(&self, depth: &DepthGrid, color: FrameFormat) -> Vec<ColorCoordinate>;
}

/// 接続済みデバイスのうち最初の1台に接続
///
/// 見つからなければNone（システムは縮退状態で動作継続する）。
pub fn connect_first(config: &SensorConfig) -> Option<Box<dyn BodySensor>> {
    if config.simulate {
        let sensor = mock::SimulatedSensor::new(config);
        if sensor.status() == SensorStatus::Connected {
            return Some(Box::new(sensor));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_formats() {
        assert_eq!(FrameFormat::DEPTH_320X240.width, 320);
        assert_eq!(FrameFormat::DEPTH_320X240.height, 240);
        assert_eq!(FrameFormat::COLOR_640X480.width, 640);
        assert_eq!(FrameFormat::COLOR_640X480.height, 480);
    }

    #[test]
    fn test_connect_first_none_without_device() {
        let config = SensorConfig {
            simulate: false,
            ..SensorConfig::default()
        };
        assert!(connect_first(&config).is_none());
    }

    #[test]
    fn test_connect_first_finds_simulated_device() {
        let config = SensorConfig::default();
        let sensor = connect_first(&config).unwrap();
        assert_eq!(sensor.status(), SensorStatus::Connected);
    }
}
