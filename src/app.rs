//! フレームコールバックの配線
//!
//! スケルトンティックと深度+カラーティックは独立に到着する。融合側が
//! 書き込むシルエットスナップショットを計測側が読む構造を明示的に持ち、
//! 単一ライター・最新値勝ちの規律で共有する（最後に完成した融合ティックの
//! 結果を使う以上の鮮度保証は不要）。

use crate::chest;
use crate::config::MeasureConfig;
use crate::fusion::{ColorCoordinate, FrameFusionEngine, SilhouetteSnapshot};
use crate::measure::{self, Measurements};
use crate::sensor::{BodySensor, CombinedFrame, FrameFormat};
use crate::skeleton::Skeleton;

/// スケルトンティック1回分の出力
#[derive(Debug, Clone)]
pub struct MeterOutput {
    pub measurements: Measurements,
    pub skeleton: Skeleton,
}

/// 計測パイプライン本体
pub struct BodyMeter {
    fusion: FrameFusionEngine,
    /// 最後に完成した融合ティックの結果。融合側のみが書き込む
    latest_silhouette: Option<SilhouetteSnapshot>,
    chest_row_offset: i32,
    last_skeleton_id: u64,
    last_combined_id: u64,
}

impl BodyMeter {
    pub fn new(depth: FrameFormat, color: FrameFormat, measure_config: &MeasureConfig) -> Self {
        Self {
            fusion: FrameFusionEngine::new(depth, color),
            latest_silhouette: None,
            chest_row_offset: measure_config.chest_row_offset,
            last_skeleton_id: 0,
            last_combined_id: 0,
        }
    }

    /// 深度+カラーティック: シルエット走査とカラーコピーを実行
    pub fn on_combined_frame(&mut self, frame: &CombinedFrame, map: &[ColorCoordinate]) {
        let snapshot = self.fusion.process(&frame.depth, map);
        self.fusion.store_color(&frame.color);
        self.latest_silhouette = Some(snapshot);
    }

    /// スケルトンティック: 追跡スケルトンがあれば全計測値を再計算
    ///
    /// 追跡スケルトンがないフレームはエラーではなく定常状態であり、
    /// 計測を単にスキップする。
    pub fn on_skeleton_frame(&mut self, skeletons: &[Skeleton]) -> Option<MeterOutput> {
        let skeleton = Skeleton::first_tracked(skeletons)?;
        let mut measurements = measure::measure(skeleton);
        if let Some(snapshot) = &self.latest_silhouette {
            measurements.chest_width = chest::estimate_chest_width(
                skeleton,
                measurements.height,
                snapshot,
                self.fusion.depth_format(),
                self.chest_row_offset,
            );
        }
        Some(MeterOutput {
            measurements,
            skeleton: skeleton.clone(),
        })
    }

    /// センサーの新着フレームを処理し、スケルトンティックがあれば計測を返す
    ///
    /// フレームIDが進んだストリームだけを処理する。取り逃しはスキップ。
    pub fn poll(&mut self, sensor: &dyn BodySensor) -> Option<MeterOutput> {
        let combined_id = sensor.combined_frame_id();
        if combined_id != self.last_combined_id {
            if let Some(frame) = sensor.poll_combined() {
                self.last_combined_id = combined_id;
                let map = sensor.map_depth_to_color(&frame.depth, sensor.color_format());
                self.on_combined_frame(&frame, &map);
            }
        }

        let skeleton_id = sensor.skeleton_frame_id();
        if skeleton_id != self.last_skeleton_id {
            if let Some(skeletons) = sensor.poll_skeletons() {
                self.last_skeleton_id = skeleton_id;
                return self.on_skeleton_frame(&skeletons);
            }
        }
        None
    }

    /// 背景除去用の不透明マスク（深度解像度）
    pub fn mask(&self) -> &[bool] {
        self.fusion.mask()
    }

    /// 表示用カラーバッファ
    pub fn color(&self) -> &[u32] {
        self.fusion.color()
    }

    pub fn depth_format(&self) -> FrameFormat {
        self.fusion.depth_format()
    }

    pub fn color_format(&self) -> FrameFormat {
        self.fusion.color_format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::mock::{combined_at, skeleton_at};
    use crate::skeleton::TrackingState;

    const DEPTH: FrameFormat = FrameFormat::DEPTH_320X240;
    const COLOR: FrameFormat = FrameFormat::COLOR_640X480;

    fn aligned_map() -> Vec<ColorCoordinate> {
        let mut map = Vec::with_capacity(DEPTH.width * DEPTH.height);
        for y in 0..DEPTH.height {
            for x in 0..DEPTH.width {
                map.push(ColorCoordinate {
                    x: x as i32 * 2,
                    y: y as i32 * 2,
                });
            }
        }
        map
    }

    fn meter() -> BodyMeter {
        BodyMeter::new(DEPTH, COLOR, &MeasureConfig::default())
    }

    #[test]
    fn test_full_pipeline_produces_chest_width() {
        let mut meter = meter();
        let phase = 0.0;
        meter.on_combined_frame(&combined_at(phase, 0.2, DEPTH, COLOR), &aligned_map());

        let output = meter
            .on_skeleton_frame(&[skeleton_at(phase, 0.2)])
            .unwrap();
        let m = output.measurements;
        // 模擬人物は約1.76m
        assert!((m.height - 1.76).abs() < 0.05, "height = {}", m.height);
        let chest = m.chest_width.unwrap();
        assert!(
            chest > 0.2 && chest < 0.8,
            "chest width out of range: {}",
            chest
        );
    }

    #[test]
    fn test_chest_unavailable_before_first_fusion_tick() {
        // 融合ティック未完了のうちは胸囲のみ欠損し、他の計測は出る
        let mut meter = meter();
        let output = meter.on_skeleton_frame(&[skeleton_at(0.0, 0.2)]).unwrap();
        assert!(output.measurements.chest_width.is_none());
        assert!(output.measurements.height > 1.0);
    }

    #[test]
    fn test_no_tracked_skeleton_skips_measurement() {
        let mut meter = meter();
        assert!(meter.on_skeleton_frame(&[]).is_none());
        let untracked = Skeleton::new(TrackingState::PositionOnly);
        assert!(meter.on_skeleton_frame(&[untracked]).is_none());
    }

    #[test]
    fn test_latest_fusion_tick_wins() {
        // 2回目の融合ティックの結果が1回目を置き換えること
        let mut meter = meter();
        meter.on_combined_frame(&combined_at(0.0, 0.2, DEPTH, COLOR), &aligned_map());
        let first = meter
            .on_skeleton_frame(&[skeleton_at(0.0, 0.2)])
            .unwrap()
            .measurements
            .chest_width;

        // 人物が大きく横へ移動した後のティック
        let phase = std::f32::consts::FRAC_PI_2;
        meter.on_combined_frame(&combined_at(phase, 0.2, DEPTH, COLOR), &aligned_map());
        let second = meter
            .on_skeleton_frame(&[skeleton_at(phase, 0.2)])
            .unwrap()
            .measurements
            .chest_width;

        // どちらのティックでもシルエットとスケルトンが整合し胸囲が得られる
        assert!(first.is_some());
        assert!(second.is_some());
    }

    #[test]
    fn test_mask_written_after_combined_tick() {
        let mut meter = meter();
        assert!(meter.mask().iter().all(|&m| !m));
        meter.on_combined_frame(&combined_at(0.0, 0.2, DEPTH, COLOR), &aligned_map());
        assert!(meter.mask().iter().any(|&m| m));
        // カラーバッファにも人物色が入っている
        assert!(meter.color().iter().any(|&c| c == 0x00C8A080));
    }
}
