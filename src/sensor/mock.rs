//! シミュレートされたセンサーデバイス
//!
//! 左右に揺れる立ち姿の人物を決定論的に生成する。実機と同じく
//! スケルトンスレッドと深度+カラースレッドが独立に最新フレームを
//! 公開する（到着順序の保証なし）。バイナリとテストの両方で使用する。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use crate::config::SensorConfig;
use crate::fusion::{ColorCoordinate, ColorGrid, DepthGrid, DepthPixel};
use crate::projection::project_to_pixel;
use crate::sensor::{BodySensor, CombinedFrame, FrameFormat, SensorStatus};
use crate::skeleton::{JointConfidence, JointKind, Point3, Skeleton, TrackingState};

/// 人物までの距離（ミリメートル）
const PERSON_DEPTH_MM: u16 = 2000;

/// 指定位相での模擬スケルトン
///
/// センサー空間: X右・Y上・Z前方、カメラは胸の高さ、人物は2m前方。
pub fn skeleton_at(phase: f32, sway_amplitude: f32) -> Skeleton {
    let sway = sway_amplitude * phase.sin();
    let z = 2.0;

    let mut s = Skeleton::new(TrackingState::Tracked);
    let mut set = |kind: JointKind, x: f32, y: f32| {
        s.set_joint(kind, Point3::new(x + sway, y, z), JointConfidence::Tracked);
    };

    set(JointKind::HipCenter, 0.0, 0.0);
    set(JointKind::Spine, 0.0, 0.25);
    set(JointKind::ShoulderCenter, 0.0, 0.45);
    set(JointKind::Head, 0.0, 0.72);

    set(JointKind::ShoulderLeft, -0.20, 0.42);
    set(JointKind::ElbowLeft, -0.26, 0.15);
    set(JointKind::WristLeft, -0.28, -0.08);
    set(JointKind::HandLeft, -0.29, -0.16);
    set(JointKind::ShoulderRight, 0.20, 0.42);
    set(JointKind::ElbowRight, 0.26, 0.15);
    set(JointKind::WristRight, 0.28, -0.08);
    set(JointKind::HandRight, 0.29, -0.16);

    set(JointKind::HipLeft, -0.10, -0.02);
    set(JointKind::KneeLeft, -0.11, -0.45);
    set(JointKind::AnkleLeft, -0.11, -0.85);
    set(JointKind::FootLeft, -0.13, -0.92);
    set(JointKind::HipRight, 0.10, -0.02);
    set(JointKind::KneeRight, 0.11, -0.45);
    set(JointKind::AnkleRight, 0.11, -0.85);
    set(JointKind::FootRight, 0.13, -0.92);

    s
}

/// 深度ピクセル(x, y)が人物シルエットに含まれるか
///
/// center_xはスケルトンの腰中央を深度解像度に射影した列。
/// 頭（円）+ 胴体（矩形）+ 両脚（2本の帯）の単純な形状。
fn person_covers(x: i32, y: i32, center_x: i32) -> bool {
    let dx = x - center_x;
    match y {
        // 頭: 中心(center_x, 34)半径14の円
        20..=47 => {
            let dy = y - 34;
            dx * dx + dy * dy <= 14 * 14
        }
        // 胴体
        48..=122 => dx.abs() <= 26,
        // 脚2本
        123..=230 => {
            let a = dx.abs();
            (6..=20).contains(&a)
        }
        _ => false,
    }
}

/// 指定位相での深度+カラーフレームを生成
///
/// 深度シルエットはスケルトンと同じ揺れに追従する。カラーは人物領域を
/// 肌色系、背景を縦グラデーションで塗る。
pub fn combined_at(
    phase: f32,
    sway_amplitude: f32,
    depth_format: FrameFormat,
    color_format: FrameFormat,
) -> CombinedFrame {
    let sway = sway_amplitude * phase.sin();
    let hip = Point3::new(sway, 0.0, 2.0);
    let center_x = project_to_pixel(hip, depth_format.width as u32, depth_format.height as u32).x
        as i32;

    let mut depth = DepthGrid::new(depth_format);
    for y in 0..depth_format.height {
        for x in 0..depth_format.width {
            if person_covers(x as i32, y as i32, center_x) {
                depth.set(
                    x,
                    y,
                    DepthPixel {
                        depth_mm: PERSON_DEPTH_MM,
                        player_index: 1,
                    },
                );
            }
        }
    }

    let scale = (color_format.width / depth_format.width).max(1);
    let mut color = ColorGrid::new(color_format);
    for y in 0..color_format.height {
        let shade = (y * 96 / color_format.height) as u32;
        let background = (shade << 16) | (shade << 8) | (64 + shade);
        for x in 0..color_format.width {
            let dx = (x / scale) as i32;
            let dy = (y / scale) as i32;
            color.pixels[y * color_format.width + x] = if person_covers(dx, dy, center_x) {
                0x00C8A080
            } else {
                background
            };
        }
    }

    CombinedFrame { depth, color }
}

/// フレーム1枚分の最新値スロット
struct LatestSlot<T> {
    value: Mutex<Option<T>>,
    frame_id: AtomicU64,
}

impl<T: Clone> LatestSlot<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
            frame_id: AtomicU64::new(0),
        }
    }

    fn publish(&self, value: T) {
        *self.value.lock().unwrap() = Some(value);
        self.frame_id.fetch_add(1, Ordering::Release);
    }

    fn frame_id(&self) -> u64 {
        self.frame_id.load(Ordering::Acquire)
    }

    /// 最新値のコピーを取り出す。ロックはコピー中のみ保持
    fn poll(&self) -> Option<T> {
        self.value.lock().unwrap().clone()
    }
}

/// シミュレートされたセンサー
pub struct SimulatedSensor {
    depth_format: FrameFormat,
    color_format: FrameFormat,
    sway_amplitude: f32,
    sway_period_secs: f32,
    fps: u32,
    running: Arc<AtomicBool>,
    skeletons: Arc<LatestSlot<Vec<Skeleton>>>,
    combined: Arc<LatestSlot<CombinedFrame>>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl SimulatedSensor {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            depth_format: FrameFormat {
                width: config.depth_width,
                height: config.depth_height,
            },
            color_format: FrameFormat {
                width: config.color_width,
                height: config.color_height,
            },
            sway_amplitude: config.sway_amplitude,
            sway_period_secs: config.sway_period_secs,
            fps: config.fps,
            running: Arc::new(AtomicBool::new(false)),
            skeletons: Arc::new(LatestSlot::new()),
            combined: Arc::new(LatestSlot::new()),
            handles: Vec::new(),
        }
    }

    fn phase(start: Instant, period_secs: f32) -> f32 {
        let elapsed = start.elapsed().as_secs_f32();
        elapsed / period_secs * std::f32::consts::TAU
    }
}

impl BodySensor for SimulatedSensor {
    fn status(&self) -> SensorStatus {
        SensorStatus::Connected
    }

    fn depth_format(&self) -> FrameFormat {
        self.depth_format
    }

    fn color_format(&self) -> FrameFormat {
        self.color_format
    }

    fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::Relaxed) {
            bail!("sensor already started");
        }
        self.running.store(true, Ordering::Relaxed);
        let interval = Duration::from_secs_f32(1.0 / self.fps.max(1) as f32);
        let start = Instant::now();

        // スケルトンストリーム
        {
            let running = Arc::clone(&self.running);
            let slot = Arc::clone(&self.skeletons);
            let amplitude = self.sway_amplitude;
            let period = self.sway_period_secs;
            self.handles.push(thread::spawn(move || {
                while running.load(Ordering::Relaxed) {
                    let phase = Self::phase(start, period);
                    slot.publish(vec![skeleton_at(phase, amplitude)]);
                    thread::sleep(interval);
                }
            }));
        }

        // 深度+カラーストリーム（スケルトンとは独立したティック）
        {
            let running = Arc::clone(&self.running);
            let slot = Arc::clone(&self.combined);
            let amplitude = self.sway_amplitude;
            let period = self.sway_period_secs;
            let depth_format = self.depth_format;
            let color_format = self.color_format;
            self.handles.push(thread::spawn(move || {
                while running.load(Ordering::Relaxed) {
                    let phase = Self::phase(start, period);
                    slot.publish(combined_at(phase, amplitude, depth_format, color_format));
                    thread::sleep(interval);
                }
            }));
        }

        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }

    fn skeleton_frame_id(&self) -> u64 {
        self.skeletons.frame_id()
    }

    fn poll_skeletons(&self) -> Option<Vec<Skeleton>> {
        self.skeletons.poll()
    }

    fn combined_frame_id(&self) -> u64 {
        self.combined.frame_id()
    }

    fn poll_combined(&self) -> Option<CombinedFrame> {
        self.combined.poll()
    }

    /// 深度・カラーの光軸が揃った理想カメラ: 解像度比の単純スケール
    fn map_depth_to_color(&self, depth: &DepthGrid, color: FrameFormat) -> Vec<ColorCoordinate> {
        let scale = (color.width / depth.width.max(1)).max(1) as i32;
        let mut map = Vec::with_capacity(depth.width * depth.height);
        for y in 0..depth.height {
            for x in 0..depth.width {
                map.push(ColorCoordinate {
                    x: x as i32 * scale,
                    y: y as i32 * scale,
                });
            }
        }
        map
    }
}

impl Drop for SimulatedSensor {
    fn drop(&mut self) {
        self.stop();
    }
}
