use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub measure: MeasureConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    /// シミュレートされたデバイスを接続済みとして列挙するか
    #[serde(default = "default_simulate")]
    pub simulate: bool,
    /// 深度ストリーム解像度
    #[serde(default = "default_depth_width")]
    pub depth_width: usize,
    #[serde(default = "default_depth_height")]
    pub depth_height: usize,
    /// カラーストリーム解像度
    #[serde(default = "default_color_width")]
    pub color_width: usize,
    #[serde(default = "default_color_height")]
    pub color_height: usize,
    /// 模擬人物の揺れ幅（メートル）
    #[serde(default = "default_sway_amplitude")]
    pub sway_amplitude: f32,
    /// 揺れの周期（秒）
    #[serde(default = "default_sway_period")]
    pub sway_period_secs: f32,
    /// フレームレート
    #[serde(default = "default_fps")]
    pub fps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// ウィンドウ表示を行うか（無効ならコンソール出力のみ）
    #[serde(default = "default_display_enabled")]
    pub enabled: bool,
    #[serde(default = "default_title")]
    pub title: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MeasureConfig {
    /// 胸囲サンプリング行の下方向オフセット（ピクセル）
    #[serde(default = "default_chest_row_offset")]
    pub chest_row_offset: i32,
}

fn default_simulate() -> bool { true }
fn default_depth_width() -> usize { 320 }
fn default_depth_height() -> usize { 240 }
fn default_color_width() -> usize { 640 }
fn default_color_height() -> usize { 480 }
fn default_sway_amplitude() -> f32 { 0.2 }
fn default_sway_period() -> f32 { 4.0 }
fn default_fps() -> u32 { 30 }
fn default_display_enabled() -> bool { true }
fn default_title() -> String { "Body Meter".to_string() }
fn default_chest_row_offset() -> i32 { 10 }

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            simulate: default_simulate(),
            depth_width: default_depth_width(),
            depth_height: default_depth_height(),
            color_width: default_color_width(),
            color_height: default_color_height(),
            sway_amplitude: default_sway_amplitude(),
            sway_period_secs: default_sway_period(),
            fps: default_fps(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: default_display_enabled(),
            title: default_title(),
        }
    }
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            chest_row_offset: default_chest_row_offset(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 読み込みに失敗した場合はデフォルト設定で続行
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(_) => {
                eprintln!(
                    "設定ファイル {} が読めないためデフォルト設定を使用します",
                    path.as_ref().display()
                );
                Config::default()
            }
        }
    }
}
