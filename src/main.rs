use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use body_meter::app::{BodyMeter, MeterOutput};
use body_meter::config::Config;
use body_meter::render::MeterWindow;
use body_meter::sensor;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);

    println!("=== Body Meter ===");

    let Some(mut sensor) = sensor::connect_first(&config.sensor) else {
        println!("接続されたセンサーが見つかりません");
        return idle(&config);
    };

    if let Err(e) = sensor.start() {
        eprintln!("センサーの開始に失敗しました: {e}");
        return idle(&config);
    }

    let depth_format = sensor.depth_format();
    let color_format = sensor.color_format();
    println!(
        "深度 {}x{} / カラー {}x{}",
        depth_format.width, depth_format.height, color_format.width, color_format.height
    );
    println!("ESCまたはCtrl+Cで終了");
    println!();

    let mut meter = BodyMeter::new(depth_format, color_format, &config.measure);
    let mut window = if config.display.enabled {
        Some(MeterWindow::new(
            &config.display.title,
            color_format.width,
            color_format.height,
        )?)
    } else {
        None
    };

    let mut last_output: Option<MeterOutput> = None;
    let mut last_print = Instant::now();

    loop {
        if let Some(output) = meter.poll(sensor.as_ref()) {
            // コンソールへの計測表示は1秒間隔に間引く
            if last_print.elapsed() >= Duration::from_secs(1) {
                for line in output.measurements.display_lines() {
                    println!("{line}");
                }
                println!();
                last_print = Instant::now();
            }
            last_output = Some(output);
        }

        match &mut window {
            Some(w) => {
                if !w.is_open() {
                    break;
                }
                w.draw_masked_frame(meter.color(), color_format, meter.mask(), depth_format);
                if let Some(output) = &last_output {
                    w.draw_skeleton(&output.skeleton);
                }
                w.update()?;
            }
            None => {
                thread::sleep(Duration::from_millis(15));
            }
        }
    }

    sensor.stop();
    Ok(())
}

/// ノーセンサー縮退状態: クラッシュせずに待機する
fn idle(config: &Config) -> Result<()> {
    if !config.display.enabled {
        println!("表示も無効のため終了します");
        return Ok(());
    }
    println!("計測なしで待機します (ESCで終了)");
    let mut window = MeterWindow::new(&config.display.title, 640, 480)?;
    while window.is_open() {
        window.update()?;
        thread::sleep(Duration::from_millis(33));
    }
    Ok(())
}
