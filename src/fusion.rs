//! 深度・カラーの2ストリームを統合するフレーム融合エンジン
//!
//! 深度ピクセルグリッドからカラー画像空間に整列したシルエットマスクを
//! 生成し、行ごとの左右端と縦方向の範囲を算出する。深度とカラーは
//! 非同期に到着し、両方が揃ったティックでのみ走査を実行する。

use crate::sensor::FrameFormat;

/// 深度グリッドの1セル
///
/// player_index > 0 は追跡中の人物に属するピクセル。0以下は背景。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthPixel {
    pub depth_mm: u16,
    pub player_index: i32,
}

impl DepthPixel {
    pub const BACKGROUND: DepthPixel = DepthPixel {
        depth_mm: 0,
        player_index: 0,
    };

    pub fn is_foreground(&self) -> bool {
        self.player_index > 0
    }
}

/// 深度ティックごとに上書きされる深度グリッド
#[derive(Debug, Clone)]
pub struct DepthGrid {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<DepthPixel>,
}

impl DepthGrid {
    pub fn new(format: FrameFormat) -> Self {
        Self {
            width: format.width,
            height: format.height,
            pixels: vec![DepthPixel::BACKGROUND; format.width * format.height],
        }
    }

    pub fn set(&mut self, x: usize, y: usize, pixel: DepthPixel) {
        self.pixels[y * self.width + x] = pixel;
    }
}

/// カラーグリッド（0x00RRGGBB、行優先）
#[derive(Debug, Clone)]
pub struct ColorGrid {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl ColorGrid {
    pub fn new(format: FrameFormat) -> Self {
        Self {
            width: format.width,
            height: format.height,
            pixels: vec![0u32; format.width * format.height],
        }
    }
}

/// 深度ピクセルが対応するカラー画像上の位置
///
/// センサーの座標マッパーが深度グリッドと並行に1セルずつ生成する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCoordinate {
    pub x: i32,
    pub y: i32,
}

/// 深度行ごとのシルエット左右端（-1 = この行に前景なし）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilhouetteRow {
    pub left_edge: i32,
    pub right_edge: i32,
}

impl SilhouetteRow {
    pub const EMPTY: SilhouetteRow = SilhouetteRow {
        left_edge: -1,
        right_edge: -1,
    };

    /// この行にシルエットデータがないか
    ///
    /// {-1, -1}は「データなし」であり、列0に接しているという意味ではない。
    pub fn is_empty(&self) -> bool {
        self.left_edge < 0 || self.right_edge < 0
    }
}

/// 前景ピクセルを含む最小・最大の行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalExtent {
    pub min_row: i32,
    pub max_row: i32,
}

impl VerticalExtent {
    pub fn height_in_pixels(&self) -> i32 {
        self.max_row - self.min_row
    }
}

/// 1融合ティックの完成出力
///
/// 融合側が単一ライターとして毎ティック丸ごと生成し、計測側は
/// 最後に完成したスナップショットを読む（latest-value-wins）。
#[derive(Debug, Clone)]
pub struct SilhouetteSnapshot {
    pub rows: Vec<SilhouetteRow>,
    /// 前景ピクセルが1つもないティックではNone。0で代用してはならない
    /// （ピクセル→メートル比の計算で暗黙のゼロ除算になる）。
    pub extent: Option<VerticalExtent>,
}

impl SilhouetteSnapshot {
    pub fn height_in_pixels(&self) -> Option<i32> {
        self.extent.map(|e| e.height_in_pixels())
    }

    pub fn row(&self, row: i32) -> Option<SilhouetteRow> {
        if row < 0 {
            return None;
        }
        self.rows.get(row as usize).copied()
    }
}

/// フレーム融合エンジン
///
/// マスク・シルエット行・縦範囲はティックごとに完全リセットされる。
/// 前フレームの値が前景のない行に残留してはならない。
pub struct FrameFusionEngine {
    depth_width: usize,
    depth_height: usize,
    /// カラー:深度の解像度スケール係数（整数除算に使用）
    divisor: i32,
    mask: Vec<bool>,
    rows: Vec<SilhouetteRow>,
    color: Vec<u32>,
    color_width: usize,
    color_height: usize,
}

impl FrameFusionEngine {
    pub fn new(depth: FrameFormat, color: FrameFormat) -> Self {
        let divisor = if depth.width > 0 {
            (color.width / depth.width).max(1) as i32
        } else {
            1
        };
        Self {
            depth_width: depth.width,
            depth_height: depth.height,
            divisor,
            mask: vec![false; depth.width * depth.height],
            rows: vec![SilhouetteRow::EMPTY; depth.height],
            color: vec![0u32; color.width * color.height],
            color_width: color.width,
            color_height: color.height,
        }
    }

    /// 深度グリッドと座標マッピングから1ティック分のシルエットを走査
    ///
    /// 境界規則: マップ後の列は厳密に > 0（左端1ピクセルの意図的インセット）
    /// かつ < depth_width、行は [0, depth_height)。範囲外のマッピングは
    /// 無言で除外される（ノイズの多いジオメトリに対するベストエフォート）。
    pub fn process(&mut self, depth: &DepthGrid, map: &[ColorCoordinate]) -> SilhouetteSnapshot {
        let w = self.depth_width as i32;
        let h = self.depth_height as i32;

        // ティックごとのリセット
        self.mask.fill(false);
        self.rows.fill(SilhouetteRow::EMPTY);
        let mut min_row = h;
        let mut max_row = 0;
        let mut any_hit = false;

        for y in 0..h {
            for x in 0..w {
                let index = (y * w + x) as usize;
                if !depth.pixels[index].is_foreground() {
                    continue;
                }
                let Some(coord) = map.get(index) else {
                    continue;
                };
                // カラー座標を深度解像度へ整数除算で縮小
                let col = coord.x / self.divisor;
                let row = coord.y / self.divisor;

                if col > 0 && col < w && row >= 0 && row < h {
                    let sil = &mut self.rows[row as usize];
                    if sil.left_edge < 0 {
                        sil.left_edge = col;
                    }
                    sil.right_edge = col;

                    if row < min_row {
                        min_row = row;
                    }
                    if row > max_row {
                        max_row = row;
                    }
                    any_hit = true;

                    // 深度/カラーの系統的な位置ずれを補う左1ピクセルの固定膨張
                    let mask_index = (row * w + col) as usize;
                    self.mask[mask_index] = true;
                    self.mask[mask_index - 1] = true;
                }
            }
        }

        let extent = if any_hit {
            Some(VerticalExtent { min_row, max_row })
        } else {
            None
        };

        SilhouetteSnapshot {
            rows: self.rows.clone(),
            extent,
        }
    }

    /// カラーグリッドをそのまま出力ビットマップへコピー
    ///
    /// マスク書き込みとの順序依存はない。サイズ不一致のフレームは無視。
    pub fn store_color(&mut self, color: &ColorGrid) {
        if color.pixels.len() == self.color.len() {
            self.color.copy_from_slice(&color.pixels);
        }
    }

    /// 深度解像度の不透明マスク（背景除去用）
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// 表示用のカラーピクセルバッファ
    pub fn color(&self) -> &[u32] {
        &self.color
    }

    pub fn depth_format(&self) -> FrameFormat {
        FrameFormat {
            width: self.depth_width,
            height: self.depth_height,
        }
    }

    pub fn color_format(&self) -> FrameFormat {
        FrameFormat {
            width: self.color_width,
            height: self.color_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPTH: FrameFormat = FrameFormat {
        width: 320,
        height: 240,
    };
    const COLOR: FrameFormat = FrameFormat {
        width: 640,
        height: 480,
    };

    /// 恒等マッピング（除数1になるよう深度と同解像度のカラーを使用）
    fn identity_engine() -> FrameFusionEngine {
        FrameFusionEngine::new(DEPTH, DEPTH)
    }

    fn identity_map(format: FrameFormat) -> Vec<ColorCoordinate> {
        let mut map = Vec::with_capacity(format.width * format.height);
        for y in 0..format.height {
            for x in 0..format.width {
                map.push(ColorCoordinate {
                    x: x as i32,
                    y: y as i32,
                });
            }
        }
        map
    }

    fn foreground(depth: &mut DepthGrid, x: usize, y: usize) {
        depth.set(
            x,
            y,
            DepthPixel {
                depth_mm: 2000,
                player_index: 1,
            },
        );
    }

    #[test]
    fn test_single_run_edges() {
        // 行ごとに1本の前景ラン [a, b] (a > 0) → left == a, right == b
        let mut engine = identity_engine();
        let mut depth = DepthGrid::new(DEPTH);
        for x in 50..=80 {
            foreground(&mut depth, x, 100);
        }
        let snapshot = engine.process(&depth, &identity_map(DEPTH));
        let row = snapshot.row(100).unwrap();
        assert_eq!(row.left_edge, 50);
        assert_eq!(row.right_edge, 80);
    }

    #[test]
    fn test_empty_row_stays_empty() {
        let mut engine = identity_engine();
        let mut depth = DepthGrid::new(DEPTH);
        foreground(&mut depth, 100, 50);
        let snapshot = engine.process(&depth, &identity_map(DEPTH));
        assert_eq!(snapshot.row(51).unwrap(), SilhouetteRow::EMPTY);
        assert!(snapshot.row(51).unwrap().is_empty());
    }

    #[test]
    fn test_no_stale_rows_across_ticks() {
        // 前ティックにデータがあった行も、今ティックに前景がなければ{-1,-1}
        let mut engine = identity_engine();
        let map = identity_map(DEPTH);

        let mut first = DepthGrid::new(DEPTH);
        for x in 50..=80 {
            foreground(&mut first, x, 100);
        }
        let snapshot = engine.process(&first, &map);
        assert!(!snapshot.row(100).unwrap().is_empty());

        let empty = DepthGrid::new(DEPTH);
        let snapshot = engine.process(&empty, &map);
        assert_eq!(snapshot.row(100).unwrap(), SilhouetteRow::EMPTY);
        assert!(snapshot.extent.is_none());
    }

    #[test]
    fn test_extent_undefined_when_no_foreground() {
        // 前景ゼロのティックでは範囲は未定義（0で代用しない）
        let mut engine = identity_engine();
        let depth = DepthGrid::new(DEPTH);
        let snapshot = engine.process(&depth, &identity_map(DEPTH));
        assert!(snapshot.extent.is_none());
        assert!(snapshot.height_in_pixels().is_none());
    }

    #[test]
    fn test_extent_and_height_in_pixels() {
        let mut engine = identity_engine();
        let mut depth = DepthGrid::new(DEPTH);
        foreground(&mut depth, 100, 40);
        foreground(&mut depth, 100, 200);
        let snapshot = engine.process(&depth, &identity_map(DEPTH));
        let extent = snapshot.extent.unwrap();
        assert_eq!(extent.min_row, 40);
        assert_eq!(extent.max_row, 200);
        assert_eq!(snapshot.height_in_pixels(), Some(160));
    }

    #[test]
    fn test_column_zero_excluded() {
        // マップ後の列が丁度0の前景ピクセルは意図的にマスクから除外される
        let mut engine = identity_engine();
        let mut depth = DepthGrid::new(DEPTH);
        foreground(&mut depth, 0, 100);
        let snapshot = engine.process(&depth, &identity_map(DEPTH));
        assert!(snapshot.extent.is_none());
        assert_eq!(snapshot.row(100).unwrap(), SilhouetteRow::EMPTY);
        assert!(engine.mask().iter().all(|&m| !m));
    }

    #[test]
    fn test_mask_one_pixel_left_dilation() {
        let mut engine = identity_engine();
        let mut depth = DepthGrid::new(DEPTH);
        foreground(&mut depth, 100, 50);
        engine.process(&depth, &identity_map(DEPTH));
        let w = DEPTH.width;
        assert!(engine.mask()[50 * w + 100]);
        assert!(engine.mask()[50 * w + 99]);
        assert!(!engine.mask()[50 * w + 101]);
    }

    #[test]
    fn test_color_to_depth_division() {
        // カラー640x480 / 深度320x240 → 除数2で縮小される
        let mut engine = FrameFusionEngine::new(DEPTH, COLOR);
        let mut depth = DepthGrid::new(DEPTH);
        foreground(&mut depth, 60, 30);

        // センサーのマッパー相当: 深度(60,30) → カラー(121,61)
        let mut map = vec![ColorCoordinate { x: -1, y: -1 }; DEPTH.width * DEPTH.height];
        map[30 * DEPTH.width + 60] = ColorCoordinate { x: 121, y: 61 };

        let snapshot = engine.process(&depth, &map);
        let row = snapshot.row(30).unwrap();
        assert_eq!(row.left_edge, 60);
        assert_eq!(row.right_edge, 60);
    }

    #[test]
    fn test_out_of_bounds_mapping_silently_excluded() {
        let mut engine = identity_engine();
        let mut depth = DepthGrid::new(DEPTH);
        foreground(&mut depth, 10, 10);
        let mut map = identity_map(DEPTH);
        map[10 * DEPTH.width + 10] = ColorCoordinate { x: 5000, y: -3 };
        let snapshot = engine.process(&depth, &map);
        assert!(snapshot.extent.is_none());
    }

    #[test]
    fn test_store_color_verbatim() {
        let mut engine = FrameFusionEngine::new(DEPTH, COLOR);
        let mut color = ColorGrid::new(COLOR);
        color.pixels[12345] = 0x00AABBCC;
        engine.store_color(&color);
        assert_eq!(engine.color()[12345], 0x00AABBCC);
    }
}
