// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{PlotError, Result};
use crate::scale::ThreadAxis;

use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use std::error::Error;
use std::fs;
use std::path::Path;

pub const DEFAULT_SIZE: (u32, u32) = (1000, 600);

/// Largest width or height, in pixels, that a chart may have.
pub const MAX_DIMENSION: u32 = 16384;

const FONT: &str = "sans-serif";

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

const COLOURS: &[RGBColor] = &[
    hexcolour!(0x1F77B4),
    hexcolour!(0xFF7F0E),
    hexcolour!(0x2CA02C),
    hexcolour!(0xD62728),
    hexcolour!(0x9467BD),
    hexcolour!(0x8C564B),
    hexcolour!(0xE377C2),
    hexcolour!(0x7F7F7F),
    hexcolour!(0xBCBD22),
    hexcolour!(0x17BECF),
];

/// A labeled line of (threads, speedup) points, drawn in the given order.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    label: String,
    points: Vec<(u32, f64)>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(u32, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[(u32, f64)] {
        &self.points
    }
}

/// Everything needed to draw one speedup chart. A chart is built up, saved
/// and dropped by a single plotting call.
#[derive(Clone, Debug)]
pub struct Chart {
    caption: String,
    x_desc: String,
    y_desc: String,
    legend_title: String,
    size: (u32, u32),
    ticks: Vec<u32>,
    series: Vec<Series>,
}

impl Chart {
    pub fn new(caption: impl AsRef<str>) -> Self {
        Self {
            caption: caption.as_ref().to_owned(),
            x_desc: "Number of Threads".to_owned(),
            y_desc: "Speedup (1 thread runtime / n threads runtime)".to_owned(),
            legend_title: "Dataset".to_owned(),
            size: DEFAULT_SIZE,
            ticks: Vec::new(),
            series: Vec::new(),
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn size(&mut self, size: (u32, u32)) -> &mut Self {
        self.size = size;
        self
    }

    /// Thread counts to label on the x-axis.
    pub fn ticks(&mut self, ticks: Vec<u32>) -> &mut Self {
        self.ticks = ticks;
        self
    }

    pub fn add_series(&mut self, series: Series) -> &mut Self {
        self.series.push(series);
        self
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn tick_values(&self) -> &[u32] {
        &self.ticks
    }

    fn y_max(&self) -> f64 {
        let max = self
            .series
            .iter()
            .flat_map(|series| series.points.iter().map(|point| point.1))
            .filter(|speedup| speedup.is_finite())
            .fold(0.0, f64::max);
        (max * 1.1).max(1.0)
    }

    /// Draw the chart into an RGB pixel buffer of `width * height * 3` bytes.
    pub fn render(&self) -> Result<Vec<u8>> {
        let bytes: &'static [u8] = dejavu::sans_mono::regular();
        register_font(FONT, FontStyle::Normal, bytes).map_err(|_| PlotError::Font)?;

        let (width, height) = self.size;
        let bad_size = || {
            PlotError::Render(format!(
                "chart size {}x{} outside 1..={}",
                width, height, MAX_DIMENSION
            ))
        };
        let range = 1..=MAX_DIMENSION;
        if !range.contains(&width) || !range.contains(&height) {
            return Err(bad_size());
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(bad_size)?;
        let mut buffer = vec![0u8; len];
        self.draw(&mut buffer)
            .map_err(|e| PlotError::Render(e.to_string()))?;

        Ok(buffer)
    }

    fn draw(&self, buffer: &mut [u8]) -> std::result::Result<(), Box<dyn Error>> {
        let root = BitMapBackend::with_buffer(buffer, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.caption, (FONT, 28))
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 50)
            .build_cartesian_2d(ThreadAxis::new(&self.ticks), 0.0..self.y_max())?;

        chart
            .configure_mesh()
            .x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .axis_desc_style((FONT, 16))
            .label_style((FONT, 14))
            .draw()?;

        // heading entry for the legend box
        chart
            .draw_series(std::iter::empty::<PathElement<(u32, f64)>>())?
            .label(self.legend_title.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y)], WHITE.stroke_width(1)));

        for (i, series) in self.series.iter().enumerate() {
            let colour = COLOURS[i % COLOURS.len()];
            let points: Vec<(u32, f64)> = series
                .points
                .iter()
                .copied()
                .filter(|point| point.1.is_finite())
                .collect();

            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    colour.stroke_width(2),
                ))?
                .label(series.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2))
                });

            chart.draw_series(
                points
                    .iter()
                    .map(|&point| Cross::new(point, 4, colour.stroke_width(2))),
            )?;
        }

        chart
            .configure_series_labels()
            .label_font((FONT, 14))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;

        root.present()?;

        Ok(())
    }

    /// Render and write the chart as a PNG. Nothing is written unless every
    /// draw command succeeded.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let pixels = self.render()?;
        write_png(path, self.size, &pixels)?;

        debug!(
            "wrote {} ({} series, {}x{})",
            path.display(),
            self.series.len(),
            self.size.0,
            self.size.1
        );
        Ok(())
    }
}

/// Encode RGB pixels in memory, then write the file in one go so a failed
/// encode leaves nothing on disk.
fn write_png(path: &Path, size: (u32, u32), pixels: &[u8]) -> Result<()> {
    let encode = |source: png::EncodingError| PlotError::Encode {
        path: path.to_owned(),
        source,
    };

    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, size.0, size.1);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(encode)?;
        writer.write_image_data(pixels).map_err(encode)?;
        writer.finish().map_err(encode)?;
    }

    fs::write(path, bytes).map_err(|source| PlotError::Io {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> Chart {
        let mut chart = Chart::new("Speedup Graph for test");
        chart
            .size((320, 240))
            .ticks(vec![1, 2, 4])
            .add_series(Series::new("A", vec![(1, 1.0), (2, 1.8), (4, 3.1)]))
            .add_series(Series::new("B", vec![(1, 1.0), (4, 2.2)]));
        chart
    }

    #[test]
    fn y_axis_has_headroom() {
        assert!((chart().y_max() - 3.41).abs() < 1e-9);
        assert_eq!(Chart::new("empty").y_max(), 1.0);
    }

    #[test]
    fn render_fills_buffer() {
        let pixels = chart().render().unwrap();
        assert_eq!(pixels.len(), 320 * 240 * 3);
        // white background with something drawn on it
        assert!(pixels.iter().any(|&p| p != 255));
        assert!(pixels.iter().filter(|&&p| p == 255).count() > pixels.len() / 2);
    }

    #[test]
    fn render_is_deterministic() {
        assert_eq!(chart().render().unwrap(), chart().render().unwrap());
    }

    #[test]
    fn save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        chart().save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn infinite_points_do_not_stretch_the_axis() {
        let mut chart = chart();
        chart.add_series(Series::new("C", vec![(1, f64::INFINITY), (2, f64::NAN)]));
        assert!((chart.y_max() - 3.41).abs() < 1e-9);
        assert!(chart.render().is_ok());
    }

    #[test]
    fn oversized_chart_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        for size in &[(4_000_000_000, 4_000_000_000), (MAX_DIMENSION + 1, 10), (10, 0)] {
            let mut chart = chart();
            chart.size(*size);
            assert!(matches!(chart.save(&path), Err(PlotError::Render(_))));
        }
        assert!(!path.exists());
    }

    #[test]
    fn failed_encode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.png");
        // fewer pixels than the header promises
        let pixels = vec![255u8; 10 * 10 * 3 - 1];
        assert!(matches!(
            write_png(&path, (10, 10), &pixels),
            Err(PlotError::Encode { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn save_to_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.png");
        assert!(matches!(chart().save(&path), Err(PlotError::Io { .. })));
    }
}
