use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;
use crate::signal::error::SignalError;
use crate::types::{Band, ChartPoint, EegSample, Sample};
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            // ECG red first, then one colour per EEG band
            palette: vec![
                RGBColor(248, 113, 113),
                RGBColor(96, 165, 250),
                RGBColor(52, 211, 153),
                RGBColor(251, 191, 36),
                RGBColor(192, 132, 252),
            ],
        }
    }
}
/// ECG window as a single trace.
pub fn render_ecg_png(samples: &[Sample], style: PlotStyle) -> Result<Vec<u8>, SignalError> {
    if samples.is_empty() {
        return Err(SignalError::EmptySeries("ECG"));
    }
    let trace: Vec<f64> = samples.iter().map(|s| s.value).collect();
    render_traces(&[trace], style)
}
/// One trace per EEG band, alpha to delta.
pub fn render_bands_png(series: &[EegSample], style: PlotStyle) -> Result<Vec<u8>, SignalError> {
    if series.is_empty() {
        return Err(SignalError::EmptySeries("EEG"));
    }
    let traces: Vec<Vec<f64>> = Band::ALL
        .iter()
        .map(|&band| series.iter().map(|p| p.bands.get(band)).collect())
        .collect();
    let mut style = style;
    if style.palette.len() > 1 {
        style.palette.rotate_left(1);
    }
    render_traces(&traces, style)
}
/// Redraw chart: indexed ECG over its companion EEG trace.
pub fn render_chart_png(points: &[ChartPoint], style: PlotStyle) -> Result<Vec<u8>, SignalError> {
    if points.is_empty() {
        return Err(SignalError::EmptySeries("chart"));
    }
    let ecg: Vec<f64> = points.iter().map(|p| p.ecg).collect();
    let eeg: Vec<f64> = points.iter().map(|p| p.eeg).collect();
    render_traces(&[ecg, eeg], style)
}
fn render_traces(traces: &[Vec<f64>], style: PlotStyle) -> Result<Vec<u8>, SignalError> {
    if style.palette.is_empty() {
        return Err(SignalError::Plot("palette has no colours".into()));
    }
    let len = traces.iter().map(Vec::len).max().unwrap_or(0);
    let y_min = traces
        .iter()
        .flat_map(|t| t.iter().copied())
        .fold(0.0f64, |acc, v| acc.min(v));
    let y_max = traces
        .iter()
        .flat_map(|t| t.iter().copied())
        .fold(0.0f64, |acc, v| acc.max(v));
    let y_bounds = if (y_max - y_min).abs() < f64::EPSILON {
        (-1.0, 1.0)
    } else {
        let pad = (y_max - y_min) * 0.05;
        (y_min - pad, y_max + pad)
    };
    let x_max = (len.max(2) - 1) as f64;
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(0f64..x_max, y_bounds.0..y_bounds.1)?;
        // 零基线
        chart.draw_series(LineSeries::new(
            [(0.0, 0.0), (x_max, 0.0)],
            &WHITE.mix(0.2),
        ))?;
        for (idx, trace) in traces.iter().enumerate() {
            let color = style.palette[idx % style.palette.len()];
            let series = trace.iter().enumerate().map(|(i, v)| (i as f64, *v));
            chart.draw_series(LineSeries::new(series, &color))?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, SignalError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| SignalError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
