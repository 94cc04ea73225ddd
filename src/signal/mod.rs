// src/signal/mod.rs
pub mod buffer;
pub mod detect;
pub mod error;
pub mod flagger;
pub mod pipeline;
pub mod plot;
pub mod source;
pub mod synth;
pub mod transform;
// 常用类型直接从 signal 导出
pub use buffer::{Window, DEFAULT_WINDOW_CAPACITY};
pub use detect::{demo_anomalies, detect_anomalies, SeriesStats};
pub use error::SignalError;
pub use flagger::flag;
pub use pipeline::{ChartPipeline, LivePipeline};
pub use plot::{render_bands_png, render_chart_png, render_ecg_png, PlotStyle};
pub use source::{
    Clock, ConstantEntropy, Entropy, ManualClock, RngEntropy, SequenceEntropy, SystemClock,
    SystemEntropy,
};
pub use synth::{synthesize, EcgMode};
pub use transform::{transform, transform_series};
