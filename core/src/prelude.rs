use crate::points::bucket::TimeBucket;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Band indices used when a requested selection is out of range.
pub const DEFAULT_BANDS: [usize; 3] = [1, 2, 3];

/// Where the rendered page gets plotly.js from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotlyJs {
    /// Bundle shipped inside the binary, inlined into the page.
    #[default]
    Embedded,
    /// Local bundle read at render time and inlined.
    File(PathBuf),
    /// `<script src>` pointing at the public CDN; needs network access to view.
    Cdn,
}

/// Shared configuration threaded through every stage of a render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub output_path: PathBuf,
    /// 1-based raster band for the red, green and blue channels.
    pub bands: [usize; 3],
    pub contrast: f32,
    pub brightness: f32,
    pub enhance: bool,
    pub buckets: Vec<TimeBucket>,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub plotly_js: PlotlyJs,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("post_visualization.html"),
            bands: DEFAULT_BANDS,
            contrast: 1.2,
            brightness: 1.1,
            enhance: true,
            buckets: TimeBucket::default_set(),
            title: "Weibo Post Visualization".to_string(),
            width: 1200,
            height: 800,
            x_axis_title: "Longitude".to_string(),
            y_axis_title: "Latitude".to_string(),
            plotly_js: PlotlyJs::Embedded,
        }
    }
}

/// Fatal failures while reading point records.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("reading point data {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tabular data: {0}")]
    Csv(#[from] csv::Error),
    #[error("reading spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("spreadsheet has no worksheets")]
    EmptyWorkbook,
    #[error("missing required column {0}")]
    MissingColumn(String),
    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidCoordinate {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: cannot parse timestamp {value:?}")]
    InvalidTimestamp { row: usize, value: String },
}

/// Failures while turning a raster into a background image. Never fatal to a run.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error("raster i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("raster decode: {0}")]
    Decode(#[from] tiff::TiffError),
    #[error("unsupported raster layout: {0}")]
    UnsupportedLayout(String),
    #[error("raster has no georeferencing tags")]
    MissingGeoreference,
    #[error("image encode: {0}")]
    Encode(#[from] image::ImageError),
}

/// Fatal failures while writing the rendered scene.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serializing figure: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;
pub type RasterResult<T> = Result<T, RasterError>;
pub type SceneResult<T> = Result<T, SceneError>;
