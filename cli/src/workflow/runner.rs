use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use postmapcore::points::{load_points, partition};
use postmapcore::prelude::SceneConfig;
use postmapcore::raster::prepare_background;
use postmapcore::scene::{build_scene, write_html, PlotConfig};
use std::path::PathBuf;

#[derive(Debug)]
pub struct WorkflowResult {
    pub output: PathBuf,
    pub point_count: usize,
    pub layer_count: usize,
    /// Pixel size of the composited basemap, if one was drawn.
    pub background_size: Option<(u32, u32)>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Load -> composite -> render -> write. Only point loading and the final
    /// write can fail; a bad background just drops the basemap.
    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let scene_config: SceneConfig = self.config.to_scene_config();

        let points = load_points(&self.config.data)
            .with_context(|| format!("loading point data {}", self.config.data.display()))?;
        let partitions = partition(&points, &scene_config.buckets);

        let background = prepare_background(&self.config.background, &scene_config);
        let figure = build_scene(&points, &partitions, background.as_ref(), &scene_config);

        write_html(
            &figure,
            &PlotConfig::default(),
            &scene_config.output_path,
            &scene_config.plotly_js,
        )
        .with_context(|| format!("writing {}", scene_config.output_path.display()))?;

        Ok(WorkflowResult {
            output: scene_config.output_path,
            point_count: points.len(),
            layer_count: figure.data.len(),
            background_size: background.as_ref().map(|bg| (bg.width, bg.height)),
        })
    }
}
