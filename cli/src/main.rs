use clap::Parser;
use log::info;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Render geotagged posts over a raster basemap as interactive HTML")]
struct Args {
    /// Load a workflow config from YAML; flags below override its values
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Tabular point data with POINT_X, POINT_Y and TIME columns
    #[arg(long)]
    data: Option<PathBuf>,
    /// GeoTIFF drawn beneath the points
    #[arg(long)]
    background: Option<PathBuf>,
    /// Output HTML path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Raster band for the red channel [default: 1]
    #[arg(long)]
    band_r: Option<usize>,
    /// Raster band for the green channel [default: 2]
    #[arg(long)]
    band_g: Option<usize>,
    /// Raster band for the blue channel [default: 3]
    #[arg(long)]
    band_b: Option<usize>,
    /// Contrast enhancement factor [default: 1.2]
    #[arg(long)]
    contrast: Option<f32>,
    /// Brightness enhancement factor [default: 1.1]
    #[arg(long)]
    brightness: Option<f32>,
    /// Skip contrast and brightness enhancement
    #[arg(long, default_value_t = false)]
    no_enhance: bool,
    /// Figure title
    #[arg(long)]
    title: Option<String>,
    /// Inline this plotly.js bundle instead of the built-in copy
    #[arg(long)]
    plotly_js: Option<PathBuf>,
    /// Load plotly.js from the CDN; the page then needs network access
    #[arg(long, default_value_t = false)]
    plotly_cdn: bool,
}

impl Args {
    fn apply(self, config: &mut WorkflowConfig) {
        if let Some(data) = self.data {
            config.data = data;
        }
        if let Some(background) = self.background {
            config.background = background;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(band) = self.band_r {
            config.band_r = band;
        }
        if let Some(band) = self.band_g {
            config.band_g = band;
        }
        if let Some(band) = self.band_b {
            config.band_b = band;
        }
        if let Some(contrast) = self.contrast {
            config.contrast = contrast;
        }
        if let Some(brightness) = self.brightness {
            config.brightness = brightness;
        }
        if self.no_enhance {
            config.enhance = false;
        }
        if let Some(title) = self.title {
            config.title = title;
        }
        if self.plotly_js.is_some() {
            config.plotly_js = self.plotly_js;
        }
        if self.plotly_cdn {
            config.plotly_cdn = true;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = match args.workflow.as_ref() {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::default(),
    };
    args.apply(&mut workflow_config);

    let result = Runner::new(workflow_config).execute()?;
    match result.background_size {
        Some((width, height)) => info!(
            "rendered {} points in {} layers over a {}x{} basemap",
            result.point_count, result.layer_count, width, height
        ),
        None => info!(
            "rendered {} points in {} layers without a basemap",
            result.point_count, result.layer_count
        ),
    }

    println!("HTML visualization written to {}", result.output.display());
    Ok(())
}
