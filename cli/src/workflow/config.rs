use anyhow::Context;
use postmapcore::points::TimeBucket;
use postmapcore::prelude::{PlotlyJs, SceneConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run needs, loadable from YAML. Missing keys keep their defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub data: PathBuf,
    pub background: PathBuf,
    pub output: PathBuf,
    pub band_r: usize,
    pub band_g: usize,
    pub band_b: usize,
    pub contrast: f32,
    pub brightness: f32,
    pub enhance: bool,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub buckets: Vec<TimeBucket>,
    /// Local plotly.js bundle to inline instead of the built-in copy.
    pub plotly_js: Option<PathBuf>,
    /// Reference plotly.js from the CDN instead of inlining it.
    pub plotly_cdn: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let scene = SceneConfig::default();
        Self {
            data: PathBuf::from("weibo.csv"),
            background: PathBuf::from("basemap.tif"),
            output: PathBuf::from("weibo_visualization.html"),
            band_r: scene.bands[0],
            band_g: scene.bands[1],
            band_b: scene.bands[2],
            contrast: scene.contrast,
            brightness: scene.brightness,
            enhance: scene.enhance,
            title: scene.title,
            width: scene.width,
            height: scene.height,
            buckets: scene.buckets,
            plotly_js: None,
            plotly_cdn: false,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// A bundle path wins over the CDN flag; neither means the built-in copy.
    pub fn plotly_source(&self) -> PlotlyJs {
        match (&self.plotly_js, self.plotly_cdn) {
            (Some(bundle), _) => PlotlyJs::File(bundle.clone()),
            (None, true) => PlotlyJs::Cdn,
            (None, false) => PlotlyJs::Embedded,
        }
    }

    pub fn to_scene_config(&self) -> SceneConfig {
        SceneConfig {
            output_path: self.output.clone(),
            bands: [self.band_r, self.band_g, self.band_b],
            contrast: self.contrast,
            brightness: self.brightness,
            enhance: self.enhance,
            buckets: self.buckets.clone(),
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            plotly_js: self.plotly_source(),
            ..SceneConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_produces_scene_config() {
        let cfg = WorkflowConfig {
            output: "out.html".into(),
            ..Default::default()
        };
        let scene = cfg.to_scene_config();
        assert_eq!(scene.output_path, PathBuf::from("out.html"));
        assert_eq!(scene.bands, [1, 2, 3]);
        assert_eq!(scene.contrast, 1.2);
        assert_eq!(scene.brightness, 1.1);
        assert!(scene.enhance);
        assert_eq!(scene.buckets.len(), 3);
        assert_eq!(scene.title, SceneConfig::default().title);
        assert_eq!(scene.plotly_js, PlotlyJs::Embedded);
    }

    #[test]
    fn plotly_source_prefers_bundle_then_cdn() {
        let mut cfg = WorkflowConfig {
            plotly_cdn: true,
            ..Default::default()
        };
        assert_eq!(cfg.plotly_source(), PlotlyJs::Cdn);
        cfg.plotly_js = Some("plotly.min.js".into());
        assert_eq!(cfg.plotly_source(), PlotlyJs::File("plotly.min.js".into()));
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"data: posts.csv\nband_r: 4\nenhance: false\nbuckets:\n  - label: Dawn\n    start: \"05:00:00\"\n    end: \"07:00:00\"\n    color: orange\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.data, PathBuf::from("posts.csv"));
        assert_eq!(cfg.band_r, 4);
        assert_eq!(cfg.band_g, 2);
        assert!(!cfg.enhance);
        assert_eq!(cfg.buckets.len(), 1);
        assert_eq!(cfg.buckets[0].color, "orange");
        assert_eq!(cfg.to_scene_config().bands, [4, 2, 3]);
    }

    #[test]
    fn config_load_reports_bad_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"band_r: [not, a, number]\n").unwrap();
        let err = WorkflowConfig::load(temp.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing workflow config"));
    }
}
