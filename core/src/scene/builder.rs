use crate::points::bucket::{BucketedPoints, TimeBucket};
use crate::points::record::{BoundingBox, PointRecord};
use crate::prelude::SceneConfig;
use crate::raster::compositor::Background;
use crate::scene::figure::{
    Axis, AxisTitle, Button, Figure, Font, Layout, LayoutImage, LayoutUpdate, Marker, MarkerLine,
    Title, Trace, TraceUpdate, UpdateMenu,
};
use crate::telemetry::log::LogManager;

/// Fraction of each axis range added on both sides of the point extent.
pub const VIEW_PADDING: f64 = 0.05;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const CLOCK_FORMAT: &str = "%H:%M";

/// Composes the interactive figure: a background image (if any), one hidden
/// marker layer per non-empty bucket, and preset buttons that reveal the
/// buckets cumulatively.
pub fn build_scene(
    points: &[PointRecord],
    partitions: &[BucketedPoints],
    background: Option<&Background>,
    config: &SceneConfig,
) -> Figure {
    let logger = LogManager::new("scene");
    let view = BoundingBox::from_points(points).map(|bbox| bbox.padded(VIEW_PADDING));

    let mut data = Vec::new();
    let mut trace_buckets = Vec::new();
    for (index, part) in partitions.iter().enumerate() {
        if part.is_empty() {
            logger.record(&format!("bucket {} is empty, skipping layer", part.bucket.label));
            continue;
        }
        logger.record(&format!(
            "bucket {}: {} points",
            part.bucket.label,
            part.points.len()
        ));
        data.push(marker_trace(part, config));
        trace_buckets.push(index);
    }

    let buckets: Vec<TimeBucket> = partitions.iter().map(|p| p.bucket.clone()).collect();
    let images = background.map(background_image).into_iter().collect();

    let layout = Layout {
        title: Title {
            text: overview_title(&config.title),
            font: Font { size: 20 },
        },
        autosize: true,
        width: config.width,
        height: config.height,
        hovermode: "closest".to_string(),
        xaxis: Axis {
            range: view.map(|v| v.x_range()),
            title: AxisTitle {
                text: config.x_axis_title.clone(),
            },
        },
        yaxis: Axis {
            range: view.map(|v| v.y_range()),
            title: AxisTitle {
                text: config.y_axis_title.clone(),
            },
        },
        images,
        updatemenus: vec![UpdateMenu {
            kind: "buttons".to_string(),
            direction: "right".to_string(),
            x: 0.1,
            y: 0.0,
            buttons: preset_buttons(&trace_buckets, &buckets, &config.title),
        }],
    };

    Figure { data, layout }
}

fn overview_title(base: &str) -> String {
    format!("{} - By Time Period", base)
}

fn marker_trace(part: &BucketedPoints, config: &SceneConfig) -> Trace {
    Trace {
        kind: "scattergl".to_string(),
        x: part.points.iter().map(|p| p.x).collect(),
        y: part.points.iter().map(|p| p.y).collect(),
        mode: "markers".to_string(),
        marker: Marker {
            size: 8.0,
            color: part.bucket.color.clone(),
            opacity: 0.9,
            line: MarkerLine {
                width: 1.5,
                color: "white".to_string(),
            },
        },
        name: part.bucket.label.clone(),
        visible: false,
        text: part
            .points
            .iter()
            .map(|p| p.timestamp.format(TIME_FORMAT).to_string())
            .collect(),
        hovertemplate: format!(
            "{}: %{{x}}<br>{}: %{{y}}<br>Time: %{{text}}",
            config.x_axis_title, config.y_axis_title
        ),
    }
}

fn background_image(background: &Background) -> LayoutImage {
    let bounds = background.bounds;
    LayoutImage {
        source: background.data_uri.clone(),
        xref: "x".to_string(),
        yref: "y".to_string(),
        x: bounds.left,
        y: bounds.top,
        sizex: bounds.width(),
        sizey: bounds.height(),
        sizing: "stretch".to_string(),
        opacity: 1.0,
        layer: "below".to_string(),
    }
}

/// One button per bucket showing buckets `0..=k`, then a reset that hides
/// everything. Visibility is indexed by emitted trace, not by bucket.
fn preset_buttons(trace_buckets: &[usize], buckets: &[TimeBucket], base_title: &str) -> Vec<Button> {
    let mut buttons: Vec<Button> = buckets
        .iter()
        .enumerate()
        .map(|(k, bucket)| {
            let span = match buckets.first() {
                Some(first) => format!(
                    "{}-{}",
                    first.start.format(CLOCK_FORMAT),
                    bucket.end.format(CLOCK_FORMAT)
                ),
                None => bucket.label.clone(),
            };
            update_button(
                &bucket.label,
                trace_buckets.iter().map(|&b| b <= k).collect(),
                format!("{} - {}", base_title, span),
            )
        })
        .collect();

    buttons.push(update_button(
        "Reset",
        vec![false; trace_buckets.len()],
        overview_title(base_title),
    ));
    buttons
}

fn update_button(label: &str, visible: Vec<bool>, title: String) -> Button {
    Button {
        label: label.to_string(),
        method: "update".to_string(),
        args: (TraceUpdate { visible }, LayoutUpdate { title }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::bucket::partition;
    use crate::raster::geotiff::GeoBounds;
    use chrono::NaiveDate;

    fn post(x: f64, y: f64, hour: u32, minute: u32) -> PointRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        PointRecord::new(x, y, ts)
    }

    fn background() -> Background {
        Background {
            data_uri: "data:image/png;base64,AAAA".into(),
            bounds: GeoBounds {
                left: 115.0,
                right: 118.0,
                bottom: 39.0,
                top: 41.0,
            },
            width: 4,
            height: 4,
        }
    }

    fn scene_for(points: &[PointRecord], background: Option<&Background>) -> Figure {
        let config = SceneConfig::default();
        let parts = partition(points, &config.buckets);
        build_scene(points, &parts, background, &config)
    }

    #[test]
    fn one_layer_per_bucket_with_background_and_presets() {
        let points = vec![post(116.0, 39.5, 7, 30), post(116.5, 40.0, 8, 30), post(117.0, 40.5, 9, 30)];
        let bg = background();
        let figure = scene_for(&points, Some(&bg));

        assert_eq!(figure.data.len(), 3);
        assert!(figure.data.iter().all(|t| !t.visible));
        let colors: Vec<_> = figure.data.iter().map(|t| t.marker.color.as_str()).collect();
        assert_eq!(colors, vec!["red", "blue", "green"]);
        assert_eq!(figure.background_images(), 1);
        assert_eq!(figure.preset_buttons(), 4);

        let image = &figure.layout.images[0];
        assert_eq!((image.x, image.y), (115.0, 41.0));
        assert_eq!((image.sizex, image.sizey), (3.0, 2.0));
        assert_eq!(image.layer, "below");
        assert_eq!(image.sizing, "stretch");
    }

    #[test]
    fn presets_reveal_buckets_cumulatively() {
        let points = vec![post(116.0, 39.5, 7, 30), post(116.5, 40.0, 8, 30), post(117.0, 40.5, 9, 30)];
        let figure = scene_for(&points, None);
        let buttons = &figure.layout.updatemenus[0].buttons;
        let visible: Vec<_> = buttons.iter().map(|b| b.args.0.visible.clone()).collect();
        assert_eq!(
            visible,
            vec![
                vec![true, false, false],
                vec![true, true, false],
                vec![true, true, true],
                vec![false, false, false],
            ]
        );
        assert_eq!(buttons[1].args.1.title, "Weibo Post Visualization - 07:00-09:00");
        assert_eq!(buttons[3].label, "Reset");
        assert_eq!(buttons[3].args.1.title, figure.layout.title.text);
    }

    #[test]
    fn empty_buckets_are_skipped_without_shifting_presets() {
        let points = vec![post(116.0, 39.5, 7, 30), post(117.0, 40.5, 9, 30)];
        let figure = scene_for(&points, None);
        assert_eq!(figure.data.len(), 2);
        assert_eq!(figure.data[1].name, "09:00-10:00");
        let buttons = &figure.layout.updatemenus[0].buttons;
        assert_eq!(buttons.len(), 4);
        assert_eq!(buttons[1].args.0.visible, vec![true, false]);
        assert_eq!(buttons[2].args.0.visible, vec![true, true]);
    }

    #[test]
    fn missing_background_keeps_data_layers() {
        let points = vec![post(116.0, 39.5, 7, 30), post(116.5, 40.0, 8, 30), post(117.0, 40.5, 9, 30)];
        let figure = scene_for(&points, None);
        assert_eq!(figure.background_images(), 0);
        assert_eq!(figure.data.len(), 3);
    }

    #[test]
    fn view_range_is_padded_point_extent() {
        let points = vec![post(100.0, 30.0, 7, 0), post(120.0, 40.0, 12, 0)];
        let figure = scene_for(&points, None);
        assert_eq!(figure.layout.xaxis.range, Some([99.0, 121.0]));
        assert_eq!(figure.layout.yaxis.range, Some([29.5, 40.5]));
    }

    #[test]
    fn no_points_leaves_axes_on_auto_range() {
        let figure = scene_for(&[], None);
        assert!(figure.data.is_empty());
        assert!(figure.layout.xaxis.range.is_none());
        assert_eq!(figure.preset_buttons(), 4);
    }

    #[test]
    fn hover_text_carries_formatted_timestamp() {
        let figure = scene_for(&[post(116.0, 39.5, 8, 5)], None);
        let trace = &figure.data[0];
        assert_eq!(trace.text, vec!["2024-03-15 08:05:00".to_string()]);
        assert_eq!(
            trace.hovertemplate,
            "Longitude: %{x}<br>Latitude: %{y}<br>Time: %{text}"
        );
        assert_eq!(trace.kind, "scattergl");
        assert_eq!(trace.marker.size, 8.0);
    }
}
