use crate::prelude::{PlotlyJs, SceneError, SceneResult};
use crate::scene::figure::{Figure, PlotConfig};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const PLOT_DIV_ID: &str = "postmap-plot";
/// Element id the `plotly` crate gives its own plot; marks the script to drop.
const CRATE_PLOT_MARKER: &str = "plotly-html-element";

/// How the page obtains plotly.js.
pub enum PlotlySource<'a> {
    /// Library compiled into the binary.
    Embedded,
    Cdn,
    Inline(&'a str),
}

/// The `<script>` elements carrying plotly.js as bundled by the `plotly`
/// crate, lifted out of an empty standalone plot it renders.
pub fn embedded_library() -> &'static str {
    static LIBRARY: OnceLock<String> = OnceLock::new();
    LIBRARY.get_or_init(|| library_scripts(&plotly::Plot::new().to_html()))
}

/// Keeps the inline library scripts of a standalone plotly page, dropping the
/// plot call itself and any external `src` reference.
fn library_scripts(page: &str) -> String {
    let mut scripts = Vec::new();
    let mut rest = page;
    while let Some(start) = rest.find("<script") {
        let tail = &rest[start..];
        let Some(end) = tail.find("</script>") else {
            break;
        };
        let element = &tail[..end + "</script>".len()];
        let open_tag = &element[..element.find('>').unwrap_or(0)];
        if !element.contains(CRATE_PLOT_MARKER) && !open_tag.contains("src=") {
            scripts.push(element);
        }
        rest = &tail[element.len()..];
    }
    scripts.join("\n")
}

/// JSON for embedding inside a `<script>` element; `</` is escaped so string
/// content can never close the element.
fn script_json<T: Serialize>(value: &T) -> SceneResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_html(figure: &Figure, config: &PlotConfig, plotly: PlotlySource<'_>) -> SceneResult<String> {
    let data = script_json(&figure.data)?;
    let layout = script_json(&figure.layout)?;
    let plot_config = script_json(config)?;
    let library = match plotly {
        PlotlySource::Embedded => embedded_library().to_string(),
        PlotlySource::Cdn => format!(
            "<script src=\"{}\" charset=\"utf-8\"></script>",
            PLOTLY_CDN
        ),
        PlotlySource::Inline(source) => format!(
            "<script type=\"text/javascript\">{}</script>",
            source.replace("</script", "<\\/script")
        ),
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    {library}
    <style>
        html, body {{ margin: 0; padding: 0; background: #ffffff; }}
        #{div} {{ width: 100%; height: 100vh; }}
    </style>
</head>
<body>
    <div id="{div}"></div>
    <script type="text/javascript">
        Plotly.newPlot("{div}", {data}, {layout}, {plot_config});
    </script>
</body>
</html>
"#,
        title = escape_html(&figure.layout.title.text),
        library = library,
        div = PLOT_DIV_ID,
        data = data,
        layout = layout,
        plot_config = plot_config,
    ))
}

/// Writes the figure as a standalone HTML page. plotly.js is inlined unless
/// the CDN is requested explicitly.
pub fn write_html(
    figure: &Figure,
    config: &PlotConfig,
    path: &Path,
    plotly_js: &PlotlyJs,
) -> SceneResult<()> {
    let bundle = match plotly_js {
        PlotlyJs::File(bundle_path) => {
            Some(fs::read_to_string(bundle_path).map_err(|source| SceneError::Io {
                path: bundle_path.clone(),
                source,
            })?)
        }
        PlotlyJs::Embedded | PlotlyJs::Cdn => None,
    };
    let source = match (plotly_js, bundle.as_deref()) {
        (_, Some(js)) => PlotlySource::Inline(js),
        (PlotlyJs::Cdn, None) => PlotlySource::Cdn,
        _ => PlotlySource::Embedded,
    };
    let html = render_html(figure, config, source)?;

    let io_error = |source: std::io::Error| SceneError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, html).map_err(io_error)
}
