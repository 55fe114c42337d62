//! Serializable figure model in the shape plotly.js expects for
//! `Plotly.newPlot(div, data, layout, config)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn background_images(&self) -> usize {
        self.layout.images.len()
    }

    pub fn preset_buttons(&self) -> usize {
        self.layout
            .updatemenus
            .iter()
            .map(|menu| menu.buttons.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: String,
    pub marker: Marker,
    pub name: String,
    pub visible: bool,
    pub text: Vec<String>,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub size: f64,
    pub color: String,
    pub opacity: f64,
    pub line: MarkerLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLine {
    pub width: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Title,
    pub autosize: bool,
    pub width: u32,
    pub height: u32,
    pub hovermode: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<LayoutImage>,
    pub updatemenus: Vec<UpdateMenu>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// `None` leaves the axis on auto-range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    pub title: AxisTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTitle {
    pub text: String,
}

/// Image pinned to data coordinates by its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutImage {
    pub source: String,
    pub xref: String,
    pub yref: String,
    pub x: f64,
    pub y: f64,
    pub sizex: f64,
    pub sizey: f64,
    pub sizing: String,
    pub opacity: f64,
    pub layer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMenu {
    #[serde(rename = "type")]
    pub kind: String,
    pub direction: String,
    pub x: f64,
    pub y: f64,
    pub buttons: Vec<Button>,
}

/// Button using plotly's `update` method: restyle args then relayout args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub method: String,
    pub args: (TraceUpdate, LayoutUpdate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceUpdate {
    pub visible: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutUpdate {
    #[serde(rename = "title.text")]
    pub title: String,
}

/// Options passed as the fourth argument of `Plotly.newPlot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    pub scroll_zoom: bool,
    pub display_mode_bar: bool,
    pub responsive: bool,
    pub mode_bar_buttons_to_add: Vec<String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            scroll_zoom: true,
            display_mode_bar: true,
            responsive: true,
            mode_bar_buttons_to_add: [
                "drawline",
                "drawopenpath",
                "drawclosedpath",
                "drawcircle",
                "drawrect",
                "eraseshape",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
