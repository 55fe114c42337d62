pub mod builder;
pub mod figure;
pub mod html;

pub use builder::build_scene;
pub use figure::{Figure, PlotConfig};
pub use html::{embedded_library, render_html, write_html, PlotlySource};
