use std::path::{Path as FsPath, PathBuf};

use svg::Document;
use svg::node::Comment;
use svg::node::element::path::Data;
use svg::node::element::{Group, Path as SvgPath};

use crate::config::{Params, Viewport};
use crate::error::{ChromeclothError, ChromeclothResult};
use crate::path::Path;
use crate::rng::fingerprint;
use crate::scene::Scene;

const STROKE: &str = "black";
const STROKE_WIDTH: f64 = 1.0;

fn path_data(path: &Path) -> Option<Data> {
    let start = path.segments().first()?.point;
    let mut data = Data::new().move_to((start.x as f32, start.y as f32));
    for c in path.curves() {
        data = if c.is_straight() {
            data.line_to((c.to.x as f32, c.to.y as f32))
        } else {
            data.cubic_curve_to((
                c.control1.x as f32,
                c.control1.y as f32,
                c.control2.x as f32,
                c.control2.y as f32,
                c.to.x as f32,
                c.to.y as f32,
            ))
        };
    }
    if path.is_closed() {
        data = data.close();
    }
    Some(data)
}

/// Serializes the scene: one group per pass, one stroked path per ring.
/// The parameter set is embedded as a JSON comment so a file can be regenerated.
pub fn to_svg(scene: &Scene, viewport: Viewport, params: &Params) -> Document {
    let mut document = Document::new()
        .set("width", viewport.width)
        .set("height", viewport.height)
        .set("viewBox", format!("0 0 {} {}", viewport.width, viewport.height))
        .add(Comment::new(format!(" chromecloth {} ", params.to_json())));

    for pass in &scene.passes {
        let mut group = Group::new()
            .set("id", pass.kind.as_str())
            .set("fill", "none")
            .set("stroke", STROKE)
            .set("stroke-width", STROKE_WIDTH);
        for data in pass.paths.iter().filter_map(path_data) {
            group = group.add(SvgPath::new().set("d", data));
        }
        document = document.add(group);
    }
    document
}

pub fn to_svg_string(scene: &Scene, viewport: Viewport, params: &Params) -> String {
    to_svg(scene, viewport, params).to_string()
}

/// Download name derived only from the parameters: identical params, identical name.
pub fn export_filename(params: &Params) -> String {
    format!(
        "chromecloth_{}_{:016x}.svg",
        params.path_method.as_str(),
        fingerprint(params.to_json().as_bytes())
    )
}

/// Writes the SVG into `dir` under [`export_filename`] and returns the full path.
pub fn save_svg(
    dir: &FsPath,
    scene: &Scene,
    viewport: Viewport,
    params: &Params,
) -> ChromeclothResult<PathBuf> {
    let path = dir.join(export_filename(params));
    svg::save(&path, &to_svg(scene, viewport, params)).map_err(|source| {
        ChromeclothError::Export {
            path: path.clone(),
            source,
        }
    })?;
    log::info!("saved {}", path.display());
    Ok(path)
}
