use std::{env, path::PathBuf, process::ExitCode};

use glam::Vec2;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use voxel_view::{
    ArcballController, ButtonMask, Dimensions, Interpolation2D, RenderOptions, SliceView,
    VolumeLoader, VolumeRenderer,
};

const USAGE: &str = "usage: voxel-view <raw file> <size x> <size y> <size z> [out dir]";
const VIEW_SIZE: u32 = 300;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let sizes: Option<Vec<u32>> = args
        .get(1..4)
        .map(|sizes| sizes.iter().filter_map(|s| s.parse().ok()).collect());
    let (path, dimensions) = match (args.first(), sizes.as_deref()) {
        (Some(path), Some(&[x, y, z])) => (PathBuf::from(path), Dimensions::new(x, y, z)),
        _ => {
            error!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    let out_dir = args.get(4).map_or_else(|| PathBuf::from("."), PathBuf::from);

    let volume = VolumeLoader::load_from_file(&path, dimensions)
        .expect("should have loaded raw volume");
    let renderer = VolumeRenderer::new(&volume, RenderOptions::default());

    for (view, name) in [
        (SliceView::Front, "front"),
        (SliceView::Top, "top"),
        (SliceView::Side, "side"),
    ] {
        let index = volume.axis_size(view.axis()) / 2;
        let image = renderer
            .render_view(view, index, Interpolation2D::Bilinear, 1.0)
            .expect("should have rendered centre slice");
        let target = out_dir.join(format!("{name}.png"));
        image.save(&target).expect("should have saved slice image");
        info!(target = %target.display(), "wrote slice");
    }

    // Baseline view, then a short drag to the right.
    let mut arcball = ArcballController::new(VIEW_SIZE, VIEW_SIZE);
    let centre = Vec2::splat(VIEW_SIZE as f32 / 2.0);
    for (name, drag) in [("3d.png", None), ("3d_rotated.png", Some(Vec2::new(60.0, 0.0)))] {
        if let Some(delta) = drag {
            arcball.press(centre);
            arcball.drag(centre + delta, ButtonMask::PRIMARY);
        }
        let image = renderer
            .draw_3d(VIEW_SIZE, VIEW_SIZE, arcball.view())
            .expect("should have rendered 3d view");
        let target = out_dir.join(name);
        image.save(&target).expect("should have saved 3d image");
        info!(target = %target.display(), "wrote projection");
    }

    ExitCode::SUCCESS
}
