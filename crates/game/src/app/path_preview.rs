use view::{EntityRenderer, MoverView, RenderSurface, Vec3};

pub(crate) fn path_polyline<S: RenderSurface>(
    renderer: &EntityRenderer<S>,
    mover: &MoverView,
) -> Option<Vec<Vec3>> {
    let start = renderer.bottom_anchor(mover.id)?;
    let layout = renderer.layout();
    let mut points = vec![start];
    points.extend(
        mover
            .path
            .iter()
            .skip(mover.path_index)
            .map(|cell| layout.to_world(*cell).with_z(start.z)),
    );
    (points.len() > 1).then_some(points)
}

pub(crate) fn polyline_length(points: &[Vec3]) -> f32 {
    points
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum()
}
