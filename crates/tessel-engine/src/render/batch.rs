use anyhow::{Context, Result, anyhow, ensure};
use tessel_pack::{IndexBuffer, VertexBuffer};

use super::figure::Figure;
use super::formats::{index_format, max_index};

/// Packs `figures` into freshly sized vertex/index buffers, in order.
///
/// Each figure's indices are offset by the number of vertices packed before
/// it. Returns the total index count, ready for `draw_indexed`.
pub fn pack_figures<F: Figure>(
    figures: &[F],
    vertices: &mut VertexBuffer,
    indices: &mut IndexBuffer,
) -> Result<u32> {
    let vertex_total: usize = figures.iter().map(|f| f.vertex_count()).sum();
    let index_total: usize = figures.iter().map(|f| f.index_count()).sum();

    let format = indices.format();
    let max = index_format(&format)
        .map(max_index)
        .ok_or_else(|| anyhow!("`{format}` cannot index vertices"))?;
    ensure!(
        vertex_total == 0 || (vertex_total - 1) as u64 <= max as u64,
        "{vertex_total} vertices exceed `{format}` index range"
    );
    let index_total_u32 = u32::try_from(index_total).context("index count exceeds u32")?;

    vertices.initialize_vertices(vertex_total)?;
    indices.initialize(index_total)?;

    let per_vertex = vertices.layout().items_per_fragment();
    let mut vertex_scratch = Vec::new();
    let mut index_scratch = Vec::new();
    let mut base = 0u32;

    for (n, figure) in figures.iter().enumerate() {
        vertex_scratch.clear();
        index_scratch.clear();
        figure.push_vertices(&mut vertex_scratch);
        figure.push_indices(base, &mut index_scratch);

        ensure!(
            vertex_scratch.len() == figure.vertex_count() * per_vertex,
            "figure {n}: {} values do not match {} vertices of {per_vertex}",
            vertex_scratch.len(),
            figure.vertex_count()
        );
        ensure!(
            index_scratch.len() == figure.index_count(),
            "figure {n}: emitted {} indices, declared {}",
            index_scratch.len(),
            figure.index_count()
        );

        vertices.push_vertices(&vertex_scratch)?;
        indices.push_indices(&index_scratch)?;
        base += figure.vertex_count() as u32;
    }

    log::trace!("packed {} figures: {vertex_total} vertices, {index_total} indices", figures.len());
    Ok(index_total_u32)
}
