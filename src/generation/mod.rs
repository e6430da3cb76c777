//! Road skeleton generation
//!
//! Seeds are sampled from a noise lattice, partitioned into Voronoi cells,
//! and the cell boundaries become the road network.

mod roads;
mod seeds;
mod voronoi;

pub use roads::{
    build_road_network, build_road_network_with, cell_edges, edges_too_close,
    filter_border_edges, is_border_edge, is_full_border_edge, is_on_border,
    merge_collinear_edges, remove_duplicates, RoadNetwork, RoadStroke,
};
pub use seeds::{sample_lattice, LatticeSample, NoiseSeedField, SeedField};
pub use voronoi::{SpadeVoronoi, Tessellation};
