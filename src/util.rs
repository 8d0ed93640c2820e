mod geometry;
mod io;

pub use geometry::{
    equirectangular_distance, mean_point, planar_distance, polyline_length, round_to,
    EARTH_RADIUS_KM,
};
pub use io::{parse_dataset, read_dataset, write_diagnostics, write_lines, write_nodes, write_tables};
