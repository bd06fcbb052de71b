use crate::{coordinates::EdgePolicy, sampling::LinearElevation};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MapConfig {
    pub edge_policy: EdgePolicy,
    /// World-to-grid scale applied before the center offset.
    pub mesh_scale: f32,
    /// World-space distance between adjacent cells along `(x, y)`.
    pub spacing: [f32; 2],
    /// The vertical component of an unnormalized surface normal.
    pub vertical_scale: f32,
    pub elevation: LinearElevation,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            edge_policy: EdgePolicy::default(),
            mesh_scale: 1.0,
            spacing: [1.0, 1.0],
            vertical_scale: 1.0,
            elevation: LinearElevation::default(),
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
