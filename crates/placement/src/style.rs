//! Visual style of a placed tool, chosen deterministically from its id.
//!
//! The style describes the composite representation (body, base and detail
//! marker) in renderer-neutral terms; the rendering crate turns it into
//! meshes and materials.

use bevy::color::Color;
use bevy::math::Vec3;

use crate::catalog::ToolId;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Body colors by tool id, as sRGB bytes.
const BODY_PALETTE: [(u32, [u8; 3]); 5] = [
    (1, [0x19, 0x76, 0xD2]),
    (2, [0xD3, 0x2F, 0x2F]),
    (3, [0x38, 0x8E, 0x3C]),
    (4, [0xFF, 0x6F, 0x00]),
    (5, [0x7B, 0x1F, 0xA2]),
];
const BODY_DEFAULT: [u8; 3] = [0x42, 0x42, 0x42];
const BASE_SLATE: [u8; 3] = [0x37, 0x47, 0x4F];

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::srgb_u8(r, g, b)
}

/// PBR parameters for one part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFinish {
    pub metallic: f32,
    pub roughness: f32,
    pub reflectance: f32,
}

const BODY_FINISH: SurfaceFinish = SurfaceFinish {
    metallic: 0.8,
    roughness: 0.3,
    reflectance: 0.9,
};

const BASE_FINISH: SurfaceFinish = SurfaceFinish {
    metallic: 0.5,
    roughness: 0.7,
    reflectance: 0.4,
};

const MARKER_FINISH: SurfaceFinish = SurfaceFinish {
    metallic: 0.0,
    roughness: 0.5,
    reflectance: 0.5,
};

// ---------------------------------------------------------------------------
// Composite parts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Body,
    Base,
    Marker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartShape {
    Cylinder { radius: f32, height: f32 },
    Sphere { radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositePart {
    pub kind: PartKind,
    pub shape: PartShape,
    /// Offset from the anchor, in the anchor's local frame.
    pub offset: Vec3,
    pub color: Color,
    pub finish: SurfaceFinish,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorStyle {
    pub body_color: Color,
}

impl AnchorStyle {
    pub fn for_tool(tool: ToolId) -> Self {
        let bytes = BODY_PALETTE
            .iter()
            .find(|(id, _)| *id == tool.0)
            .map_or(BODY_DEFAULT, |(_, bytes)| *bytes);
        Self {
            body_color: rgb(bytes),
        }
    }

    /// Body, base and detail marker, in that order.
    pub fn parts(&self) -> [CompositePart; 3] {
        [
            CompositePart {
                kind: PartKind::Body,
                shape: PartShape::Cylinder {
                    radius: 0.008,
                    height: 0.15,
                },
                offset: Vec3::new(0.0, 0.075, 0.0),
                color: self.body_color,
                finish: BODY_FINISH,
            },
            CompositePart {
                kind: PartKind::Base,
                shape: PartShape::Cylinder {
                    radius: 0.02,
                    height: 0.04,
                },
                offset: Vec3::new(0.0, 0.02, 0.0),
                color: rgb(BASE_SLATE),
                finish: BASE_FINISH,
            },
            CompositePart {
                kind: PartKind::Marker,
                shape: PartShape::Sphere { radius: 0.003 },
                offset: Vec3::new(0.025, 0.15, 0.0),
                color: Color::WHITE,
                finish: MARKER_FINISH,
            },
        ]
    }
}
