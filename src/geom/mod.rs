mod core;
mod diagnostics;
mod frame;
mod loft;
mod mesh;
mod metrics;
mod params;
mod path;
mod profile;

pub use core::{BBox, Point3, Tolerance, Vec2, Vec3};
pub use diagnostics::VaseMeshDiagnostics;
pub use frame::{
    FrameError, FrameReference, LocalFrame, compute_frame, compute_frame_with_tolerance,
};
pub use loft::{
    AssembleError, AssembleOptions, BaseCap, CAP_SEGMENTS, MeshAssembler, assemble,
    assemble_with_options,
};
pub use mesh::VaseMesh;
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use params::{
    ARTISTIC_PATH_STEPS, ARTISTIC_PROFILE_SEGMENTS, DEFAULT_HEIGHT_INCHES, DEFAULT_RADIUS_INCHES,
    INCH_TO_MM, MAX_STRANDS, MM_TO_INCH, NOZZLE_DIAMETER_MM, PARAMETER_RANGES, ParamError, ParameterRange,
    PathStrategy, ShapeParameters, VASE_PATH_STEPS, VASE_PROFILE_SEGMENTS, find_range,
};
pub use path::{ArtisticSampler, CurveSampler, HelixSampler, SpiralSampler, path_sampler};
pub use profile::{EllipseProfile, NozzleProfile, ProfileRing, ProfileSampler, profile_sampler};
