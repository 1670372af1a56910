pub mod bounds;
pub mod camera;
pub mod carousel;
pub mod cms;
pub mod config;
pub mod diagnostics;
pub mod entries;
pub mod framing;
pub mod gesture;
pub mod model;
pub mod motion;
pub mod placement;
pub mod registry;

pub use bounds::*;
pub use camera::*;
pub use framing::*;
pub use gesture::*;
pub use motion::*;
pub use registry::*;
