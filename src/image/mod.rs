pub mod f32;
pub mod io;
pub mod mask;
pub mod raster;
pub mod traits;

pub use self::f32::ImageF32;
pub use self::mask::MaskU8;
pub use self::raster::RasterF32;
pub use self::traits::{RasterView, RasterViewMut};
