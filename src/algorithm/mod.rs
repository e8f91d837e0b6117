/// Reverse-order reconstruction from residual and transforms
pub mod decoder;
/// Raster-order tile encoding and compression sessions
pub mod encoder;
/// Self-similar source window search
pub mod matcher;
/// Transform records and the ordered transform log
pub mod transform;
