pub mod decode;
pub mod generate;
pub mod misc;
pub mod qr;
