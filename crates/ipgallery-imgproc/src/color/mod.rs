mod gray;
pub use gray::*;

mod hsv;
pub use hsv::*;

mod ycrcb;
pub use ycrcb::*;
