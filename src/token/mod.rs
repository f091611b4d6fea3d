// Public API - what other modules can use
pub use clock::{Clock, ManualClock, SystemClock};
pub use jwt::JwtMaker;
pub use maker::{Maker, TokenError};
pub use payload::Payload;
pub use symmetric::SymmetricMaker;

pub mod clock;
pub mod jwt;
mod maker;
mod payload;
pub mod symmetric;
