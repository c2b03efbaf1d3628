//! Domain types: bars, the validated price series, positions, trades.

pub mod bar;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use position::Position;
pub use series::{PriceSeries, MIN_BARS};
pub use trade::Trade;
