pub mod cycler;

pub use cycler::SeriesCycler;
