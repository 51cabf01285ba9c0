mod bootstrap;

pub use bootstrap::AppBootstrap;
