mod config;
mod guillotine;
pub mod scoring;

#[doc(inline)]
pub use config::PackingConfig;
#[doc(inline)]
pub use guillotine::GuillotinePacker;
