pub mod content;
pub mod pinning;
pub mod repository;
pub mod settings;

pub use content::*;
pub use pinning::*;
pub use repository::*;
pub use settings::*;
