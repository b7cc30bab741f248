pub use builder::InProcessBuilder;
pub use clock::ScriptedClock;
pub use fs::{create_temp_dir, create_temp_file, write_until_modified};

pub mod builder;
pub mod clock;
pub mod fs;
