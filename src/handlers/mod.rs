pub mod answer;
pub mod status;

pub use answer::answer;
pub use status::{not_found, status};
