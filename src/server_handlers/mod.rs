pub mod docs;
pub mod generate;
pub mod outputs;
pub mod pages;
pub mod upload;

pub use docs::*;
pub use generate::*;
pub use outputs::*;
pub use pages::*;
pub use upload::*;
