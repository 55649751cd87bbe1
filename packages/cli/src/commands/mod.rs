pub mod edit;
pub mod init;
pub mod normalize;
pub mod show;

pub use edit::{apply, instruct, ApplyArgs, InstructArgs};
pub use init::{init, InitArgs};
pub use normalize::{normalize, validate, NormalizeArgs, ValidateArgs};
pub use show::{show, ShowArgs};
