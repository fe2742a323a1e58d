//! 基础设施层：持有稀缺资源（浏览器页面、数据集目录），只暴露能力

pub mod page_renderer;
pub mod response_store;
pub mod workspace;

pub use page_renderer::{PageRenderer, Rasterizer};
pub use response_store::{FsResponseStore, ResponseStore};
pub use workspace::Workspace;
