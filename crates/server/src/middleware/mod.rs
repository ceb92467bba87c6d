mod model_loaders;

pub use model_loaders::{
    load_backlog_middleware, load_project_middleware, load_work_item_middleware,
};
