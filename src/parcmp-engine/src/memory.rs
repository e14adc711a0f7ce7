mod pool;
pub(crate) use pool::{Pool, PoolRef};
