mod executor;
mod reqwest;

pub use self::executor::{HttpExecutor, HttpResponseData};
pub use self::reqwest::ReqwestExecutor;
