pub mod upload;
pub mod url_resolver;

pub use upload::UploadService;
pub use url_resolver::UrlResolver;
