pub mod config;
pub mod exception;
pub mod handler;
pub mod param;
pub mod request;
pub mod resolver;
pub mod response;
pub mod sink;
pub mod streamer;
pub mod util;
pub mod view;

pub use config::Config;
pub use exception::Exception;
pub use handler::DownloadHandler;
pub use param::{HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use resolver::{resolve, DownloadRequest, ResolvedTarget};
pub use response::Response;
pub use sink::{HttpResponseSink, ResponseSink, WriteChannel};
pub use streamer::{FileSource, FileStreamer, LocalFs, ReadHandle, StreamOutcome};
pub use util::HtmlBuilder;
pub use view::{ErrorView, ErrorViewContext, ViewFileRenderer};
